use std::collections::VecDeque;
use std::time::{Duration, Instant};

use calorie_ai_rust::chart::CalorieChart;
use calorie_ai_rust::config::Config;
use calorie_ai_rust::describer::OpenAiDescriber;
use calorie_ai_rust::history::HistoryView;
use calorie_ai_rust::workflow::{RowId, UploadWorkflow, WorkflowState};
use chrono::{Days, Local};
use eframe::egui::{self, Color32, RichText, Sense};
use eframe::egui::{FontData, FontDefinitions, FontFamily};
use tracing::{info, warn};

use crate::io::{pick_image, preview_texture};
use crate::model::{DateInput, Notice, NoticeKind, Tab};
use crate::{chart_view, history_view};

const IMAGE_AREA: egui::Vec2 = egui::vec2(480.0, 360.0);
const COPIED_VISIBLE: Duration = Duration::from_secs(2);

pub struct CalorieApp {
    config: Config,
    workflow: UploadWorkflow<OpenAiDescriber>,
    chart: CalorieChart,
    history: HistoryView,
    tab: Tab,
    notices: VecDeque<Notice>,
    date_input: DateInput,
    preview: Option<egui::TextureHandle>,
    copied_at: Option<Instant>,
}

impl CalorieApp {
    pub fn new(config: Config, mut workflow: UploadWorkflow<OpenAiDescriber>) -> Self {
        let mut notices = VecDeque::new();
        if let Err(err) = workflow.reload_entries() {
            notices.push_back(Notice::warning(format!("Could not load saved entries: {err}")));
        }
        let date_input = DateInput::new(workflow.date());
        Self {
            config,
            workflow,
            chart: CalorieChart::default(),
            history: HistoryView::default(),
            tab: Tab::default(),
            notices,
            date_input,
            preview: None,
            copied_at: None,
        }
    }

    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => info!(message = %notice.message, "notice"),
            NoticeKind::Warning => warn!(message = %notice.message, "notice"),
        }
        self.notices.push_back(notice);
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        match tab {
            Tab::Upload => {}
            Tab::Analysis => self.reload_chart(),
            Tab::History => self.reload_history(),
        }
    }

    fn reload_chart(&mut self) {
        self.chart = CalorieChart::load(self.workflow.store());
    }

    fn reload_history(&mut self) {
        if let Err(err) = self.history.refresh(self.workflow.store()) {
            self.notify(Notice::warning(format!("Could not load history: {err}")));
        }
    }

    fn choose_image(&mut self, ctx: &egui::Context) {
        let Some(path) = pick_image() else {
            return;
        };
        match self.workflow.load_image(&path) {
            Ok(image) => self.preview = Some(preview_texture(ctx, image)),
            Err(err) => self.notify(Notice::warning(format!("Could not open image: {err}"))),
        }
    }

    fn run_analysis(&mut self) {
        match self.workflow.analyze() {
            Ok(outcome) => {
                if let Some(message) = outcome.warning() {
                    self.notify(Notice::warning(message));
                }
            }
            Err(err) => self.notify(Notice::warning(format!("Analysis failed: {err}"))),
        }
    }

    fn set_date(&mut self, date: chrono::NaiveDate) {
        self.workflow.set_date(date);
        self.date_input.set(date);
    }

    fn save_rows(&mut self) {
        match self.workflow.save() {
            Ok(summary) => {
                self.notify(Notice::info(format!("Saved {} item(s).", summary.saved)));
                if !summary.entries_reloaded {
                    self.notify(Notice::warning("Saved, but the entry list could not be reloaded."));
                }
            }
            Err(err) => self.notify(Notice::warning(format!("Save failed: {err}"))),
        }
    }

    fn delete_entry(&mut self, id: i64) {
        match self.workflow.delete_entry(id) {
            Ok(removed) => self.notify(Notice::deleted(id, removed)),
            Err(err) => self.notify(Notice::warning(format!("Delete failed: {err}"))),
        }
    }

    fn refresh_entries(&mut self) {
        if let Err(err) = self.workflow.reload_entries() {
            self.notify(Notice::warning(format!("Could not load saved entries: {err}")));
        }
    }

    fn render_image_area(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(IMAGE_AREA, Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 8.0, Color32::from_rgb(24, 28, 40));

        match &self.preview {
            Some(texture) => {
                let size = texture.size_vec2();
                let scale = (rect.width() / size.x).min(rect.height() / size.y).min(1.0);
                let image_rect = egui::Rect::from_center_size(rect.center(), size * scale);
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), image_rect, uv, Color32::WHITE);
            }
            None => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Click to select a food photo",
                    egui::FontId::proportional(16.0),
                    Color32::from_gray(170),
                );
            }
        }

        if response.on_hover_cursor(egui::CursorIcon::PointingHand).clicked() {
            let ctx = ui.ctx().clone();
            self.choose_image(&ctx);
        }
    }

    fn render_results(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(RichText::new("Results").strong());

            ui.horizontal(|ui| {
                ui.label("Date");
                let response = ui.add(egui::TextEdit::singleline(&mut self.date_input.text).desired_width(100.0));
                if response.changed() {
                    if let Some(date) = self.date_input.parsed() {
                        self.workflow.set_date(date);
                    }
                }
                if response.lost_focus() {
                    self.date_input.set(self.workflow.date());
                }
                if ui.button("-1").clicked() {
                    if let Some(date) = self.workflow.date().checked_sub_days(Days::new(1)) {
                        self.set_date(date);
                    }
                }
                if ui.button("Today").clicked() {
                    self.set_date(Local::now().date_naive());
                }
                if ui.button("+1").clicked() {
                    if let Some(date) = self.workflow.date().checked_add_days(Days::new(1)) {
                        self.set_date(date);
                    }
                }
            });

            let mut remove: Option<RowId> = None;
            egui::Grid::new("editable_rows").striped(true).show(ui, |ui| {
                ui.label(RichText::new("Food").strong());
                ui.label(RichText::new("Calories").strong());
                ui.end_row();
                for row in self.workflow.rows_mut() {
                    ui.add(egui::TextEdit::singleline(&mut row.food_name).desired_width(200.0));
                    ui.add(egui::TextEdit::singleline(&mut row.calories).desired_width(80.0));
                    if ui.button("Remove").clicked() {
                        remove = Some(row.id);
                    }
                    ui.end_row();
                }
            });
            if let Some(id) = remove {
                self.workflow.remove_row(id);
            }

            ui.horizontal(|ui| {
                if ui.button("Add food").clicked() {
                    self.workflow.add_row("", "");
                }
                let can_save = !self.workflow.rows().is_empty();
                if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                    self.save_rows();
                }
            });
        });
    }

    fn render_entries(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Saved entries");
            if ui.button("Refresh").clicked() {
                self.refresh_entries();
            }
        });
        ui.separator();

        let mut delete: Option<i64> = None;
        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            egui::Grid::new("saved_entries").striped(true).show(ui, |ui| {
                for title in ["ID", "FOOD NAME", "CALORIES", "DATE", ""] {
                    ui.label(RichText::new(title).strong());
                }
                ui.end_row();
                for entry in self.workflow.entries() {
                    ui.label(entry.id.to_string());
                    ui.label(&entry.food_name);
                    ui.label(entry.calories.to_string());
                    ui.label(entry.date.format("%Y-%m-%d").to_string());
                    if ui.button("Delete").clicked() {
                        delete = Some(entry.id);
                    }
                    ui.end_row();
                }
            });
        });
        if let Some(id) = delete {
            self.delete_entry(id);
        }
    }

    fn render_upload(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("entries")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| self.render_entries(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_image_area(ui);
                ui.add_space(8.0);

                let analyzing = self.workflow.state() == WorkflowState::Analyzing;
                let can_analyze = self.workflow.image().is_some() && !analyzing;
                if ui.add_enabled(can_analyze, egui::Button::new("Analyze")).clicked() {
                    self.run_analysis();
                }
                ui.add_space(8.0);

                self.render_results(ui);
            });
        });
    }

    fn render_analysis(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if ui.button("Refresh").clicked() {
                self.reload_chart();
            }
            chart_view::show(ui, &self.chart);
        });
    }

    fn render_history(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Refresh").clicked() {
                    self.reload_history();
                }
                ui.label(format!("{} request(s)", self.history.len()));
                if self.copied_at.is_some_and(|at| at.elapsed() < COPIED_VISIBLE) {
                    ui.label(RichText::new("Copied").color(Color32::from_rgb(246, 196, 69)));
                }
            });
            ui.separator();

            if let Some(text) = history_view::show(ui, &mut self.history) {
                ui.output_mut(|o| o.copied_text = text);
                self.copied_at = Some(Instant::now());
                ctx.request_repaint_after(COPIED_VISIBLE);
            }
        });
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notices.front() else {
            return;
        };
        let color = match notice.kind {
            NoticeKind::Info => Color32::from_gray(220),
            NoticeKind::Warning => Color32::from_rgb(246, 196, 69),
        };

        let mut acknowledged = false;
        egui::Window::new(notice.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(&notice.message).color(color));
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });
        if acknowledged {
            self.notices.pop_front();
        }
    }
}

/// Installs a CJK-capable system font so food names in any script render.
pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\malgun.ttf",
        r"C:\Windows\Fonts\meiryo.ttc",
        "/System/Library/Fonts/AppleSDGothicNeo.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            info!(font = path, "CJK fallback font loaded");
            fonts.font_data.insert("cjk_fallback".to_string(), FontData::from_owned(data));
            fonts.families
                .entry(FontFamily::Proportional)
                .or_default()
                .insert(0, "cjk_fallback".to_string());
            fonts.families
                .entry(FontFamily::Monospace)
                .or_default()
                .insert(0, "cjk_fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
    warn!("no CJK font found; using egui defaults");
}

impl eframe::App for CalorieApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut selected = self.tab;
                for tab in Tab::ALL {
                    ui.selectable_value(&mut selected, tab, tab.title());
                }
                self.switch_tab(selected);

                ui.separator();
                ui.label(RichText::new(format!("model: {}", self.config.model)).color(Color32::from_gray(170)));
                ui.label(
                    RichText::new(format!("db: {}", self.config.db_path.display()))
                        .color(Color32::from_gray(170)),
                );
            });
        });

        match self.tab {
            Tab::Upload => self.render_upload(ctx),
            Tab::Analysis => self.render_analysis(ctx),
            Tab::History => self.render_history(ctx),
        }

        self.render_notice(ctx);
    }
}
