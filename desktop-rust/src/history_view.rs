use calorie_ai_rust::history::{HistoryColumn, HistoryView, truncated};
use eframe::egui::{self, RichText};

const CELL_CHARS: usize = 40;

/// Draws the request/response table. Returns the full text of a clicked cell.
pub fn show(ui: &mut egui::Ui, history: &mut HistoryView) -> Option<String> {
    let mut clicked = None;

    egui::ScrollArea::both()
        .id_source("history_table")
        .max_height(ui.available_height() * 0.6)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("history_grid")
                .striped(true)
                .min_col_width(60.0)
                .show(ui, |ui| {
                    for column in HistoryColumn::ALL {
                        ui.label(RichText::new(column.title()).strong());
                    }
                    ui.end_row();

                    for row in 0..history.len() {
                        for column in HistoryColumn::ALL {
                            let full = history.cell_text(row, column).unwrap_or_default();
                            let selected = history.selected() == Some((row, column));
                            let response = ui
                                .selectable_label(selected, truncated(&full, CELL_CHARS))
                                .on_hover_text(full);
                            if response.clicked() {
                                clicked = Some((row, column));
                            }
                        }
                        ui.end_row();
                    }
                });
        });

    let copied = clicked.and_then(|(row, column)| history.select_cell(row, column));

    ui.separator();
    ui.label(RichText::new("Detail").strong());
    let detail = history.detail_text();
    egui::ScrollArea::vertical()
        .id_source("history_detail")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut detail.as_str())
                    .desired_width(f32::INFINITY)
                    .desired_rows(8),
            );
        });

    copied
}
