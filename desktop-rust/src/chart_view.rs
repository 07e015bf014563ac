use calorie_ai_rust::chart::{CHART_TITLE, CalorieChart, NO_DATA_LABEL, X_AXIS_LABEL, Y_AXIS_LABEL};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};

const MARGIN_LEFT: f32 = 70.0;
const MARGIN_RIGHT: f32 = 30.0;
const MARGIN_TOP: f32 = 40.0;
const MARGIN_BOTTOM: f32 = 60.0;
const Y_TICKS: usize = 5;

const AXIS_COLOR: Color32 = Color32::from_gray(170);
const GRID_COLOR: Color32 = Color32::from_gray(60);
const LINE_COLOR: Color32 = Color32::from_rgb(246, 196, 69);

pub fn show(ui: &mut egui::Ui, chart: &CalorieChart) {
    let size = ui.available_size().max(egui::vec2(320.0, 240.0));
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);

    painter.text(
        Pos2::new(rect.center().x, rect.top() + 8.0),
        Align2::CENTER_TOP,
        CHART_TITLE,
        FontId::proportional(18.0),
        Color32::WHITE,
    );

    let plot = Rect::from_min_max(
        Pos2::new(rect.left() + MARGIN_LEFT, rect.top() + MARGIN_TOP),
        Pos2::new(rect.right() - MARGIN_RIGHT, rect.bottom() - MARGIN_BOTTOM),
    );
    draw_axes(&painter, plot);

    if chart.is_empty() {
        painter.text(
            plot.center(),
            Align2::CENTER_CENTER,
            NO_DATA_LABEL,
            FontId::proportional(16.0),
            AXIS_COLOR,
        );
        return;
    }

    let to_screen = |x: f32, y: f32| {
        Pos2::new(
            plot.left() + x * plot.width(),
            plot.bottom() - y * plot.height(),
        )
    };

    for tick in chart.y_ticks(Y_TICKS) {
        let y = to_screen(0.0, chart.y_fraction(tick)).y;
        painter.line_segment(
            [Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)],
            Stroke::new(1.0, GRID_COLOR),
        );
        painter.text(
            Pos2::new(plot.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            tick.to_string(),
            FontId::proportional(12.0),
            AXIS_COLOR,
        );
    }

    for (x, label) in chart.date_labels() {
        let pos = to_screen(x, 0.0);
        painter.line_segment([pos, pos + egui::vec2(0.0, 4.0)], Stroke::new(1.0, AXIS_COLOR));
        painter.text(
            pos + egui::vec2(0.0, 6.0),
            Align2::CENTER_TOP,
            label,
            FontId::proportional(11.0),
            AXIS_COLOR,
        );
    }

    let points: Vec<Pos2> = chart
        .points()
        .iter()
        .map(|p| to_screen(chart.x_fraction(p.date), chart.y_fraction(p.total)))
        .collect();
    if points.len() > 1 {
        painter.add(egui::Shape::line(points.clone(), Stroke::new(2.0, LINE_COLOR)));
    }
    for point in points {
        painter.circle_filled(point, 4.0, LINE_COLOR);
    }
}

fn draw_axes(painter: &egui::Painter, plot: Rect) {
    let stroke = Stroke::new(1.5, AXIS_COLOR);
    painter.line_segment([plot.left_bottom(), plot.right_bottom()], stroke);
    painter.line_segment([plot.left_bottom(), plot.left_top()], stroke);

    painter.text(
        Pos2::new(plot.center().x, plot.bottom() + MARGIN_BOTTOM - 14.0),
        Align2::CENTER_CENTER,
        X_AXIS_LABEL,
        FontId::proportional(13.0),
        AXIS_COLOR,
    );
    painter.text(
        Pos2::new(plot.left() - MARGIN_LEFT + 4.0, plot.top() - 18.0),
        Align2::LEFT_CENTER,
        Y_AXIS_LABEL,
        FontId::proportional(13.0),
        AXIS_COLOR,
    );
}
