use chrono::NaiveDate;
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Line, Plot, PlotPoints};

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

/// `$1.2M`, used for sales.
pub fn format_millions(value: f64) -> String {
    format!("${:.1}M", value / 1e6)
}

/// `$12.3k`, used for profit.
pub fn format_thousands(value: f64) -> String {
    format!("${:.1}k", value / 1e3)
}

#[derive(Debug, Clone, Copy)]
pub struct CardColors {
    pub background: Color32,
    pub title: Color32,
    pub line: Color32,
}

/// A coloured card with a title, a big value and a sparkline underneath.
pub fn kpi_card(
    ui: &mut Ui,
    title: &str,
    value: &str,
    series: &[(NaiveDate, f64)],
    colors: CardColors,
) {
    egui::Frame::default()
        .fill(colors.background)
        .corner_radius(12.0)
        .inner_margin(12.0)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(title).size(16.0).color(colors.title));
                ui.label(RichText::new(value).size(24.0).strong().color(Color32::WHITE));
            });
            sparkline(ui, title, series, colors.line);
        });
}

/// Axis-free trend line; days are plotted as days since the first point.
pub fn sparkline(ui: &mut Ui, id: &str, series: &[(NaiveDate, f64)], color: Color32) {
    let Some((first, _)) = series.first() else {
        ui.label(RichText::new("no data").italics().color(Color32::LIGHT_GRAY));
        return;
    };

    let points: PlotPoints = series
        .iter()
        .map(|(date, value)| [(*date - *first).num_days() as f64, *value])
        .collect();

    Plot::new(id)
        .height(40.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .show_background(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).color(color).width(1.0));
        });
}
