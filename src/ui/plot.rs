use eframe::egui::{
    self, pos2, vec2, Align2, Color32, FontId, Rect, RichText, ScrollArea, Sense, Ui,
};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};
use superstore_dashboard::data::aggregate::{
    CorrelationMatrix, Ranked, ShippingStats, YearlyCategorySales,
};

use crate::color::ChartStyles;
use crate::state::AppState;
use crate::ui::cards::{format_millions, format_thousands, kpi_card, CardColors};

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render KPI cards and every chart for the current report.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let report = match &state.report {
        Some(r) => r,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view the dashboard  (File → Open…)");
            });
            return;
        }
    };
    let styles = &state.styles;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Superstore Sales Dashboard");
            if report.is_empty() {
                ui.label(RichText::new("No records match the current filters.").italics());
            }
            ui.add_space(8.0);

            // ---- KPI cards ----
            ui.columns(3, |cols| {
                let card = |line| CardColors {
                    background: styles.card_background,
                    title: styles.card_title,
                    line,
                };
                kpi_card(
                    &mut cols[0],
                    "Total Sales",
                    &format_millions(report.total_sales),
                    &report.sales_series,
                    card(styles.sales),
                );
                kpi_card(
                    &mut cols[1],
                    "Total Profit",
                    &format_thousands(report.total_profit),
                    &report.profit_series,
                    card(styles.profit),
                );
                kpi_card(
                    &mut cols[2],
                    "Number of Orders",
                    &report.order_count.to_string(),
                    &report.orders_series,
                    card(styles.orders),
                );
            });
            ui.add_space(16.0);

            // ---- Rankings ----
            ui.columns(2, |cols| {
                section(&mut cols[0], "Top Products by Sales");
                ranked_chart(
                    &mut cols[0],
                    "top_sales",
                    &report.top_sales,
                    styles.sales,
                    "Sales ($)",
                );
                section(&mut cols[1], "Top Products by Profit");
                ranked_chart(
                    &mut cols[1],
                    "top_profit",
                    &report.top_profit,
                    styles.profit,
                    "Profit ($)",
                );
            });
            ui.add_space(16.0);

            ui.columns(2, |cols| {
                section(&mut cols[0], "Worst Products by Loss");
                ranked_chart(
                    &mut cols[0],
                    "worst_loss",
                    &report.worst_loss,
                    styles.loss,
                    "Profit ($)",
                );
                section(&mut cols[1], "Average Shipping Time (days)");
                shipping_chart(&mut cols[1], report.shipping.as_ref(), styles.shipping);
            });
            ui.add_space(16.0);

            ui.columns(2, |cols| {
                section(&mut cols[0], "Yearly Sales Trends by Category");
                yearly_chart(&mut cols[0], &report.yearly, styles);
                section(&mut cols[1], "Correlation Heatmap");
                correlation_heatmap(&mut cols[1], report.correlation.as_ref(), styles);
            });
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.label(RichText::new(title).size(18.0).strong());
    ui.add_space(4.0);
}

fn no_data(ui: &mut Ui) {
    ui.label(RichText::new("No data for the current filters.").italics().color(Color32::GRAY));
}

/// Read-only plot: no drag, zoom or scroll.
fn fixed(plot: Plot) -> Plot {
    plot.height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
}

// ---------------------------------------------------------------------------
// Ranked bar charts
// ---------------------------------------------------------------------------

fn ranked_chart(ui: &mut Ui, id: &str, entries: &[Ranked], color: Color32, value_label: &str) {
    if entries.is_empty() {
        no_data(ui);
        return;
    }

    // First entry drawn at the top.
    let n = entries.len();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Bar::new((n - i) as f64, e.value)
                .name(&e.label)
                .fill(color)
                .width(0.7)
        })
        .collect();

    fixed(Plot::new(id))
        .show_axes([true, false])
        .x_axis_label(value_label)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(color));
        });

    ranked_table(ui, id, entries);
}

fn ranked_table(ui: &mut Ui, id: &str, entries: &[Ranked]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::exact(28.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::remainder().clip(true))
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("Value");
                });
                header.col(|ui| {
                    ui.strong("Product");
                });
            })
            .body(|mut body| {
                for (i, entry) in entries.iter().enumerate() {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label((i + 1).to_string());
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2}", entry.value));
                        });
                        row.col(|ui| {
                            ui.label(&entry.label);
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Shipping time
// ---------------------------------------------------------------------------

/// Single average bar; the y range spans the fastest and slowest shipment.
fn shipping_chart(ui: &mut Ui, stats: Option<&ShippingStats>, color: Color32) {
    let Some(stats) = stats else {
        no_data(ui);
        return;
    };

    ui.label(format!(
        "Average {:.1} days  (min {}, max {})",
        stats.average, stats.min, stats.max
    ));

    let bar = Bar::new(0.0, stats.average)
        .name("Average Days to Ship")
        .fill(color)
        .width(0.5);

    fixed(Plot::new("shipping_time"))
        .include_x(-1.0)
        .include_x(1.0)
        .include_y(stats.min as f64)
        .include_y(stats.max as f64)
        .y_axis_label("Days")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(vec![bar]).color(color));
        });
}

// ---------------------------------------------------------------------------
// Yearly sales by category (stacked)
// ---------------------------------------------------------------------------

fn yearly_chart(ui: &mut Ui, yearly: &YearlyCategorySales, styles: &ChartStyles) {
    if yearly.years.is_empty() {
        no_data(ui);
        return;
    }

    let mut charts: Vec<BarChart> = Vec::with_capacity(yearly.series.len());
    for series in &yearly.series {
        let color = styles.category_color(series.category);
        let bars: Vec<Bar> = yearly
            .years
            .iter()
            .zip(&series.totals)
            .map(|(year, total)| {
                Bar::new(*year as f64, *total)
                    .name(format!("{} {year}", series.category))
                    .fill(color)
                    .width(0.6)
            })
            .collect();

        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(series.category.as_str())
            .color(color)
            .stack_on(&below);
        charts.push(chart);
    }

    fixed(Plot::new("yearly_sales"))
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Sales ($)")
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Painted grid: one coloured cell per coefficient, "n/a" where undefined.
fn correlation_heatmap(ui: &mut Ui, matrix: Option<&CorrelationMatrix>, styles: &ChartStyles) {
    let Some(matrix) = matrix else {
        no_data(ui);
        return;
    };

    let n = matrix.len();
    let label_width = 96.0;
    let header_height = 24.0;
    let cell = ((ui.available_width() - label_width) / n.max(1) as f32).clamp(36.0, 72.0);
    let size = vec2(label_width + cell * n as f32, header_height + cell * n as f32);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let font = FontId::proportional(12.0);
    let text_color = ui.visuals().text_color();

    for (j, field) in matrix.fields.iter().enumerate() {
        let pos = pos2(
            rect.min.x + label_width + cell * (j as f32 + 0.5),
            rect.min.y + header_height / 2.0,
        );
        painter.text(pos, Align2::CENTER_CENTER, field.label(), font.clone(), text_color);
    }

    for (i, field) in matrix.fields.iter().enumerate() {
        let top = rect.min.y + header_height + cell * i as f32;
        painter.text(
            pos2(rect.min.x + label_width - 6.0, top + cell / 2.0),
            Align2::RIGHT_CENTER,
            field.label(),
            font.clone(),
            text_color,
        );

        for j in 0..n {
            let value = matrix.get(i, j);
            let fill = styles.heat_color(value);
            let cell_rect = Rect::from_min_size(
                pos2(rect.min.x + label_width + cell * j as f32, top),
                vec2(cell, cell),
            )
            .shrink(1.0);
            painter.rect_filled(cell_rect, 0.0, fill);

            let label = if value.is_nan() {
                "n/a".to_string()
            } else {
                format!("{value:.2}")
            };
            painter.text(
                cell_rect.center(),
                Align2::CENTER_CENTER,
                label,
                font.clone(),
                ChartStyles::text_on(fill),
            );
        }
    }

    ui.add_space(4.0);
    egui::Grid::new("heatmap_legend").show(ui, |ui: &mut Ui| {
        for (label, value) in [("-1", -1.0), ("0", 0.0), ("+1", 1.0)] {
            let (swatch, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
            ui.painter().rect_filled(swatch, 0.0, styles.heat_color(value));
            ui.label(label);
        }
    });
}
