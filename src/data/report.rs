use chrono::NaiveDate;

use super::aggregate::{
    correlation_matrix, distinct_order_count, shipping_stats, time_series, top_n,
    total_profit, total_sales, yearly_category_sales, CorrelationMatrix, GroupKey,
    NumericField, Ranked, Ranking, SeriesMetric, ShippingStats, YearlyCategorySales,
};
use super::model::{Category, SalesRecord};

/// Sizes and ordering the report needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub top_sales: usize,
    pub top_profit: usize,
    pub worst_loss: usize,
    /// Stacking order for the yearly category chart.
    pub category_order: Vec<Category>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_sales: 10,
            top_profit: 10,
            worst_loss: 5,
            category_order: Category::ALL.to_vec(),
        }
    }
}

/// Everything the dashboard renders for one filter selection.
///
/// `None` in `shipping` or `correlation` means the statistic is undefined for
/// this view and the panel shows "no data".
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub row_count: usize,
    pub total_sales: f64,
    pub total_profit: f64,
    pub order_count: usize,
    pub sales_series: Vec<(NaiveDate, f64)>,
    pub profit_series: Vec<(NaiveDate, f64)>,
    pub orders_series: Vec<(NaiveDate, f64)>,
    pub top_sales: Vec<Ranked>,
    pub top_profit: Vec<Ranked>,
    pub worst_loss: Vec<Ranked>,
    pub shipping: Option<ShippingStats>,
    pub yearly: YearlyCategorySales,
    pub correlation: Option<CorrelationMatrix>,
}

impl DashboardReport {
    pub fn build(view: &[&SalesRecord], settings: &ReportSettings) -> Self {
        let shipping = shipping_stats(view)
            .inspect_err(|e| log::debug!("shipping panel: {e}"))
            .ok();
        let correlation = correlation_matrix(view, &NumericField::ALL)
            .inspect_err(|e| log::debug!("correlation panel: {e}"))
            .ok();

        DashboardReport {
            row_count: view.len(),
            total_sales: total_sales(view),
            total_profit: total_profit(view),
            order_count: distinct_order_count(view),
            sales_series: time_series(view, SeriesMetric::Sales),
            profit_series: time_series(view, SeriesMetric::Profit),
            orders_series: time_series(view, SeriesMetric::DistinctOrders),
            top_sales: top_n(
                view,
                GroupKey::ProductName,
                NumericField::Sales,
                settings.top_sales,
                Ranking::Highest,
            ),
            top_profit: top_n(
                view,
                GroupKey::ProductName,
                NumericField::Profit,
                settings.top_profit,
                Ranking::Highest,
            ),
            worst_loss: top_n(
                view,
                GroupKey::ProductName,
                NumericField::Profit,
                settings.worst_loss,
                Ranking::Lowest,
            ),
            shipping,
            yearly: yearly_category_sales(view, &settings.category_order),
            correlation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::enrich::{enrich, EnrichOptions};
    use crate::data::model::{DateCell, Record};

    fn record(product: &str, sales: f64, profit: f64) -> Record {
        Record {
            order_id: format!("O-{product}"),
            product_name: product.to_string(),
            category: Category::Technology,
            segment: "Consumer".to_string(),
            region: "Central".to_string(),
            order_date: DateCell::Text("01/01/2024".to_string()),
            ship_date: DateCell::Text("05/01/2024".to_string()),
            sales,
            profit,
            quantity: 1,
            discount: 0.0,
        }
    }

    #[test]
    fn report_respects_configured_sizes() {
        let records = (0..12)
            .map(|i| record(&format!("P{i}"), i as f64 * 10.0, i as f64 - 6.0))
            .collect();
        let table = enrich(records, &EnrichOptions::default()).unwrap();
        let settings = ReportSettings {
            top_sales: 3,
            worst_loss: 2,
            ..ReportSettings::default()
        };
        let report = DashboardReport::build(&table.view(), &settings);

        assert_eq!(report.row_count, 12);
        assert_eq!(report.top_sales.len(), 3);
        assert_eq!(report.top_sales[0].label, "P11");
        assert_eq!(report.top_profit.len(), 10);
        assert_eq!(
            report.worst_loss.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            ["P0", "P1"]
        );
        assert_eq!(report.shipping.map(|s| s.average), Some(4.0));
        assert!(report.correlation.is_some());
    }

    #[test]
    fn empty_view_marks_undefined_panels() {
        let report = DashboardReport::build(&[], &ReportSettings::default());
        assert!(report.is_empty());
        assert_eq!(report.total_sales, 0.0);
        assert!(report.top_sales.is_empty());
        assert!(report.shipping.is_none());
        assert!(report.correlation.is_none());
    }
}
