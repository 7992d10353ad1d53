//! Typed aggregations over a filtered view.
//!
//! Every function takes the view as `&[&SalesRecord]` and is independent of
//! the others. Only `time_series`, `top_n` and `yearly_category_sales` have an
//! order in their output; the rest are order-insensitive.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use super::model::{Category, SalesRecord};
use crate::error::AggregateError;

// ---------------------------------------------------------------------------
// Field selectors
// ---------------------------------------------------------------------------

/// Numeric columns that can be summed or correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Sales,
    Profit,
    Quantity,
    Discount,
    DaysToShip,
}

impl NumericField {
    /// The heatmap fields, in display order.
    pub const ALL: [NumericField; 5] = [
        NumericField::Sales,
        NumericField::Profit,
        NumericField::Quantity,
        NumericField::Discount,
        NumericField::DaysToShip,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NumericField::Sales => "Sales",
            NumericField::Profit => "Profit",
            NumericField::Quantity => "Quantity",
            NumericField::Discount => "Discount",
            NumericField::DaysToShip => "Days to Ship",
        }
    }

    /// `None` only for `DaysToShip` on records with unparseable dates.
    pub fn value(&self, rec: &SalesRecord) -> Option<f64> {
        match self {
            NumericField::Sales => Some(rec.record.sales),
            NumericField::Profit => Some(rec.record.profit),
            NumericField::Quantity => Some(rec.record.quantity as f64),
            NumericField::Discount => Some(rec.record.discount),
            NumericField::DaysToShip => rec.days_to_ship.map(|d| d as f64),
        }
    }
}

/// Columns records can be grouped by for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    ProductName,
    Category,
    Segment,
    Region,
    OrderId,
}

impl GroupKey {
    pub fn key<'a>(&self, rec: &'a SalesRecord) -> &'a str {
        match self {
            GroupKey::ProductName => &rec.record.product_name,
            GroupKey::Category => rec.record.category.as_str(),
            GroupKey::Segment => &rec.record.segment,
            GroupKey::Region => &rec.record.region,
            GroupKey::OrderId => &rec.record.order_id,
        }
    }
}

/// Per-day quantity plotted by a sparkline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesMetric {
    Sales,
    Profit,
    Quantity,
    DistinctOrders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Largest sums first ("top").
    Highest,
    /// Smallest sums first ("worst").
    Lowest,
}

/// One entry of a ranked list.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub label: String,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Scalar KPIs
// ---------------------------------------------------------------------------

pub fn total_sales(view: &[&SalesRecord]) -> f64 {
    view.iter().map(|r| r.record.sales).sum()
}

pub fn total_profit(view: &[&SalesRecord]) -> f64 {
    view.iter().map(|r| r.record.profit).sum()
}

pub fn distinct_order_count(view: &[&SalesRecord]) -> usize {
    view.iter()
        .map(|r| r.record.order_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// Group by order date, ascending. Records without an order date are skipped.
pub fn time_series(view: &[&SalesRecord], metric: SeriesMetric) -> Vec<(NaiveDate, f64)> {
    match metric {
        SeriesMetric::Sales => daily_sums(view, |r| r.record.sales),
        SeriesMetric::Profit => daily_sums(view, |r| r.record.profit),
        SeriesMetric::Quantity => daily_sums(view, |r| r.record.quantity as f64),
        SeriesMetric::DistinctOrders => {
            let mut orders: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();
            for rec in view {
                if let Some(date) = rec.order_date {
                    orders
                        .entry(date)
                        .or_default()
                        .insert(rec.record.order_id.as_str());
                }
            }
            orders
                .into_iter()
                .map(|(date, ids)| (date, ids.len() as f64))
                .collect()
        }
    }
}

fn daily_sums(
    view: &[&SalesRecord],
    value: impl Fn(&SalesRecord) -> f64,
) -> Vec<(NaiveDate, f64)> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for rec in view {
        if let Some(date) = rec.order_date {
            *sums.entry(date).or_insert(0.0) += value(*rec);
        }
    }
    sums.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Sum `metric` per `key` and return the first `n` groups by `ranking`.
///
/// Groups with equal sums keep the order in which they first appear in
/// the view.
pub fn top_n(
    view: &[&SalesRecord],
    key: GroupKey,
    metric: NumericField,
    n: usize,
    ranking: Ranking,
) -> Vec<Ranked> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64)> = Vec::new();

    for rec in view {
        let Some(value) = metric.value(rec) else {
            continue;
        };
        let label = key.key(rec);
        match index.get(label) {
            Some(&i) => groups[i].1 += value,
            None => {
                index.insert(label, groups.len());
                groups.push((label, value));
            }
        }
    }

    // `sort_by` is stable, which gives the first-seen tie-break.
    match ranking {
        Ranking::Highest => groups.sort_by(|a, b| b.1.total_cmp(&a.1)),
        Ranking::Lowest => groups.sort_by(|a, b| a.1.total_cmp(&b.1)),
    }

    groups
        .into_iter()
        .take(n)
        .map(|(label, value)| Ranked {
            label: label.to_string(),
            value,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shipping time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingStats {
    pub average: f64,
    pub min: i64,
    pub max: i64,
}

fn shipping_days(view: &[&SalesRecord]) -> Vec<i64> {
    view.iter().filter_map(|r| r.days_to_ship).collect()
}

pub fn average_shipping_days(view: &[&SalesRecord]) -> Result<f64, AggregateError> {
    let days = shipping_days(view);
    if days.is_empty() {
        return Err(AggregateError::EmptyInput {
            metric: "average shipping days",
        });
    }
    Ok(days.iter().sum::<i64>() as f64 / days.len() as f64)
}

pub fn min_shipping_days(view: &[&SalesRecord]) -> Result<i64, AggregateError> {
    shipping_days(view).into_iter().min().ok_or(AggregateError::EmptyInput {
        metric: "minimum shipping days",
    })
}

pub fn max_shipping_days(view: &[&SalesRecord]) -> Result<i64, AggregateError> {
    shipping_days(view).into_iter().max().ok_or(AggregateError::EmptyInput {
        metric: "maximum shipping days",
    })
}

pub fn shipping_stats(view: &[&SalesRecord]) -> Result<ShippingStats, AggregateError> {
    Ok(ShippingStats {
        average: average_shipping_days(view)?,
        min: min_shipping_days(view)?,
        max: max_shipping_days(view)?,
    })
}

// ---------------------------------------------------------------------------
// Yearly sales by category (stacked chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: Category,
    /// One total per entry of [`YearlyCategorySales::years`].
    pub totals: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyCategorySales {
    /// Ascending.
    pub years: Vec<i32>,
    /// Stacking order, bottom first.
    pub series: Vec<CategorySeries>,
}

impl YearlyCategorySales {
    /// Height of the stacked bar for `year`; 0 when the year is absent.
    pub fn year_total(&self, year: i32) -> f64 {
        match self.years.iter().position(|&y| y == year) {
            Some(i) => self.series.iter().map(|s| s.totals[i]).sum(),
            None => 0.0,
        }
    }
}

/// Sum sales per (year, category). Series follow `category_order`, with any
/// category it omits appended in declaration order. Records without a year
/// are skipped.
pub fn yearly_category_sales(
    view: &[&SalesRecord],
    category_order: &[Category],
) -> YearlyCategorySales {
    let mut categories: Vec<Category> = Vec::with_capacity(Category::ALL.len());
    for c in category_order.iter().chain(Category::ALL.iter()) {
        if !categories.contains(c) {
            categories.push(*c);
        }
    }

    let mut sums: BTreeMap<i32, HashMap<Category, f64>> = BTreeMap::new();
    for rec in view {
        if let Some(year) = rec.year {
            *sums
                .entry(year)
                .or_default()
                .entry(rec.record.category)
                .or_insert(0.0) += rec.record.sales;
        }
    }

    let years: Vec<i32> = sums.keys().copied().collect();
    let series = categories
        .into_iter()
        .map(|category| CategorySeries {
            category,
            totals: sums
                .values()
                .map(|per_cat| per_cat.get(&category).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    YearlyCategorySales { years, series }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Symmetric Pearson matrix. `NaN` marks an undefined coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub fields: Vec<NumericField>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn is_constant(xs: &[f64]) -> bool {
    xs.windows(2).all(|w| w[0] == w[1])
}

/// Pearson correlation, or `None` for fewer than two points or a constant side.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    let (xs, ys) = (&xs[..n], &ys[..n]);
    if n < 2 || is_constant(xs) || is_constant(ys) {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Pairwise-complete Pearson correlation between `fields`.
///
/// The diagonal is 1.0 unless the field is constant, in which case the whole
/// row and column are `NaN`.
pub fn correlation_matrix(
    view: &[&SalesRecord],
    fields: &[NumericField],
) -> Result<CorrelationMatrix, AggregateError> {
    if view.len() < 2 {
        return Err(AggregateError::TooFewRows {
            metric: "correlation",
            needed: 2,
            found: view.len(),
        });
    }

    let n = fields.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = view
                .iter()
                .filter_map(|r| Some((fields[i].value(r)?, fields[j].value(r)?)))
                .unzip();
            let r = pearson(&xs, &ys)
                .map(|r| if i == j { 1.0 } else { r })
                .unwrap_or(f64::NAN);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        fields: fields.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DateCell, Record};

    fn rec(
        order_id: &str,
        product: &str,
        category: Category,
        date: Option<(i32, u32, u32)>,
        days: Option<i64>,
        sales: f64,
        profit: f64,
    ) -> SalesRecord {
        let order_date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        SalesRecord {
            record: Record {
                order_id: order_id.to_string(),
                product_name: product.to_string(),
                category,
                segment: "Consumer".to_string(),
                region: "West".to_string(),
                order_date: DateCell::Text(String::new()),
                ship_date: DateCell::Text(String::new()),
                sales,
                profit,
                quantity: 1,
                discount: 0.0,
            },
            order_date,
            ship_date: None,
            year: order_date.map(|d| chrono::Datelike::year(&d)),
            month: order_date.map(|d| chrono::Datelike::month(&d)),
            days_to_ship: days,
        }
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            rec("O1", "Chair", Category::Furniture, Some((2016, 1, 2)), Some(3), 100.0, 10.0),
            rec("O1", "Pen", Category::OfficeSupplies, Some((2016, 1, 2)), Some(3), 5.0, -2.0),
            rec("O2", "Phone", Category::Technology, Some((2016, 1, 1)), Some(5), 300.0, 40.0),
            rec("O3", "Chair", Category::Furniture, Some((2017, 3, 9)), None, 50.0, -30.0),
            rec("O4", "Desk", Category::Furniture, None, None, 70.0, 7.0),
        ]
    }

    #[test]
    fn kpis_sum_and_count_distinct_orders() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        assert_eq!(total_sales(&view), 525.0);
        assert_eq!(total_profit(&view), 25.0);
        assert_eq!(distinct_order_count(&view), 4);
    }

    #[test]
    fn empty_view_degrades_gracefully() {
        let view: Vec<&SalesRecord> = Vec::new();
        assert_eq!(total_sales(&view), 0.0);
        assert_eq!(distinct_order_count(&view), 0);
        assert!(time_series(&view, SeriesMetric::Sales).is_empty());
        assert!(
            top_n(&view, GroupKey::ProductName, NumericField::Sales, 5, Ranking::Highest).is_empty()
        );
        assert!(matches!(
            average_shipping_days(&view),
            Err(AggregateError::EmptyInput { .. })
        ));
        assert!(shipping_stats(&view).is_err());
        assert!(yearly_category_sales(&view, &[]).years.is_empty());
        assert!(correlation_matrix(&view, &NumericField::ALL).is_err());
    }

    #[test]
    fn time_series_is_date_ordered_and_skips_undated() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        let sales = time_series(&view, SeriesMetric::Sales);
        let dates: Vec<String> = sales.iter().map(|(d, _)| d.to_string()).collect();
        assert_eq!(dates, ["2016-01-01", "2016-01-02", "2017-03-09"]);
        assert_eq!(sales[1].1, 105.0);

        let orders = time_series(&view, SeriesMetric::DistinctOrders);
        assert_eq!(orders[1].1, 1.0);
    }

    #[test]
    fn quantity_series_sums_units_per_day() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        let units: Vec<f64> = time_series(&view, SeriesMetric::Quantity)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(units, [1.0, 2.0, 1.0]);
    }

    #[test]
    fn group_keys_select_the_grouping_column() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        let labels = |key: GroupKey, n: usize| -> Vec<(String, f64)> {
            top_n(&view, key, NumericField::Sales, n, Ranking::Highest)
                .into_iter()
                .map(|r| (r.label, r.value))
                .collect()
        };

        assert_eq!(
            labels(GroupKey::Category, 3),
            [
                ("Technology".to_string(), 300.0),
                ("Furniture".to_string(), 220.0),
                ("Office Supplies".to_string(), 5.0),
            ]
        );
        assert_eq!(
            labels(GroupKey::OrderId, 2),
            [("O2".to_string(), 300.0), ("O1".to_string(), 105.0)]
        );
        assert_eq!(labels(GroupKey::Segment, 5), [("Consumer".to_string(), 525.0)]);
        assert_eq!(labels(GroupKey::Region, 5), [("West".to_string(), 525.0)]);
    }

    #[test]
    fn top_n_sums_per_group_and_ranks() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        let top = top_n(&view, GroupKey::ProductName, NumericField::Sales, 2, Ranking::Highest);
        assert_eq!(
            top,
            vec![
                Ranked { label: "Phone".into(), value: 300.0 },
                Ranked { label: "Chair".into(), value: 150.0 },
            ]
        );

        let worst = top_n(&view, GroupKey::ProductName, NumericField::Profit, 1, Ranking::Lowest);
        assert_eq!(worst, vec![Ranked { label: "Chair".into(), value: -20.0 }]);
    }

    #[test]
    fn lowest_is_reverse_of_highest_for_distinct_sums() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        let mut top =
            top_n(&view, GroupKey::ProductName, NumericField::Sales, 10, Ranking::Highest);
        let worst = top_n(&view, GroupKey::ProductName, NumericField::Sales, 10, Ranking::Lowest);
        top.reverse();
        assert_eq!(top, worst);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let data = vec![
            rec("A", "Zebra lamp", Category::Furniture, None, None, 10.0, 0.0),
            rec("B", "Apple stand", Category::Furniture, None, None, 10.0, 0.0),
            rec("C", "Big desk", Category::Furniture, None, None, 20.0, 0.0),
        ];
        let view: Vec<&SalesRecord> = data.iter().collect();
        let labels = |r: Ranking| -> Vec<String> {
            top_n(&view, GroupKey::ProductName, NumericField::Sales, 5, r)
                .into_iter()
                .map(|e| e.label)
                .collect()
        };
        assert_eq!(labels(Ranking::Highest), ["Big desk", "Zebra lamp", "Apple stand"]);
        assert_eq!(labels(Ranking::Lowest), ["Zebra lamp", "Apple stand", "Big desk"]);
    }

    #[test]
    fn shipping_stats_ignore_null_days() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        let stats = shipping_stats(&view).unwrap();
        assert!((stats.average - 11.0 / 3.0).abs() < 1e-12);
        assert_eq!((stats.min, stats.max), (3, 5));
    }

    #[test]
    fn yearly_category_sales_stacks_in_configured_order() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        let yearly = yearly_category_sales(&view, &[Category::Technology]);
        assert_eq!(yearly.years, vec![2016, 2017]);
        let order: Vec<Category> = yearly.series.iter().map(|s| s.category).collect();
        assert_eq!(
            order,
            [Category::Technology, Category::Furniture, Category::OfficeSupplies]
        );
        assert_eq!(yearly.series[0].totals, vec![300.0, 0.0]);
        assert_eq!(yearly.series[1].totals, vec![100.0, 50.0]);
        assert_eq!(yearly.year_total(2016), 405.0);
        assert_eq!(yearly.year_total(2020), 0.0);
    }

    #[test]
    fn pearson_detects_perfect_and_undefined_correlation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[0.1, 0.1, 0.1, 0.1]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_nan_for_constant_fields() {
        let data = sample();
        let view: Vec<&SalesRecord> = data.iter().collect();
        let m = correlation_matrix(&view, &NumericField::ALL).unwrap();
        assert_eq!(m.len(), 5);
        for i in 0..m.len() {
            for j in 0..m.len() {
                let (a, b) = (m.get(i, j), m.get(j, i));
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
        assert_eq!(m.get(0, 0), 1.0);
        // Quantity and Discount are constant in the sample.
        assert!(m.get(2, 2).is_nan());
        assert!(m.get(0, 3).is_nan());
        assert!(m.get(0, 1) > 0.0);
    }

    #[test]
    fn correlation_needs_two_rows() {
        let data = vec![rec("A", "Chair", Category::Furniture, None, None, 1.0, 1.0)];
        let view: Vec<&SalesRecord> = data.iter().collect();
        assert_eq!(
            correlation_matrix(&view, &NumericField::ALL),
            Err(AggregateError::TooFewRows { metric: "correlation", needed: 2, found: 1 })
        );
    }
}
