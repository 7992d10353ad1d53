use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Category – the fixed product taxonomy
// ---------------------------------------------------------------------------

/// Product category. Declaration order is the default stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Furniture,
    OfficeSupplies,
    Technology,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Furniture,
        Category::OfficeSupplies,
        Category::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Furniture => "Furniture",
            Category::OfficeSupplies => "Office Supplies",
            Category::Technology => "Technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// DateCell – a date as it came out of the source file
// ---------------------------------------------------------------------------

/// Text formats (CSV, JSON) hand dates over unparsed; Parquet may already
/// carry a typed `Date32` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCell {
    Text(String),
    Date(NaiveDate),
}

impl<'de> Deserialize<'de> for DateCell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(DateCell::Text)
    }
}

impl fmt::Display for DateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateCell::Text(s) => write!(f, "{s}"),
            DateCell::Date(d) => write!(f, "{}", d.format("%d/%m/%Y")),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the input table
// ---------------------------------------------------------------------------

/// One sales transaction line exactly as loaded. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    #[serde(rename = "Order ID")]
    pub order_id: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Order Date")]
    pub order_date: DateCell,
    #[serde(rename = "Ship Date")]
    pub ship_date: DateCell,
    #[serde(rename = "Sales")]
    pub sales: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "Discount")]
    pub discount: f64,
}

/// Header names every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "Order ID",
    "Product Name",
    "Category",
    "Segment",
    "Region",
    "Order Date",
    "Ship Date",
    "Sales",
    "Profit",
    "Quantity",
    "Discount",
];

// ---------------------------------------------------------------------------
// SalesRecord – a record plus its derived time fields
// ---------------------------------------------------------------------------

/// A loaded record with the fields the enricher derives from its dates.
/// All derived fields are `None` when the order date could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub record: Record,
    pub order_date: Option<NaiveDate>,
    pub ship_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// `ship_date - order_date` in days; negative when the data is inconsistent.
    pub days_to_ship: Option<i64>,
}

// ---------------------------------------------------------------------------
// SalesTable – the complete enriched dataset
// ---------------------------------------------------------------------------

/// Sorted distinct values offered by the filter widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub regions: Vec<String>,
    pub categories: Vec<Category>,
    pub segments: Vec<String>,
}

/// The full enriched dataset. Loaded once, shared by reference afterwards.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    pub records: Vec<SalesRecord>,
    pub options: FilterOptions,
}

impl SalesTable {
    /// Build the filter option index from the enriched records.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let mut years = BTreeSet::new();
        let mut months = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut segments = BTreeSet::new();

        for rec in &records {
            years.extend(rec.year);
            months.extend(rec.month);
            regions.insert(rec.record.region.clone());
            categories.insert(rec.record.category);
            segments.insert(rec.record.segment.clone());
        }

        SalesTable {
            records,
            options: FilterOptions {
                years: years.into_iter().collect(),
                months: months.into_iter().collect(),
                regions: regions.into_iter().collect(),
                categories: categories.into_iter().collect(),
                segments: segments.into_iter().collect(),
            },
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow every record as a view, in load order.
    pub fn view(&self) -> Vec<&SalesRecord> {
        self.records.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_display_names() {
        assert_eq!("Office Supplies".parse(), Ok(Category::OfficeSupplies));
        assert_eq!(" technology ".parse(), Ok(Category::Technology));
        assert_eq!(
            "Toys".parse::<Category>(),
            Err(UnknownCategory("Toys".to_string()))
        );
        assert_eq!(Category::Furniture.to_string(), "Furniture");
    }

    #[test]
    fn date_cell_displays_day_first() {
        let cell = DateCell::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(cell.to_string(), "05/01/2024");
    }
}
