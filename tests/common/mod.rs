#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use superstore_dashboard::data::model::REQUIRED_COLUMNS;
use tempfile::TempDir;

/// One CSV data line, fields in `REQUIRED_COLUMNS` order.
pub struct Row {
    pub order_id: &'static str,
    pub product: &'static str,
    pub category: &'static str,
    pub segment: &'static str,
    pub region: &'static str,
    pub order_date: &'static str,
    pub ship_date: &'static str,
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
    pub discount: f64,
}

impl Row {
    pub fn new(order_id: &'static str, product: &'static str, sales: f64) -> Self {
        Row {
            order_id,
            product,
            category: "Furniture",
            segment: "Consumer",
            region: "West",
            order_date: "01/01/2024",
            ship_date: "05/01/2024",
            sales,
            profit: sales / 10.0,
            quantity: 1,
            discount: 0.0,
        }
    }

    fn line(&self, delimiter: char) -> String {
        [
            self.order_id.to_string(),
            self.product.to_string(),
            self.category.to_string(),
            self.segment.to_string(),
            self.region.to_string(),
            self.order_date.to_string(),
            self.ship_date.to_string(),
            self.sales.to_string(),
            self.profit.to_string(),
            self.quantity.to_string(),
            self.discount.to_string(),
        ]
        .join(&delimiter.to_string())
    }
}

/// Render a header plus rows with the given delimiter.
pub fn render(rows: &[Row], delimiter: char) -> String {
    let mut text = REQUIRED_COLUMNS.join(&delimiter.to_string());
    text.push('\n');
    for row in rows {
        text.push_str(&row.line(delimiter));
        text.push('\n');
    }
    text
}

/// Write `contents` to `name` inside a fresh temporary directory.
/// The directory lives as long as the returned guard.
pub fn write_fixture(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    (dir, path)
}

/// A small multi-year dataset covering every category, two regions and
/// two segments.
pub fn superstore_rows() -> Vec<Row> {
    vec![
        Row {
            category: "Furniture",
            region: "West",
            segment: "Consumer",
            order_date: "03/02/2016",
            ship_date: "07/02/2016",
            profit: 41.9,
            quantity: 2,
            ..Row::new("CA-2016-1", "Bookcase", 261.96)
        },
        Row {
            category: "Office Supplies",
            region: "East",
            segment: "Corporate",
            order_date: "03/02/2016",
            ship_date: "07/02/2016",
            profit: 6.87,
            quantity: 2,
            ..Row::new("CA-2016-1", "Binder", 14.62)
        },
        Row {
            category: "Technology",
            region: "West",
            segment: "Consumer",
            order_date: "11/06/2016",
            ship_date: "18/06/2016",
            profit: -383.03,
            quantity: 5,
            discount: 0.45,
            ..Row::new("CA-2016-2", "Copier", 957.58)
        },
        Row {
            category: "Office Supplies",
            region: "East",
            segment: "Consumer",
            order_date: "15/03/2017",
            ship_date: "16/03/2017",
            profit: 2.52,
            quantity: 3,
            ..Row::new("CA-2017-3", "Staples", 22.37)
        },
        Row {
            category: "Technology",
            region: "East",
            segment: "Corporate",
            order_date: "22/09/2017",
            ship_date: "22/09/2017",
            profit: 90.72,
            quantity: 4,
            ..Row::new("CA-2017-4", "Phone", 907.15)
        },
        Row {
            category: "Furniture",
            region: "West",
            segment: "Corporate",
            order_date: "30/12/2017",
            ship_date: "03/01/2018",
            profit: -60.4,
            quantity: 1,
            discount: 0.2,
            ..Row::new("CA-2017-5", "Chair", 731.94)
        },
    ]
}
