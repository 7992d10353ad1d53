use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use superstore_dashboard::data::model::REQUIRED_COLUMNS;

const ROWS: usize = 2_000;
const FIRST_YEAR: i32 = 2014;
const YEARS: u32 = 4;

const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];
const SEGMENTS: [(&str, f64); 3] = [("Consumer", 0.52), ("Corporate", 0.30), ("Home Office", 0.18)];

/// (category, product, base unit price)
const PRODUCTS: [(&str, &str, f64); 15] = [
    ("Furniture", "Bretford Rectangular Conference Table", 380.0),
    ("Furniture", "Hon Deluxe Fabric Upholstered Stacking Chairs", 230.0),
    ("Furniture", "Bush Somerset Collection Bookcase", 260.0),
    ("Furniture", "Eldon Expressions Wood Desk Accessories", 12.0),
    ("Furniture", "Tenex Chairmats For Use With Carpeted Floors", 48.0),
    ("Office Supplies", "Staple envelope", 9.0),
    ("Office Supplies", "Easy-staple paper", 24.0),
    ("Office Supplies", "Avery Non-Stick Binders", 6.0),
    ("Office Supplies", "Fellowes PB500 Electric Punch", 520.0),
    ("Office Supplies", "GBC DocuBind TL300 Binding System", 460.0),
    ("Technology", "Canon imageCLASS 2200 Advanced Copier", 3_500.0),
    ("Technology", "Apple Smart Phone, Full Size", 680.0),
    ("Technology", "Logitech G19 Programmable Gaming Keyboard", 150.0),
    ("Technology", "Cisco TelePresence System EX90", 2_200.0),
    ("Technology", "Plantronics Headset", 75.0),
];

const DISCOUNTS: [f64; 6] = [0.0, 0.0, 0.0, 0.1, 0.2, 0.5];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    order_id: String,
    product: &'static str,
    category: &'static str,
    segment: &'static str,
    region: &'static str,
    order_date: NaiveDate,
    ship_date: NaiveDate,
    sales: f64,
    profit: f64,
    quantity: i64,
    discount: f64,
}

fn weighted_segment(rng: &mut SimpleRng) -> &'static str {
    let mut u = rng.next_f64();
    for (segment, weight) in SEGMENTS {
        if u < weight {
            return segment;
        }
        u -= weight;
    }
    SEGMENTS[SEGMENTS.len() - 1].0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Orders hold one to four lines sharing id, dates, segment and region.
fn generate_rows(rng: &mut SimpleRng, start: NaiveDate) -> Vec<Row> {
    let span_days = (YEARS * 365) as usize;
    let mut rows = Vec::with_capacity(ROWS);
    let mut order_no = 0u32;

    while rows.len() < ROWS {
        order_no += 1;
        let order_date = start + Duration::days(rng.below(span_days) as i64);
        let ship_date = order_date + Duration::days(rng.below(8) as i64);
        let order_id = format!("US-{}-{:06}", order_date.year(), 100_000 + order_no);
        let segment = weighted_segment(rng);
        let region = *rng.pick(&REGIONS);
        let lines = 1 + rng.below(4);

        for _ in 0..lines.min(ROWS - rows.len()) {
            let (category, product, price) = *rng.pick(&PRODUCTS);
            let quantity = 1 + rng.below(9) as i64;
            let discount = *rng.pick(&DISCOUNTS);
            let unit = price * rng.gauss(1.0, 0.08).max(0.5);
            let sales = round2(unit * quantity as f64 * (1.0 - discount));
            // Heavy discounts tend to lose money.
            let margin = rng.gauss(0.18 - discount * 0.9, 0.08);
            let profit = round2(sales * margin);

            rows.push(Row {
                order_id: order_id.clone(),
                product,
                category,
                segment,
                region,
                order_date,
                ship_date,
                sales,
                profit,
                quantity,
                discount,
            });
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[Row]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(REQUIRED_COLUMNS)?;
    for r in rows {
        writer.write_record([
            r.order_id.clone(),
            r.product.to_string(),
            r.category.to_string(),
            r.segment.to_string(),
            r.region.to_string(),
            r.order_date.format("%d/%m/%Y").to_string(),
            r.ship_date.format("%d/%m/%Y").to_string(),
            r.sales.to_string(),
            r.profit.to_string(),
            r.quantity.to_string(),
            r.discount.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(rows: &[Row], epoch: NaiveDate) -> anyhow::Result<RecordBatch> {
    let days = |d: NaiveDate| (d - epoch).num_days() as i32;

    let schema = Arc::new(Schema::new(vec![
        Field::new(REQUIRED_COLUMNS[0], DataType::Utf8, false),
        Field::new(REQUIRED_COLUMNS[1], DataType::Utf8, false),
        Field::new(REQUIRED_COLUMNS[2], DataType::Utf8, false),
        Field::new(REQUIRED_COLUMNS[3], DataType::Utf8, false),
        Field::new(REQUIRED_COLUMNS[4], DataType::Utf8, false),
        Field::new(REQUIRED_COLUMNS[5], DataType::Date32, false),
        Field::new(REQUIRED_COLUMNS[6], DataType::Date32, false),
        Field::new(REQUIRED_COLUMNS[7], DataType::Float64, false),
        Field::new(REQUIRED_COLUMNS[8], DataType::Float64, false),
        Field::new(REQUIRED_COLUMNS[9], DataType::Int64, false),
        Field::new(REQUIRED_COLUMNS[10], DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.order_id.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.product))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.category))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.segment))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.region))),
            Arc::new(Date32Array::from_iter_values(rows.iter().map(|r| days(r.order_date)))),
            Arc::new(Date32Array::from_iter_values(rows.iter().map(|r| days(r.ship_date)))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.sales))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.profit))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.quantity))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.discount))),
        ],
    )?;
    Ok(batch)
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(FIRST_YEAR, 1, 1).context("invalid start date")?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;

    let rows = generate_rows(&mut rng, start);

    let csv_path = "sample_superstore.csv";
    write_csv(csv_path, &rows)?;

    // Parquet keeps real Date32 columns.
    let parquet_path = "sample_superstore.parquet";
    let batch = to_batch(&rows, epoch)?;
    let file = std::fs::File::create(parquet_path)
        .with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!("Wrote {} rows to {csv_path} and {parquet_path}", rows.len());
    Ok(())
}
