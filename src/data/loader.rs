use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, Int64Array, PrimitiveArray, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Category, DateCell, Record, REQUIRED_COLUMNS};
use crate::error::LoadError;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Knobs for the text loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Field separator for `.csv` / `.txt` files.
    pub delimiter: u8,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Input formats, recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.csv` / `.txt`, delimiter from options.
    Delimited,
    /// `.tsv`
    Tabbed,
    /// `.parquet` / `.pq`
    Parquet,
    /// `.json`
    Json,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(SourceKind::Delimited),
            "tsv" => Ok(SourceKind::Tabbed),
            "parquet" | "pq" => Ok(SourceKind::Parquet),
            "json" => Ok(SourceKind::Json),
            other => Err(LoadError::UnsupportedExtension(other.to_string())),
        }
    }

    /// Line number reported for the first record: text files count the
    /// header line, the other formats count data rows from 1.
    pub fn first_data_line(self) -> u64 {
        match self {
            SourceKind::Delimited | SourceKind::Tabbed => 2,
            SourceKind::Parquet | SourceKind::Json => 1,
        }
    }
}

/// Load sales records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text with a header row (delimiter from options)
/// * `.tsv`          – tab-delimited text with a header row
/// * `.parquet`      – one column per required field; dates as text or `Date32`
/// * `.json`         – `[{ "Order ID": "...", "Sales": 12.5, ... }, ...]`
///
/// In errors, `line` is the file line for delimited text and the 1-based
/// row number for JSON and Parquet (see [`SourceKind::first_data_line`]).
/// Sales, Profit and Discount must be finite numbers.
pub fn load_file(path: &Path, options: &LoaderOptions) -> Result<Vec<Record>, LoadError> {
    let records = match SourceKind::from_path(path)? {
        SourceKind::Delimited => load_csv(path, options.delimiter),
        SourceKind::Tabbed => load_csv(path, b'\t'),
        SourceKind::Parquet => load_parquet(path),
        SourceKind::Json => load_json(path),
    }?;

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn check_required<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: Vec<&str> = present.into_iter().collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !present.contains(col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Exports of this dataset are frequently Windows-1252; invalid UTF-8 is
/// replaced rather than rejected.
fn load_csv(path: &Path, delimiter: u8) -> Result<Vec<Record>, LoadError> {
    let mut bytes = Vec::new();
    open(path)?
        .read_to_end(&mut bytes)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        log::warn!(
            "{} is not valid UTF-8; invalid bytes were replaced",
            path.display()
        );
    }
    load_csv_reader(text.as_bytes(), delimiter)
}

/// Parse delimited text with a header row. Extra columns are ignored.
pub fn load_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Record>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_required(headers.iter())?;

    let mut records = Vec::new();
    let mut row = csv::StringRecord::new();
    while csv_reader.read_record(&mut row)? {
        let line = row.position().map_or(0, |p| p.line());
        let record: Record = row
            .deserialize(Some(&headers))
            .map_err(|e| row_error(e, line))?;
        check_finite(&record, line)?;
        records.push(record);
    }

    Ok(records)
}

/// Field coercion failures become `InvalidRow`; I/O and UTF-8 stay `Csv`.
fn row_error(e: csv::Error, line: u64) -> LoadError {
    let reason = match e.kind() {
        csv::ErrorKind::Deserialize { err, .. } => Some(err.to_string()),
        _ => None,
    };
    match reason {
        Some(reason) => LoadError::InvalidRow { line, reason },
        None => LoadError::Csv(e),
    }
}

/// Sales, Profit and Discount must be finite; NaN and infinities are rejected.
fn check_finite(record: &Record, line: u64) -> Result<(), LoadError> {
    let fields = [
        ("Sales", record.sales),
        ("Profit", record.profit),
        ("Discount", record.discount),
    ];
    match fields.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, value)) => Err(LoadError::InvalidRow {
            line,
            reason: format!("{name} must be a finite number, got {value}"),
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Order ID": "CA-2016-152156", "Order Date": "08/11/2016", "Sales": 261.96, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Record>, LoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;
    records_from_json(root)
}

fn records_from_json(root: JsonValue) -> Result<Vec<Record>, LoadError> {
    let JsonValue::Array(rows) = root else {
        return Err(LoadError::InvalidRow {
            line: 0,
            reason: "expected a top-level JSON array".to_string(),
        });
    };

    if let Some(JsonValue::Object(first)) = rows.first() {
        check_required(first.keys().map(String::as_str))?;
    }

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let line = i as u64 + 1;
            let record = serde_json::from_value::<Record>(row).map_err(|e| {
                LoadError::InvalidRow {
                    line,
                    reason: e.to_string(),
                }
            })?;
            check_finite(&record, line)?;
            Ok(record)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Each required field is one column; numeric columns
/// may be stored as any numeric or string type, dates as text, `Date32`,
/// `Date64` or timestamps.
fn load_parquet(path: &Path) -> Result<Vec<Record>, LoadError> {
    let file = open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let offset = records.len();
        records.extend(records_from_batch(&batch, offset)?);
    }

    Ok(records)
}

/// Typed views over one batch's required columns.
struct BatchColumns {
    order_id: ArrayRef,
    product_name: ArrayRef,
    category: ArrayRef,
    segment: ArrayRef,
    region: ArrayRef,
    order_date: DateColumn,
    ship_date: DateColumn,
    sales: ArrayRef,
    profit: ArrayRef,
    quantity: CountColumn,
    discount: ArrayRef,
}

/// Integer columns keep their values; anything else is read as `f64` and
/// must hold whole numbers.
enum CountColumn {
    Integer(ArrayRef),
    Float(ArrayRef),
}

enum DateColumn {
    Text(ArrayRef),
    Days(ArrayRef),
}

pub(crate) fn records_from_batch(
    batch: &RecordBatch,
    offset: usize,
) -> Result<Vec<Record>, LoadError> {
    let schema = batch.schema();
    check_required(schema.fields().iter().map(|f| f.name().as_str()))?;

    let columns = BatchColumns {
        order_id: cast_column(batch, "Order ID", &DataType::Utf8)?,
        product_name: cast_column(batch, "Product Name", &DataType::Utf8)?,
        category: cast_column(batch, "Category", &DataType::Utf8)?,
        segment: cast_column(batch, "Segment", &DataType::Utf8)?,
        region: cast_column(batch, "Region", &DataType::Utf8)?,
        order_date: date_column(batch, "Order Date")?,
        ship_date: date_column(batch, "Ship Date")?,
        sales: cast_column(batch, "Sales", &DataType::Float64)?,
        profit: cast_column(batch, "Profit", &DataType::Float64)?,
        quantity: count_column(batch, "Quantity")?,
        discount: cast_column(batch, "Discount", &DataType::Float64)?,
    };

    (0..batch.num_rows())
        .map(|row| {
            let line = (offset + row + 1) as u64;
            let category = string_at(&columns.category, row, "Category", line)?;
            let record = Record {
                order_id: string_at(&columns.order_id, row, "Order ID", line)?,
                product_name: string_at(&columns.product_name, row, "Product Name", line)?,
                category: category
                    .parse::<Category>()
                    .map_err(|e| LoadError::InvalidRow {
                        line,
                        reason: e.to_string(),
                    })?,
                segment: string_at(&columns.segment, row, "Segment", line)?,
                region: string_at(&columns.region, row, "Region", line)?,
                order_date: date_at(&columns.order_date, row, "Order Date", line)?,
                ship_date: date_at(&columns.ship_date, row, "Ship Date", line)?,
                sales: f64_at(&columns.sales, row, "Sales", line)?,
                profit: f64_at(&columns.profit, row, "Profit", line)?,
                quantity: count_at(&columns.quantity, row, "Quantity", line)?,
                discount: f64_at(&columns.discount, row, "Discount", line)?,
            };
            check_finite(&record, line)?;
            Ok(record)
        })
        .collect()
}

// -- Parquet / Arrow helpers --

fn cast_column(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef, LoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| LoadError::MissingColumns(vec![name.to_string()]))?;
    Ok(cast(col, to)?)
}

fn count_column(batch: &RecordBatch, name: &str) -> Result<CountColumn, LoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| LoadError::MissingColumns(vec![name.to_string()]))?;
    if col.data_type().is_integer() {
        Ok(CountColumn::Integer(cast(col, &DataType::Int64)?))
    } else {
        Ok(CountColumn::Float(cast(col, &DataType::Float64)?))
    }
}

fn date_column(batch: &RecordBatch, name: &str) -> Result<DateColumn, LoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| LoadError::MissingColumns(vec![name.to_string()]))?;
    match col.data_type() {
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            Ok(DateColumn::Days(cast(col, &DataType::Date32)?))
        }
        _ => Ok(DateColumn::Text(cast(col, &DataType::Utf8)?)),
    }
}

fn null_error(name: &str, line: u64) -> LoadError {
    LoadError::InvalidRow {
        line,
        reason: format!("missing or non-coercible value in '{name}'"),
    }
}

fn string_at(col: &ArrayRef, row: usize, name: &str, line: u64) -> Result<String, LoadError> {
    let arr: &StringArray = col.as_string_opt::<i32>().ok_or_else(|| null_error(name, line))?;
    if arr.is_null(row) {
        return Err(null_error(name, line));
    }
    Ok(arr.value(row).to_string())
}

fn f64_at(col: &ArrayRef, row: usize, name: &str, line: u64) -> Result<f64, LoadError> {
    let arr: &Float64Array = col
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| null_error(name, line))?;
    if arr.is_null(row) {
        return Err(null_error(name, line));
    }
    Ok(arr.value(row))
}

fn count_at(col: &CountColumn, row: usize, name: &str, line: u64) -> Result<i64, LoadError> {
    match col {
        CountColumn::Integer(arr) => {
            let arr: &Int64Array = arr
                .as_primitive_opt::<Int64Type>()
                .ok_or_else(|| null_error(name, line))?;
            if arr.is_null(row) {
                return Err(null_error(name, line));
            }
            Ok(arr.value(row))
        }
        CountColumn::Float(arr) => {
            let value = f64_at(arr, row, name, line)?;
            if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
                return Err(LoadError::InvalidRow {
                    line,
                    reason: format!("{name} must be a whole number, got {value}"),
                });
            }
            Ok(value as i64)
        }
    }
}

fn date_at(col: &DateColumn, row: usize, name: &str, line: u64) -> Result<DateCell, LoadError> {
    match col {
        DateColumn::Text(arr) => string_at(arr, row, name, line).map(DateCell::Text),
        DateColumn::Days(arr) => {
            let days: &PrimitiveArray<Date32Type> = arr
                .as_primitive_opt::<Date32Type>()
                .ok_or_else(|| null_error(name, line))?;
            if days.is_null(row) {
                return Err(null_error(name, line));
            }
            NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_DAYS_FROM_CE + days.value(row))
                .map(DateCell::Date)
                .ok_or_else(|| null_error(name, line))
        }
    }
}
