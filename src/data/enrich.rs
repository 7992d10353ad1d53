use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::model::{DateCell, Record, SalesRecord, SalesTable};
use crate::error::DateParseError;

/// Day-first formats tried in order when none are configured.
pub const DEFAULT_DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// What to do with a date cell no format accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateErrorPolicy {
    /// Keep the record with null derived fields.
    #[default]
    Tolerate,
    /// Abort enrichment with [`DateParseError`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    pub date_formats: Vec<String>,
    pub on_bad_date: DateErrorPolicy,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            on_bad_date: DateErrorPolicy::default(),
        }
    }
}

/// Parse a day-first date, trying each format in turn. A trailing time of
/// day (`05/01/2024 13:45`) is accepted and dropped.
pub fn parse_day_first(text: &str, formats: &[String]) -> Option<NaiveDate> {
    let text = text.trim();
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt).ok().or_else(|| {
            ["%H:%M:%S", "%H:%M"].iter().find_map(|time| {
                NaiveDateTime::parse_from_str(text, &format!("{fmt} {time}"))
                    .ok()
                    .map(|dt| dt.date())
            })
        })
    })
}

/// Derive Year, Month and DaysToShip for every record.
///
/// Order and cardinality are preserved. `line` in a [`DateParseError`] is the
/// 1-based data row.
pub fn enrich(
    records: Vec<Record>,
    options: &EnrichOptions,
) -> Result<SalesTable, DateParseError> {
    enrich_from_line(records, 1, options)
}

/// As [`enrich`], numbering the first record `first_line` in errors, so a
/// delimited file (header on line 1) can pass 2 and report file lines.
pub fn enrich_from_line(
    records: Vec<Record>,
    first_line: u64,
    options: &EnrichOptions,
) -> Result<SalesTable, DateParseError> {
    let mut failed = 0usize;
    let mut enriched = Vec::with_capacity(records.len());

    for (i, record) in records.into_iter().enumerate() {
        let line = first_line + i as u64;
        let order_date = resolve(&record.order_date, "Order Date", line, options)?;
        let ship_date = resolve(&record.ship_date, "Ship Date", line, options)?;
        if order_date.is_none() || ship_date.is_none() {
            failed += 1;
        }
        enriched.push(derive(record, order_date, ship_date));
    }

    if failed > 0 {
        log::warn!("{failed} record(s) have unparseable dates; their derived fields are empty");
    }

    Ok(SalesTable::from_records(enriched))
}

fn resolve(
    cell: &DateCell,
    column: &'static str,
    line: u64,
    options: &EnrichOptions,
) -> Result<Option<NaiveDate>, DateParseError> {
    match cell {
        DateCell::Date(d) => Ok(Some(*d)),
        DateCell::Text(text) => match parse_day_first(text, &options.date_formats) {
            Some(d) => Ok(Some(d)),
            None if options.on_bad_date == DateErrorPolicy::Tolerate => Ok(None),
            None => Err(DateParseError {
                line,
                column,
                value: text.clone(),
            }),
        },
    }
}

fn derive(
    record: Record,
    order_date: Option<NaiveDate>,
    ship_date: Option<NaiveDate>,
) -> SalesRecord {
    let days_to_ship = match (order_date, ship_date) {
        (Some(order), Some(ship)) => Some((ship - order).num_days()),
        _ => None,
    };
    SalesRecord {
        record,
        order_date,
        ship_date,
        year: order_date.map(|d| d.year()),
        month: order_date.map(|d| d.month()),
        days_to_ship,
    }
}
