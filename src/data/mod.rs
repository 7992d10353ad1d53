/// Data layer: core types, loading, enrichment, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Vec<Record>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  enrich  │  parse dates, derive Year / Month / DaysToShip → SalesTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  FilterSpec predicates → Vec<&SalesRecord>
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────┐
///   │ aggregate/report  │  KPIs, series, rankings, correlation
///   └───────────────────┘
/// ```
use std::path::Path;

use crate::error::PipelineError;

pub mod aggregate;
pub mod enrich;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;

/// Load and enrich a file in one step.
pub fn load_table(
    path: &Path,
    loader_options: &loader::LoaderOptions,
    enrich_options: &enrich::EnrichOptions,
) -> Result<model::SalesTable, PipelineError> {
    let first_line = loader::SourceKind::from_path(path)?.first_data_line();
    let records = loader::load_file(path, loader_options)?;
    let table = enrich::enrich_from_line(records, first_line, enrich_options)?;
    log::info!(
        "Enriched {} records: {} years, {} regions, {} segments",
        table.len(),
        table.options.years.len(),
        table.options.regions.len(),
        table.options.segments.len()
    );
    Ok(table)
}
