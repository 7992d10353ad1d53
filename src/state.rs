use std::path::Path;

use superstore_dashboard::config::Settings;
use superstore_dashboard::data::filter::{filter, FilterSpec};
use superstore_dashboard::data::load_table;
use superstore_dashboard::data::model::SalesTable;
use superstore_dashboard::data::report::{DashboardReport, ReportSettings};
use superstore_dashboard::error::PipelineError;

use crate::color::ChartStyles;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until a file is loaded).
    pub table: Option<SalesTable>,

    /// Current filter selection.
    pub filters: FilterSpec,

    /// Aggregates for the current selection (cached until the filter changes).
    pub report: Option<DashboardReport>,

    /// Colours resolved from the palette configuration.
    pub styles: ChartStyles,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    settings: Settings,
    report_settings: ReportSettings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            table: None,
            filters: settings.filters.clone(),
            report: None,
            styles: ChartStyles::from_settings(&settings.palette),
            status_message: None,
            report_settings: settings.report_settings(),
            settings,
        }
    }

    /// Run loader and enricher with the configured options.
    pub fn load(&self, path: &Path) -> Result<SalesTable, PipelineError> {
        load_table(
            path,
            &self.settings.loader_options(),
            &self.settings.enrich_options(),
        )
    }

    /// Ingest a newly loaded table and apply the configured initial filters.
    pub fn set_table(&mut self, table: SalesTable) {
        self.table = Some(table);
        self.filters = self.settings.filters.clone();
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the report after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            let view = filter(&table.records, &self.filters);
            self.report = Some(DashboardReport::build(&view, &self.report_settings));
        }
    }

    /// Number of records passing the filter.
    pub fn visible_rows(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.row_count)
    }

    /// Clear every predicate.
    pub fn reset_filters(&mut self) {
        self.filters = FilterSpec::default();
        self.refilter();
    }
}
