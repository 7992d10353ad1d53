//! TOML configuration: data source, chart sizes, palette and initial filters.
//!
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::enrich::{DateErrorPolicy, EnrichOptions, DEFAULT_DATE_FORMATS};
use crate::data::filter::FilterSpec;
use crate::data::loader::LoaderOptions;
use crate::data::model::Category;
use crate::data::report::ReportSettings;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub data: DataSettings,
    pub charts: ChartSettings,
    pub palette: PaletteSettings,
    /// Filter selection applied when a dataset is first shown.
    pub filters: FilterSpec,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSettings {
    /// Loaded at startup when set; the command line overrides it.
    pub path: Option<PathBuf>,
    pub delimiter: char,
    /// Day-first formats, tried in order.
    pub date_formats: Vec<String>,
    pub on_bad_date: DateErrorPolicy,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: ',',
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            on_bad_date: DateErrorPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartSettings {
    pub top_sales: usize,
    pub top_profit: usize,
    pub worst_loss: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            top_sales: 10,
            top_profit: 10,
            worst_loss: 5,
        }
    }
}

/// Colour for one category. List order is the stacking order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryStyle {
    pub category: Category,
    pub color: String,
}

/// Hex colours (`#rrggbb`) for every chart element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteSettings {
    pub sales: String,
    pub profit: String,
    pub orders: String,
    pub loss: String,
    pub shipping: String,
    pub card_background: String,
    pub card_title: String,
    pub heatmap_low: String,
    pub heatmap_high: String,
    pub categories: Vec<CategoryStyle>,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        let style = |category, color: &str| CategoryStyle {
            category,
            color: color.to_string(),
        };
        Self {
            sales: "#ffcc00".into(),
            profit: "#0058a3".into(),
            orders: "#ffcc00".into(),
            loss: "#e57373".into(),
            shipping: "#0058a3".into(),
            card_background: "#0058a3".into(),
            card_title: "#ffcc00".into(),
            heatmap_low: "#ffffd9".into(),
            heatmap_high: "#081d58".into(),
            categories: vec![
                style(Category::Furniture, "#0058a3"),
                style(Category::OfficeSupplies, "#ffcc00"),
                style(Category::Technology, "#2e8b57"),
            ],
        }
    }
}

impl Settings {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.data.delimiter.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "delimiter '{}' is not a single ASCII character",
                self.data.delimiter
            )));
        }
        if self.data.date_formats.is_empty() {
            return Err(ConfigError::Invalid(
                "date_formats must list at least one format".to_string(),
            ));
        }
        Ok(())
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            // validate() guarantees ASCII.
            delimiter: self.data.delimiter as u8,
        }
    }

    pub fn enrich_options(&self) -> EnrichOptions {
        EnrichOptions {
            date_formats: self.data.date_formats.clone(),
            on_bad_date: self.data.on_bad_date,
        }
    }

    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            top_sales: self.charts.top_sales,
            top_profit: self.charts.top_profit,
            worst_loss: self.charts.worst_loss,
            category_order: self.palette.categories.iter().map(|s| s.category).collect(),
        }
    }
}
