//! Error types for the data pipeline and configuration.
//!
//! Every failure mode has a named variant; the binary wraps them in
//! `anyhow` with context at the boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Structural failure while reading the input table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A date cell that matches none of the configured day-first formats.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Line {line}: cannot parse {column} '{value}' as a day-first date")]
pub struct DateParseError {
    pub line: u64,
    pub column: &'static str,
    pub value: String,
}

/// Load + enrich, as run once at startup or from the File menu.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Date(#[from] DateParseError),
}

/// A statistic that is mathematically undefined for the given view.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("{metric} is undefined on empty input")]
    EmptyInput { metric: &'static str },

    #[error("{metric} needs at least {needed} rows, got {found}")]
    TooFewRows {
        metric: &'static str,
        needed: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
