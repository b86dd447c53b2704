//! Error types for loading and reporting.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// One or more required columns are absent after header normalization.
    #[error("required columns not found: {}. Columns present: {present:?}", .missing.join(", "))]
    Schema {
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
