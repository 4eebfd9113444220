//! Error types for the data-loader crate.
//!
//! Only loading can fail hard. The recommendation core treats
//! `MalformedKey` and `MissingStatisticsSource` as routing signals,
//! never as fatal conditions.

use thiserror::Error;

/// Errors that can occur while loading the catalog or the statistics store
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file was not valid JSON, or had the wrong top-level shape
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A catalog record could not be used
    #[error("Invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// A context key did not split into the expected number of fields
    #[error("Malformed context key '{key}': expected {expected} fields, found {found}")]
    MalformedKey {
        key: String,
        expected: usize,
        found: usize,
    },

    /// The statistics store has no backing source
    #[error("Statistics source not available: {path}")]
    MissingStatisticsSource { path: String },

    /// The catalog holds no movies at all
    #[error("Catalog is empty")]
    EmptyCatalog,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
