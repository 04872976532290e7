//! Error types for sentcast file I/O.

use sentcast_traits::SentcastError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing pipeline files.
#[derive(Debug, Error)]
pub enum DataError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or DataFrame operation failed.
    #[error("CSV error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but its contents violate a table invariant.
    #[error("Invalid data: {0}")]
    Core(#[from] SentcastError),

    /// A required column is absent from the file.
    #[error("Column '{column}' not found in {}", path.display())]
    MissingColumn {
        /// File that was read
        path: PathBuf,
        /// Column that was requested
        column: String,
    },
}
