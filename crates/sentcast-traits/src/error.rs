//! Error types for the sentcast pipeline.
//!
//! Structural data errors (too few rows, a zero-variance field, no matching
//! keys) are hard failures: they abort the stage that raised them and name the
//! stage and the offending input. Per-message scoring failures are not part of
//! this enum; they are soft and collected by the sentiment aggregator.

use crate::types::Date;
use thiserror::Error;

/// The main error type for sentcast operations.
#[derive(Debug, Error)]
pub enum SentcastError {
    /// A stage received fewer rows than it needs to produce any output.
    #[error("Insufficient data in {stage}: got {rows} rows, need at least {required}")]
    InsufficientData {
        /// Pipeline stage that raised the error.
        stage: &'static str,
        /// Number of rows available.
        rows: usize,
        /// Minimum number of rows required.
        required: usize,
    },

    /// Min-max scaling was requested for a field whose max equals its min.
    #[error("Degenerate scale for field '{field}': max equals min ({value})")]
    DegenerateScale {
        /// Field that has zero variance.
        field: String,
        /// The single value the field takes.
        value: f64,
    },

    /// A keyed join found no matching keys.
    #[error("No overlapping keys in {stage}")]
    NoOverlap {
        /// Pipeline stage that raised the error.
        stage: &'static str,
    },

    /// Error when a required column is missing from the data.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A table was built with the same date on more than one row.
    #[error("Duplicate date: {0}")]
    DuplicateDate(Date),

    /// Two inputs that must be positionally aligned have different lengths.
    #[error("Length mismatch in {stage}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Pipeline stage that raised the error.
        stage: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A stage was configured with parameters outside their valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A forecast model failed to fit or predict.
    #[error("Model error: {0}")]
    Model(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for SentcastError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SentcastError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for sentcast operations.
pub type Result<T> = std::result::Result<T, SentcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_names_stage_and_counts() {
        let err = SentcastError::InsufficientData {
            stage: "feature engineering",
            rows: 3,
            required: 4,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data in feature engineering: got 3 rows, need at least 4"
        );
    }

    #[test]
    fn test_degenerate_scale_names_field() {
        let err = SentcastError::DegenerateScale {
            field: "close".to_string(),
            value: 5.0,
        };
        assert!(err.to_string().contains("'close'"));
    }

    #[test]
    fn test_error_from_string() {
        let err: SentcastError = "boom".into();
        assert!(matches!(err, SentcastError::Other(_)));
        assert_eq!(err.to_string(), "Error: boom");
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(SentcastError::NoOverlap { stage: "merge" });
        assert!(err_result.is_err());
    }
}
