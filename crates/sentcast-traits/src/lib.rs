#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sentcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

//! Core types and trait definitions for the sentcast forecasting pipeline.
//!
//! Every pipeline stage consumes and produces [`TimeSeriesTable`]s; models and
//! sentiment scorers plug in through [`ForecastModel`] and
//! [`SentimentScorer`].

/// The version of the sentcast-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod model;
pub mod scorer;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, SentcastError};
pub use model::ForecastModel;
pub use scorer::{ScoreReduction, ScorerError, SentimentScore, SentimentScorer};
pub use types::{Date, FeatureMatrix, TimeSeriesTable, epoch_days, parse_calendar_date};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
