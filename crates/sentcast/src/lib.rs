#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sentcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Quick Start
//!
//! ```ignore
//! use sentcast::prelude::*;
//!
//! # fn main() -> sentcast::Result<()> {
//! let report = SentimentAggregator::new(AggregatorConfig::default()).aggregate_messages(
//!     &messages,
//!     &LexiconScorer::default(),
//!     ScoreReduction::Polarity,
//! );
//! let merged = merge_and_normalize(
//!     &prices,
//!     report.daily.as_map(),
//!     &["close", "sentiment"],
//!     &MergeConfig::default(),
//! )?;
//!
//! let set = get_feature_set("sentiment").unwrap();
//! let features = FeatureEngineer::new(set.config.clone()).derive(&merged.table)?;
//!
//! let harness = ForecastHarness::new(HarnessConfig::new(&set.feature_columns()));
//! let run = harness.run(&features, ModelSpec::ridge(1.0).build().as_mut())?;
//! println!("{}", run.metrics);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types and traits ([`TimeSeriesTable`], [`ForecastModel`], [`SentimentScorer`])
//! - [`sentiment`] - Message scoring and daily aggregation
//! - [`features`] - Merge, scaling and lag/rolling feature derivation
//! - [`models`] - Reference forecast models
//! - [`eval`] - Walk-forward splits, metrics, harness and tuning
//! - [`data`] - CSV and JSON I/O

/// Version information for the sentcast crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Traits
// ============================================================================

/// Core types and traits.
///
/// - [`TimeSeriesTable`] - Date-keyed table every stage consumes and produces
/// - [`ForecastModel`] - Fit/predict contract for forecasting models
/// - [`SentimentScorer`] - Per-message sentiment scoring contract
pub mod traits {
    pub use sentcast_traits::*;
}

pub use sentcast_traits::{ForecastModel, SentimentScorer};
pub use sentcast_traits::{Result, SentcastError};
pub use sentcast_traits::{Date, FeatureMatrix, TimeSeriesTable};

// ============================================================================
// Pipeline Stages
// ============================================================================

/// Message scoring and daily sentiment aggregation.
pub mod sentiment {
    pub use sentcast_sentiment::*;
}

/// Date join, min-max scaling and feature derivation.
///
/// ## Feature Sets
///
/// - **price_only**: lag 1 and 3-day rolling mean/std of the scaled close
/// - **sentiment**: price features plus lag 1 of scaled sentiment
/// - **advanced**: lags 1-3 of both fields, 3-day close stats and 3/5-day
///   sentiment means
pub mod features {
    pub use sentcast_features::*;
}

/// Reference forecast models.
pub mod models {
    pub use sentcast_models::*;
}

/// Walk-forward evaluation.
///
/// ## Metrics
///
/// ```text
/// MAE  = mean(|actual - predicted|)
/// RMSE = sqrt(mean((actual - predicted)^2))
/// ```
///
/// Forecasts and actuals are inner-joined on date before comparison.
pub mod eval {
    pub use sentcast_eval::*;
}

/// CSV and JSON I/O.
pub mod data {
    pub use sentcast_data::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use sentcast::prelude::*;
/// ```
pub mod prelude {
    pub use crate::eval::{
        ForecastEvaluator, ForecastHarness, ForecastMetrics, ForecastRecord, GridSearch,
        HarnessConfig, TuningConfig, WalkForwardSplitter,
    };
    pub use crate::features::{
        FeatureConfig, FeatureEngineer, MergeConfig, MinMaxScaler, get_feature_set,
        merge_and_normalize,
    };
    pub use crate::models::{ModelSpec, PersistenceModel, RidgeRegression};
    pub use crate::sentiment::{
        AggregatorConfig, DailySentiment, LexiconScorer, Message, SentimentAggregator,
    };
    pub use crate::traits::{ScoreReduction, SentimentScore};
    pub use crate::{Date, FeatureMatrix, ForecastModel, SentimentScorer, TimeSeriesTable};
    pub use crate::{Result, SentcastError};
}

// ============================================================================
// Tests
// ============================================================================
