//! Walk-forward evaluation of forecasts for sentcast.
//!
//! This crate provides the tools for judging a forecast honestly:
//! - Chronological hold-out and expanding-window splits that never shuffle
//! - MAE / RMSE evaluation, positional or joined on a date key
//! - A fit-predict-evaluate harness shared by every model and feature set
//! - Parallel grid search over expanding-window folds
//! - Dated forecast records for reports and dashboards
//!
//! # Example
//!
//! ```rust,ignore
//! use sentcast_eval::{ForecastHarness, HarnessConfig};
//! use sentcast_models::ModelSpec;
//!
//! let harness = ForecastHarness::new(HarnessConfig::new(&set.feature_columns()));
//! let run = harness.run(&features, ModelSpec::ridge(1.0).build().as_mut())?;
//! println!("{}", run.metrics);
//! ```

pub mod artifact;
pub mod evaluator;
pub mod harness;
pub mod metrics;
pub mod split;
pub mod tuning;

// Re-export main types
pub use artifact::{ForecastRecord, interval_coverage};
pub use evaluator::ForecastEvaluator;
pub use harness::{ForecastHarness, ForecastRun, HarnessConfig};
pub use metrics::ForecastMetrics;
pub use split::{Split, WalkForwardSplitter};
pub use tuning::{GridSearch, TrialResult, TuningConfig, TuningReport};
