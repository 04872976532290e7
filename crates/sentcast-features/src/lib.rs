//! Feature engineering for the sentcast forecasting pipeline.
//!
//! This crate turns date-sorted tables into supervised-learning inputs:
//! - Merge: inner join of prices with daily sentiment and min-max scaling
//! - Engineer: lag, rolling mean/std and one-step-ahead target columns
//! - Registry: named feature sets for with/without-sentiment comparisons
//!
//! # Example
//!
//! ```ignore
//! use sentcast_features::{FeatureEngineer, MergeConfig, get_feature_set, merge_and_normalize};
//!
//! let merged = merge_and_normalize(&prices, daily.as_map(), &["close", "sentiment"], &MergeConfig::default())?;
//! let set = get_feature_set("sentiment").unwrap();
//! let features = FeatureEngineer::new(set.config).derive(&merged.table)?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod engineer;
pub mod merge;
pub mod registry;
pub mod scaler;

// Re-export key types
pub use engineer::{FeatureConfig, FeatureEngineer, TARGET_COLUMN, derive};
pub use merge::{MergeConfig, NormalizedTable, merge_and_normalize};
pub use registry::{FeatureSet, available_feature_sets, feature_set_names, get_feature_set};
pub use scaler::{FieldRange, MinMaxScaler};
