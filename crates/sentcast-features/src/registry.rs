//! Registry of named feature sets.
//!
//! A feature set fixes which normalized fields are lagged and averaged, so
//! model comparisons can be run with and without sentiment by name. Rolling
//! mean and std are taken over the scaled close only.

use serde::{Deserialize, Serialize};

use crate::engineer::FeatureConfig;

/// Scaled close price column produced by the merge stage.
pub const PRICE_FEATURE: &str = "close_norm";

/// Scaled daily sentiment column produced by the merge stage.
pub const SENTIMENT_FEATURE: &str = "sentiment_norm";

/// Metadata and configuration of a feature set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Unique identifier for the feature set
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Whether the set reads the sentiment column
    pub uses_sentiment: bool,

    /// Derivation parameters
    pub config: FeatureConfig,
}

impl FeatureSet {
    /// Predictor column names this set produces.
    pub fn feature_columns(&self) -> Vec<String> {
        self.config.feature_columns()
    }
}

/// All built-in feature sets.
#[must_use]
pub fn available_feature_sets() -> Vec<FeatureSet> {
    vec![
        FeatureSet {
            name: "price_only".to_string(),
            description: "Lag 1 and 3-day rolling mean/std of the scaled close".to_string(),
            uses_sentiment: false,
            config: FeatureConfig::new(PRICE_FEATURE),
        },
        FeatureSet {
            name: "sentiment".to_string(),
            description: "Price features plus lag 1 of scaled sentiment".to_string(),
            uses_sentiment: true,
            config: FeatureConfig::new(PRICE_FEATURE).with_source_field(SENTIMENT_FEATURE),
        },
        FeatureSet {
            name: "advanced".to_string(),
            description: "Lags 1-3 of price and sentiment, 3-day price stats, 3/5-day sentiment means"
                .to_string(),
            uses_sentiment: true,
            config: FeatureConfig::new(PRICE_FEATURE)
                .with_source_field(SENTIMENT_FEATURE)
                .with_lag_depth(3)
                .with_extra_mean_windows(vec![3, 5]),
        },
    ]
}

/// Names of all built-in feature sets.
#[must_use]
pub fn feature_set_names() -> Vec<String> {
    available_feature_sets().into_iter().map(|s| s.name).collect()
}

/// Get a feature set by name.
#[must_use]
pub fn get_feature_set(name: &str) -> Option<FeatureSet> {
    available_feature_sets()
        .into_iter()
        .find(|set| set.name == name)
}
