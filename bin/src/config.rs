//! Pipeline configuration file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Command-line flags take precedence over the file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use sentcast::eval::{HarnessConfig, TuningConfig};
use sentcast::features::{FeatureConfig, MergeConfig, feature_set_names, get_feature_set};
use sentcast::models::ModelSpec;
use sentcast::sentiment::AggregatorConfig;
use sentcast::traits::ScoreReduction;
use serde::{Deserialize, Serialize};

/// Settings for every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PipelineConfig {
    /// Date column of the price file
    pub(crate) price_date_column: String,
    /// Price column to forecast
    pub(crate) price_column: String,
    /// Timestamp column of the message file
    pub(crate) message_date_column: String,
    /// Text column of the message file
    pub(crate) message_text_column: String,
    /// Scalar taken from each message score
    pub(crate) score_reduction: ScoreReduction,
    pub(crate) aggregator: AggregatorConfig,
    pub(crate) merge: MergeConfig,
    /// Named feature set used when no explicit `features` are given
    pub(crate) feature_set: String,
    /// Explicit feature derivation, overriding `feature_set`
    pub(crate) features: Option<FeatureConfig>,
    /// Fraction of feature rows held out for evaluation
    pub(crate) test_fraction: f64,
    pub(crate) tuning: TuningConfig,
    pub(crate) model: ModelSpec,
    /// Feature sets evaluated side by side by `run`
    pub(crate) compare_sets: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            price_date_column: "Date".to_string(),
            price_column: "Close".to_string(),
            message_date_column: "Date".to_string(),
            message_text_column: "Tweet".to_string(),
            score_reduction: ScoreReduction::default(),
            aggregator: AggregatorConfig::default(),
            merge: MergeConfig::default(),
            feature_set: "sentiment".to_string(),
            features: None,
            test_fraction: 0.2,
            tuning: TuningConfig::default(),
            model: ModelSpec::default(),
            compare_sets: feature_set_names(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config, or use defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => sentcast::data::load_json(path)
                .with_context(|| format!("failed to read config {}", path.display())),
            None => Ok(Self::default()),
        }
    }

    /// Price field as it appears in loaded tables (lower-cased).
    pub(crate) fn price_field(&self) -> String {
        self.price_column.to_lowercase()
    }

    /// Fields min-max scaled by the merge stage.
    pub(crate) fn scaled_fields(&self) -> Vec<String> {
        vec![self.price_field(), self.merge.sentiment_column.clone()]
    }

    /// Feature derivation for a named set, falling back to the configured one.
    pub(crate) fn feature_config(&self, name: Option<&str>) -> Result<FeatureConfig> {
        if let (None, Some(features)) = (name, &self.features) {
            return Ok(features.clone());
        }
        let name = name.unwrap_or(&self.feature_set);
        match get_feature_set(name) {
            Some(set) => Ok(set.config),
            None => bail!(
                "unknown feature set '{}', available: {}",
                name,
                feature_set_names().join(", ")
            ),
        }
    }

    /// Model from the config, with an optional name and ridge penalty override.
    pub(crate) fn model_spec(&self, name: Option<&str>, alpha: Option<f64>) -> Result<ModelSpec> {
        let mut spec = match name {
            Some(name) => ModelSpec::from_name(name)?,
            None => self.model.clone(),
        };
        if let Some(alpha) = alpha {
            match &mut spec {
                ModelSpec::Ridge(config) => config.alpha = alpha,
                ModelSpec::Persistence(_) => bail!("--alpha only applies to the ridge model"),
            }
        }
        Ok(spec)
    }

    /// Harness setup for a feature derivation and model.
    ///
    /// Columns a model reads beyond the derived features are appended.
    pub(crate) fn harness_config(
        &self,
        features: &FeatureConfig,
        model: &ModelSpec,
        test_fraction: Option<f64>,
    ) -> HarnessConfig {
        let mut columns = features.feature_columns();
        for extra in model.extra_columns() {
            if !columns.contains(&extra) {
                columns.push(extra);
            }
        }
        HarnessConfig {
            test_fraction: test_fraction.unwrap_or(self.test_fraction),
            ..HarnessConfig::new(&columns)
        }
    }
}
