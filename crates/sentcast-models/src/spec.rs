//! Serializable model descriptions.

use sentcast_traits::{ForecastModel, SentcastError};
use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceConfig, PersistenceModel};
use crate::ridge::{RidgeConfig, RidgeRegression};

/// A model choice as it appears in pipeline config files.
///
/// ```
/// use sentcast_models::ModelSpec;
///
/// let spec: ModelSpec = serde_json::from_str(r#"{ "model": "ridge", "alpha": 0.5 }"#).unwrap();
/// assert_eq!(spec.build().name(), "ridge");
/// assert_eq!(spec.label(), "ridge(alpha=0.5)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Naive "tomorrow equals today" baseline.
    Persistence(PersistenceConfig),
    /// Ridge regression on the feature columns.
    Ridge(RidgeConfig),
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self::Ridge(RidgeConfig::default())
    }
}

impl ModelSpec {
    /// Ridge regression with the given penalty and default interval width.
    pub fn ridge(alpha: f64) -> Self {
        Self::Ridge(RidgeConfig {
            alpha,
            ..Default::default()
        })
    }

    /// Persistence baseline reading `column`.
    pub fn persistence(column: impl Into<String>) -> Self {
        Self::Persistence(PersistenceConfig {
            column: column.into(),
        })
    }

    /// Parse a model name as used on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::InvalidConfig`] for an unknown name.
    pub fn from_name(name: &str) -> Result<Self, SentcastError> {
        match name {
            "ridge" => Ok(Self::default()),
            "persistence" | "naive" => Ok(Self::Persistence(PersistenceConfig::default())),
            other => Err(SentcastError::InvalidConfig(format!(
                "unknown model '{other}', expected one of: ridge, persistence"
            ))),
        }
    }

    /// Instantiate a fresh, unfitted model.
    pub fn build(&self) -> Box<dyn ForecastModel> {
        match self {
            Self::Persistence(config) => Box::new(PersistenceModel::new(config.clone())),
            Self::Ridge(config) => Box::new(RidgeRegression::new(config.clone())),
        }
    }

    /// Short human-readable description including hyperparameters.
    pub fn label(&self) -> String {
        match self {
            Self::Persistence(config) => format!("persistence({})", config.column),
            Self::Ridge(config) => format!("ridge(alpha={})", config.alpha),
        }
    }

    /// Columns the model reads beyond the feature set's derived columns.
    pub fn extra_columns(&self) -> Vec<String> {
        match self {
            Self::Persistence(config) => vec![config.column.clone()],
            Self::Ridge(_) => Vec::new(),
        }
    }
}

/// Default hyperparameter grid for ridge tuning.
pub fn ridge_alpha_grid() -> Vec<ModelSpec> {
    [0.001, 0.01, 0.1, 1.0, 10.0, 100.0]
        .into_iter()
        .map(ModelSpec::ridge)
        .collect()
}
