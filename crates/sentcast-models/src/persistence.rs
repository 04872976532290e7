//! Naive persistence baseline.

use sentcast_traits::{FeatureMatrix, ForecastModel, Result, SentcastError};
use serde::{Deserialize, Serialize};

/// Configuration for the persistence baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Feature column whose value is returned as the forecast
    pub column: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            column: "close_norm".to_string(),
        }
    }
}

/// Predicts tomorrow's value as today's.
///
/// The forecast for each row is the value of [`PersistenceConfig::column`] in
/// that row. Any model worth keeping has to beat this.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use sentcast_models::{PersistenceConfig, PersistenceModel};
/// use sentcast_traits::{FeatureMatrix, ForecastModel};
///
/// let features = FeatureMatrix::new(vec!["close".to_string()], array![[1.0], [2.0]]).unwrap();
/// let mut model = PersistenceModel::new(PersistenceConfig { column: "close".to_string() });
/// model.fit(&features, &[2.0, 3.0]).unwrap();
/// assert_eq!(model.predict(&features).unwrap(), vec![1.0, 2.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PersistenceModel {
    config: PersistenceConfig,
}

impl PersistenceModel {
    /// Create a persistence model reading the configured column.
    pub const fn new(config: PersistenceConfig) -> Self {
        Self { config }
    }

    /// Column the forecast is read from.
    pub fn column(&self) -> &str {
        &self.config.column
    }

    fn read(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        features
            .column(&self.config.column)
            .map(|c| c.to_vec())
            .ok_or_else(|| SentcastError::MissingColumn(self.config.column.clone()))
    }
}

impl ForecastModel for PersistenceModel {
    fn name(&self) -> &str {
        "persistence"
    }

    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()> {
        if target.len() != features.nrows() {
            return Err(SentcastError::LengthMismatch {
                stage: "model fit",
                expected: features.nrows(),
                actual: target.len(),
            });
        }
        self.read(features).map(|_| ())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        self.read(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn features() -> FeatureMatrix {
        FeatureMatrix::new(
            vec!["lag_close_1".to_string(), "close_norm".to_string()],
            array![[0.1, 0.2], [0.2, 0.4], [0.4, 0.3]],
        )
        .unwrap()
    }

    #[test]
    fn test_predicts_configured_column() {
        let mut model = PersistenceModel::default();
        model.fit(&features(), &[0.4, 0.3, 0.5]).unwrap();
        assert_eq!(model.predict(&features()).unwrap(), vec![0.2, 0.4, 0.3]);
        assert!(model.predict_interval(&features()).unwrap().is_none());
    }

    #[test]
    fn test_missing_column() {
        let mut model = PersistenceModel::new(PersistenceConfig {
            column: "open".to_string(),
        });
        assert!(matches!(
            model.fit(&features(), &[0.0, 0.0, 0.0]),
            Err(SentcastError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_misaligned_target() {
        let mut model = PersistenceModel::default();
        assert!(matches!(
            model.fit(&features(), &[0.0]),
            Err(SentcastError::LengthMismatch { .. })
        ));
    }
}
