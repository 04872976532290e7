//! Forecast model trait.
//!
//! This module defines the `ForecastModel` trait, the narrow contract between
//! the pipeline and any regressor or time-series model. The pipeline never
//! looks inside a model: it hands over a feature matrix and a target series
//! with matching row order and reads predictions back in the same order.

use crate::{FeatureMatrix, Result};

/// A model that learns a one-step-ahead forecast from tabular features.
///
/// Implementations may be boosted-tree ensembles, additive time-series
/// models, linear baselines or anything else that can fit and predict.
/// Models must be `Send` so independent tuning trials can run on worker
/// threads, each owning its own instance.
///
/// # Example
///
/// ```
/// use sentcast_traits::{FeatureMatrix, ForecastModel, Result};
///
/// struct MeanModel {
///     mean: f64,
/// }
///
/// impl ForecastModel for MeanModel {
///     fn name(&self) -> &str {
///         "mean"
///     }
///
///     fn fit(&mut self, _features: &FeatureMatrix, target: &[f64]) -> Result<()> {
///         self.mean = target.iter().sum::<f64>() / target.len() as f64;
///         Ok(())
///     }
///
///     fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
///         Ok(vec![self.mean; features.nrows()])
///     }
/// }
/// ```
pub trait ForecastModel: Send {
    /// Returns the name of this model, used in logs and reports.
    fn name(&self) -> &str;

    /// Fit the model.
    ///
    /// `target[i]` is the value to predict from row `i` of `features`.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are misaligned, empty, or the model
    /// cannot be estimated from them.
    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()>;

    /// Predict one value per row of `features`, in row order.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been fitted or the feature
    /// columns differ from the ones it was fitted on.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>>;

    /// Prediction intervals `(lower, upper)` per row, if the model has them.
    fn predict_interval(&self, _features: &FeatureMatrix) -> Result<Option<Vec<(f64, f64)>>> {
        Ok(None)
    }
}
