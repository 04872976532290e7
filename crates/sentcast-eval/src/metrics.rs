//! Forecast accuracy metrics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error metrics of a forecast against realized values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Number of compared observations
    pub n_obs: usize,
}

impl ForecastMetrics {
    /// Compute metrics from aligned, non-empty pairs.
    ///
    /// Callers validate lengths; see [`crate::ForecastEvaluator::evaluate`].
    pub(crate) fn from_pairs(pairs: impl Iterator<Item = (f64, f64)>) -> Self {
        let (abs_sum, sq_sum, n_obs) =
            pairs.fold((0.0, 0.0, 0usize), |(abs_sum, sq_sum, n), (actual, predicted)| {
                let error = actual - predicted;
                (abs_sum + error.abs(), sq_sum + error * error, n + 1)
            });
        let n = n_obs.max(1) as f64;
        Self {
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            n_obs,
        }
    }
}

impl fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE {:.6}  RMSE {:.6}  (n = {})",
            self.mae, self.rmse, self.n_obs
        )
    }
}
