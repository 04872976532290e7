//! Closed-form ridge regression.

use ndarray::{Array1, Array2, Axis};
use sentcast_traits::{FeatureMatrix, ForecastModel, Result, SentcastError, stats};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Two-sided 80% normal quantile.
pub const Z_80: f64 = 1.281_551_565_544_600_4;

/// Configuration for ridge regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeConfig {
    /// L2 penalty on the coefficients (not on the intercept)
    pub alpha: f64,
    /// Whether to fit an unpenalized intercept
    pub fit_intercept: bool,
    /// Width of prediction intervals in training residual standard deviations
    pub interval_z: f64,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            fit_intercept: true,
            interval_z: Z_80,
        }
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    names: Vec<String>,
    coefficients: Array1<f64>,
    intercept: f64,
    residual_std: f64,
}

/// Ridge regression solved from the normal equations.
///
/// Minimizes `||y - Xb - c||^2 + alpha * ||b||^2`. With an intercept the
/// problem is solved on centered data so `c` is not penalized. Prediction
/// intervals are `prediction ± interval_z * s`, where `s` is the sample
/// standard deviation of the training residuals.
#[derive(Debug, Clone, Default)]
pub struct RidgeRegression {
    config: RidgeConfig,
    fitted: Option<Fitted>,
}

impl RidgeRegression {
    /// Create an unfitted model.
    pub const fn new(config: RidgeConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &RidgeConfig {
        &self.config
    }

    /// Fitted coefficients in feature order, `None` before `fit`.
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|f| &f.coefficients)
    }

    /// Fitted intercept, `None` before `fit`.
    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }

    fn fitted_for(&self, features: &FeatureMatrix) -> Result<&Fitted> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| SentcastError::Model("ridge regression is not fitted".to_string()))?;
        if fitted.names != features.names() {
            return Err(SentcastError::Model(format!(
                "feature columns {:?} differ from fitted columns {:?}",
                features.names(),
                fitted.names
            )));
        }
        Ok(fitted)
    }
}

impl ForecastModel for RidgeRegression {
    fn name(&self) -> &str {
        "ridge"
    }

    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<()> {
        let n = features.nrows();
        if target.len() != n {
            return Err(SentcastError::LengthMismatch {
                stage: "model fit",
                expected: n,
                actual: target.len(),
            });
        }
        if n == 0 {
            return Err(SentcastError::InsufficientData {
                stage: "model fit",
                rows: 0,
                required: 1,
            });
        }
        if !(self.config.alpha >= 0.0 && self.config.alpha.is_finite()) {
            return Err(SentcastError::InvalidConfig(format!(
                "ridge alpha must be finite and >= 0, got {}",
                self.config.alpha
            )));
        }

        let x = features.values();
        let y = Array1::from_vec(target.to_vec());

        let (x_mean, y_mean) = if self.config.fit_intercept {
            let x_mean = x
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(x.ncols()));
            (x_mean, y.mean().unwrap_or(0.0))
        } else {
            (Array1::zeros(x.ncols()), 0.0)
        };
        let xc = x - &x_mean;
        let yc = &y - y_mean;

        let mut gram = xc.t().dot(&xc);
        for i in 0..gram.nrows() {
            gram[[i, i]] += self.config.alpha;
        }
        let rhs = xc.t().dot(&yc);

        let coefficients = cholesky_solve(&gram, &rhs).ok_or_else(|| {
            SentcastError::Model(
                "normal equations are singular; increase alpha or drop collinear features"
                    .to_string(),
            )
        })?;
        let intercept = y_mean - x_mean.dot(&coefficients);

        let residuals: Vec<f64> = (&y - &(x.dot(&coefficients) + intercept)).to_vec();
        let residual_std = stats::sample_std(&residuals).unwrap_or(0.0);

        debug!(
            rows = n,
            features = x.ncols(),
            alpha = self.config.alpha,
            residual_std,
            "fitted ridge regression"
        );

        self.fitted = Some(Fitted {
            names: features.names().to_vec(),
            coefficients,
            intercept,
            residual_std,
        });
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        let fitted = self.fitted_for(features)?;
        Ok((features.values().dot(&fitted.coefficients) + fitted.intercept).to_vec())
    }

    fn predict_interval(&self, features: &FeatureMatrix) -> Result<Option<Vec<(f64, f64)>>> {
        let half_width = self.config.interval_z * self.fitted_for(features)?.residual_std;
        Ok(Some(
            self.predict(features)?
                .into_iter()
                .map(|p| (p - half_width, p + half_width))
                .collect(),
        ))
    }
}

/// Solve `a x = b` for a symmetric positive-definite `a`.
///
/// Returns `None` when `a` is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 1e-12 {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // forward substitution: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }

    // back substitution: L^T x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in i + 1..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn matrix(values: Array2<f64>) -> FeatureMatrix {
        let names = (0..values.ncols()).map(|i| format!("x{i}")).collect();
        FeatureMatrix::new(names, values).unwrap()
    }

    #[test]
    fn test_recovers_linear_relation_with_small_alpha() {
        // y = 2 x0 - x1 + 0.5
        let x = array![
            [0.0, 1.0],
            [1.0, 0.0],
            [2.0, 1.0],
            [3.0, 3.0],
            [4.0, 2.0],
            [5.0, 5.0]
        ];
        let y: Vec<f64> = x.rows().into_iter().map(|r| 2.0 * r[0] - r[1] + 0.5).collect();
        let features = matrix(x);

        let mut model = RidgeRegression::new(RidgeConfig {
            alpha: 1e-9,
            ..Default::default()
        });
        model.fit(&features, &y).unwrap();

        let coefficients = model.coefficients().unwrap();
        assert_relative_eq!(coefficients[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(coefficients[1], -1.0, epsilon = 1e-6);
        assert_relative_eq!(model.intercept().unwrap(), 0.5, epsilon = 1e-6);

        for (p, t) in model.predict(&features).unwrap().iter().zip(&y) {
            assert_relative_eq!(p, t, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_single_feature_closed_form() {
        // without intercept, b = sum(xy) / (sum(x^2) + alpha) = 28 / (14 + 1)
        let features = matrix(array![[1.0], [2.0], [3.0]]);
        let mut model = RidgeRegression::new(RidgeConfig {
            alpha: 1.0,
            fit_intercept: false,
            ..Default::default()
        });
        model.fit(&features, &[2.0, 4.0, 6.0]).unwrap();
        assert_relative_eq!(model.coefficients().unwrap()[0], 28.0 / 15.0, epsilon = 1e-12);
        assert_relative_eq!(model.intercept().unwrap(), 0.0);
    }

    #[test]
    fn test_penalty_shrinks_coefficients() {
        let features = matrix(array![[1.0], [2.0], [3.0], [4.0]]);
        let target = [1.0, 2.0, 3.0, 4.0];

        let mut weak = RidgeRegression::new(RidgeConfig {
            alpha: 0.01,
            ..Default::default()
        });
        let mut strong = RidgeRegression::new(RidgeConfig {
            alpha: 100.0,
            ..Default::default()
        });
        weak.fit(&features, &target).unwrap();
        strong.fit(&features, &target).unwrap();

        assert!(strong.coefficients().unwrap()[0].abs() < weak.coefficients().unwrap()[0].abs());
    }

    #[test]
    fn test_interval_contains_prediction() {
        let features = matrix(array![[1.0], [2.0], [3.0], [4.0], [5.0]]);
        let mut model = RidgeRegression::default();
        model.fit(&features, &[1.2, 1.9, 3.3, 3.8, 5.1]).unwrap();

        let predictions = model.predict(&features).unwrap();
        let intervals = model.predict_interval(&features).unwrap().unwrap();
        for (p, (lo, hi)) in predictions.iter().zip(&intervals) {
            assert!(lo < p && p < hi);
            assert_relative_eq!(p - lo, hi - p, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_singular_without_penalty() {
        let features = matrix(array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]]);
        let mut model = RidgeRegression::new(RidgeConfig {
            alpha: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            model.fit(&features, &[1.0, 2.0, 3.0]),
            Err(SentcastError::Model(_))
        ));
    }

    #[test]
    fn test_predict_before_fit_and_column_mismatch() {
        let features = matrix(array![[1.0], [2.0]]);
        let model = RidgeRegression::default();
        assert!(model.predict(&features).is_err());

        let mut model = RidgeRegression::default();
        model.fit(&features, &[1.0, 2.0]).unwrap();
        let other = FeatureMatrix::new(vec!["other".to_string()], array![[1.0]]).unwrap();
        assert!(matches!(model.predict(&other), Err(SentcastError::Model(_))));
    }

    #[test]
    fn test_negative_alpha_rejected() {
        let features = matrix(array![[1.0], [2.0]]);
        let mut model = RidgeRegression::new(RidgeConfig {
            alpha: -1.0,
            ..Default::default()
        });
        assert!(matches!(
            model.fit(&features, &[1.0, 2.0]),
            Err(SentcastError::InvalidConfig(_))
        ));
    }
}
