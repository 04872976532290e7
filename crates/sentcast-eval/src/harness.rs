//! Fit-predict-evaluate harness shared by every model and feature set.

use sentcast_traits::types::TARGET_DATE_COLUMN;
use sentcast_traits::{Date, ForecastModel, Result, SentcastError, TimeSeriesTable};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::ForecastRecord;
use crate::evaluator::ForecastEvaluator;
use crate::metrics::ForecastMetrics;
use crate::split::WalkForwardSplitter;

/// Configuration for [`ForecastHarness`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Predictor columns handed to the model, in order
    pub feature_columns: Vec<String>,
    /// Column holding the value to forecast (default: `target`)
    pub target_column: String,
    /// Column of epoch days giving the date each target is realized on
    /// (default: `target_date`); rows are their own target dates without it
    pub target_date_column: String,
    /// Fraction of rows held out for evaluation (default: 0.2)
    pub test_fraction: f64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            feature_columns: Vec::new(),
            target_column: "target".to_string(),
            target_date_column: TARGET_DATE_COLUMN.to_string(),
            test_fraction: 0.2,
        }
    }
}

impl HarnessConfig {
    /// Config for the given predictor columns with default target and split.
    pub fn new<S: AsRef<str>>(feature_columns: &[S]) -> Self {
        Self {
            feature_columns: feature_columns
                .iter()
                .map(|c| c.as_ref().to_string())
                .collect(),
            ..Default::default()
        }
    }
}

/// Outcome of one harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRun {
    /// Name reported by the model
    pub model: String,
    /// Metrics over the evaluation block
    pub metrics: ForecastMetrics,
    /// One record per evaluation row
    pub records: Vec<ForecastRecord>,
    /// Number of training rows
    pub train_rows: usize,
}

/// Splits a feature table, fits a model on the training prefix and scores
/// its forecasts on the held-out suffix.
#[derive(Debug, Clone, Default)]
pub struct ForecastHarness {
    config: HarnessConfig,
}

impl ForecastHarness {
    /// Create a harness.
    #[must_use]
    pub const fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run one hold-out evaluation of `model` on `table`.
    ///
    /// Records and metrics are keyed by the date each target is realized on.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::InvalidConfig`] without feature columns, and
    /// propagates split, column lookup, model and evaluation errors.
    pub fn run(&self, table: &TimeSeriesTable, model: &mut dyn ForecastModel) -> Result<ForecastRun> {
        if self.config.feature_columns.is_empty() {
            return Err(SentcastError::InvalidConfig(
                "harness needs at least one feature column".to_string(),
            ));
        }

        let (train, test) = WalkForwardSplitter::split(table, self.config.test_fraction)?;

        let x_train = train.feature_matrix(&self.config.feature_columns)?;
        let y_train = train.require_column(&self.config.target_column)?;
        model.fit(&x_train, y_train)?;

        let x_test = test.feature_matrix(&self.config.feature_columns)?;
        let y_test = test.require_column(&self.config.target_column)?;
        let predictions = model.predict(&x_test)?;
        if predictions.len() != test.len() {
            return Err(SentcastError::LengthMismatch {
                stage: "model predict",
                expected: test.len(),
                actual: predictions.len(),
            });
        }
        let intervals = model.predict_interval(&x_test)?;

        let target_dates = if test.has_column(&self.config.target_date_column) {
            test.date_column(&self.config.target_date_column)?
        } else {
            test.dates().to_vec()
        };

        let keyed = |values: &[f64]| -> Vec<(Date, f64)> {
            target_dates.iter().copied().zip(values.iter().copied()).collect()
        };
        let metrics = ForecastEvaluator::evaluate_by_key(&keyed(y_test), &keyed(&predictions))?;

        let records = target_dates
            .iter()
            .zip(y_test.iter().zip(&predictions))
            .enumerate()
            .map(|(i, (&date, (&actual, &predicted)))| {
                let record = ForecastRecord::new(date, actual, predicted);
                match intervals.as_ref().and_then(|b| b.get(i)) {
                    Some(&(lower, upper)) => record.with_bounds(lower, upper),
                    None => record,
                }
            })
            .collect();

        info!(
            model = model.name(),
            train_rows = train.len(),
            test_rows = test.len(),
            mae = metrics.mae,
            rmse = metrics.rmse,
            "evaluated forecast"
        );

        Ok(ForecastRun {
            model: model.name().to_string(),
            metrics,
            records,
            train_rows: train.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sentcast_features::{FeatureConfig, FeatureEngineer};
    use sentcast_models::{ModelSpec, PersistenceConfig, PersistenceModel, RidgeRegression};

    fn linear_table(n: usize) -> TimeSeriesTable {
        let start = Date::from_ymd_opt(2023, 3, 1).unwrap();
        let dates = (0..n as u64).map(|i| start + chrono::Days::new(i)).collect();
        let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin()).collect();
        let target = x.iter().map(|v| 3.0 * v + 1.0).collect();
        TimeSeriesTable::new(
            dates,
            vec![("x".to_string(), x), ("target".to_string(), target)],
        )
        .unwrap()
    }

    #[test]
    fn test_ridge_on_linear_data() {
        let harness = ForecastHarness::new(HarnessConfig::new(&["x"]));
        let mut model = ModelSpec::ridge(1e-8).build();
        let run = harness.run(&linear_table(20), model.as_mut()).unwrap();

        assert_eq!(run.model, "ridge");
        assert_eq!(run.train_rows, 16);
        assert_eq!(run.records.len(), 4);
        assert_eq!(run.metrics.n_obs, 4);
        assert!(run.metrics.mae < 1e-6);
        assert!(run.records.iter().all(|r| r.lower_bound.is_some()));
    }

    #[test]
    fn test_records_follow_test_dates() {
        let table = linear_table(10);
        let harness = ForecastHarness::new(HarnessConfig::new(&["x"]));
        let mut model = PersistenceModel::new(PersistenceConfig {
            column: "x".to_string(),
        });
        let run = harness.run(&table, &mut model).unwrap();

        assert_eq!(run.records.len(), 2);
        assert_eq!(run.records[0].date, table.dates()[8]);
        assert_eq!(run.records[1].date, table.dates()[9]);
        assert!(run.records.iter().all(|r| r.lower_bound.is_none()));
        assert_relative_eq!(
            run.records[0].predicted_value,
            table.column("x").unwrap()[8]
        );
    }

    #[test]
    fn test_records_dated_by_realized_close() {
        let start = Date::from_ymd_opt(2022, 10, 3).unwrap();
        let dates = (0..12u64).map(|i| start + chrono::Days::new(i)).collect();
        let close: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        let table =
            TimeSeriesTable::new(dates, vec![("close".to_string(), close.clone())]).unwrap();
        let features = FeatureEngineer::new(FeatureConfig::default())
            .derive(&table)
            .unwrap();

        let mut columns = FeatureConfig::default().feature_columns();
        columns.push("close".to_string());
        let harness = ForecastHarness::new(HarnessConfig::new(&columns));
        let mut model = PersistenceModel::new(PersistenceConfig {
            column: "close".to_string(),
        });
        let run = harness.run(&features, &mut model).unwrap();

        assert!(!run.records.is_empty());
        for record in &run.records {
            let row = table.row_of(record.date).unwrap();
            assert_relative_eq!(record.actual_value, close[row]);
            // persistence forecasts the previous day's close
            assert_relative_eq!(record.predicted_value, close[row - 1]);
        }
        assert_eq!(run.records.last().unwrap().date, *table.dates().last().unwrap());
    }

    #[test]
    fn test_missing_feature_and_empty_config() {
        let table = linear_table(10);
        let mut model = RidgeRegression::default();

        let harness = ForecastHarness::new(HarnessConfig::new(&["nope"]));
        assert!(matches!(
            harness.run(&table, &mut model),
            Err(SentcastError::MissingColumn(_))
        ));

        let empty: [&str; 0] = [];
        let harness = ForecastHarness::new(HarnessConfig::new(&empty));
        assert!(matches!(
            harness.run(&table, &mut model),
            Err(SentcastError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_too_short_table() {
        let harness = ForecastHarness::new(HarnessConfig::new(&["x"]));
        let mut model = RidgeRegression::default();
        assert!(matches!(
            harness.run(&linear_table(2), &mut model),
            Err(SentcastError::InsufficientData { .. })
        ));
    }
}
