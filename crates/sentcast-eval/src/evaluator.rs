//! Comparison of forecasts with realized values.
//!
//! Positional evaluation requires equal-length series. Keyed evaluation
//! inner-joins on the key first, so a forecast file and a truth file covering
//! different date ranges are compared only where they overlap.

use std::collections::BTreeMap;
use std::fmt::Debug;

use sentcast_traits::{Date, Result, SentcastError, TimeSeriesTable};
use tracing::debug;

use crate::artifact::ForecastRecord;
use crate::metrics::ForecastMetrics;

const STAGE: &str = "evaluation";

/// Computes [`ForecastMetrics`] for positional or keyed forecasts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastEvaluator;

fn unique_map<K: Ord + Clone + Debug>(
    series: &[(K, f64)],
    side: &str,
) -> Result<BTreeMap<K, f64>> {
    let mut map = BTreeMap::new();
    for (key, value) in series {
        if map.insert(key.clone(), *value).is_some() {
            return Err(SentcastError::InvalidData(format!(
                "duplicate key {key:?} in {side} series"
            )));
        }
    }
    Ok(map)
}

impl ForecastEvaluator {
    /// Compare two positionally aligned series.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::LengthMismatch`] for unequal lengths and
    /// [`SentcastError::NoOverlap`] for empty input.
    ///
    /// # Example
    ///
    /// ```
    /// use sentcast_eval::ForecastEvaluator;
    ///
    /// let metrics = ForecastEvaluator::evaluate(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]).unwrap();
    /// assert!((metrics.mae - 1.0 / 3.0).abs() < 1e-12);
    /// assert_eq!(metrics.n_obs, 3);
    /// ```
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<ForecastMetrics> {
        if actual.len() != predicted.len() {
            return Err(SentcastError::LengthMismatch {
                stage: STAGE,
                expected: actual.len(),
                actual: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(SentcastError::NoOverlap { stage: STAGE });
        }
        Ok(ForecastMetrics::from_pairs(
            actual.iter().copied().zip(predicted.iter().copied()),
        ))
    }

    /// Compare two keyed series on their common keys.
    ///
    /// Keys present on one side only are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::InvalidData`] if a key repeats within a side
    /// and [`SentcastError::NoOverlap`] if no key is shared.
    pub fn evaluate_by_key<K: Ord + Clone + Debug>(
        actual: &[(K, f64)],
        predicted: &[(K, f64)],
    ) -> Result<ForecastMetrics> {
        let actual = unique_map(actual, "actual")?;
        let predicted = unique_map(predicted, "predicted")?;

        let pairs: Vec<(f64, f64)> = actual
            .iter()
            .filter_map(|(key, a)| predicted.get(key).map(|p| (*a, *p)))
            .collect();
        debug!(
            actual = actual.len(),
            predicted = predicted.len(),
            matched = pairs.len(),
            "joined forecast with actuals"
        );

        if pairs.is_empty() {
            return Err(SentcastError::NoOverlap { stage: STAGE });
        }
        Ok(ForecastMetrics::from_pairs(pairs.into_iter()))
    }

    /// Compare a column of one table with a column of another, joined on date.
    pub fn evaluate_tables(
        actual_table: &TimeSeriesTable,
        actual_column: &str,
        predicted_table: &TimeSeriesTable,
        predicted_column: &str,
    ) -> Result<ForecastMetrics> {
        let keyed = |table: &TimeSeriesTable, column: &str| -> Result<Vec<(Date, f64)>> {
            let values = table.require_column(column)?;
            Ok(table
                .dates()
                .iter()
                .copied()
                .zip(values.iter().copied())
                .collect())
        };
        Self::evaluate_by_key(
            &keyed(actual_table, actual_column)?,
            &keyed(predicted_table, predicted_column)?,
        )
    }

    /// Compare the actual and predicted values stored in forecast records.
    pub fn evaluate_records(records: &[ForecastRecord]) -> Result<ForecastMetrics> {
        let (actual, predicted): (Vec<f64>, Vec<f64>) = records
            .iter()
            .map(|r| (r.actual_value, r.predicted_value))
            .unzip();
        Self::evaluate(&actual, &predicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn test_three_point_example() {
        let metrics = ForecastEvaluator::evaluate(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(metrics.mae, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.rmse, (1.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(metrics.n_obs, 3);
    }

    #[test]
    fn test_perfect_forecast() {
        let metrics = ForecastEvaluator::evaluate(&[0.4, 0.6], &[0.4, 0.6]).unwrap();
        assert_relative_eq!(metrics.mae, 0.0);
        assert_relative_eq!(metrics.rmse, 0.0);
    }

    #[test]
    fn test_length_mismatch_and_empty() {
        assert!(matches!(
            ForecastEvaluator::evaluate(&[1.0, 2.0], &[1.0]),
            Err(SentcastError::LengthMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
        assert!(matches!(
            ForecastEvaluator::evaluate(&[], &[]),
            Err(SentcastError::NoOverlap { .. })
        ));
    }

    #[test]
    fn test_keyed_join_drops_unmatched() {
        let actual = [(d(1), 1.0), (d(2), 2.0), (d(3), 3.0)];
        let predicted = [(d(3), 4.0), (d(2), 2.0), (d(9), 100.0)];
        let metrics = ForecastEvaluator::evaluate_by_key(&actual, &predicted).unwrap();
        assert_eq!(metrics.n_obs, 2);
        assert_relative_eq!(metrics.mae, 0.5);
    }

    #[test]
    fn test_keyed_errors() {
        let dup = [("a", 1.0), ("a", 2.0)];
        assert!(matches!(
            ForecastEvaluator::evaluate_by_key(&dup, &[("a", 1.0)]),
            Err(SentcastError::InvalidData(_))
        ));
        assert!(matches!(
            ForecastEvaluator::evaluate_by_key(&[("a", 1.0)], &[("b", 1.0)]),
            Err(SentcastError::NoOverlap { .. })
        ));
    }

    #[test]
    fn test_evaluate_tables() {
        let actual = TimeSeriesTable::new(
            vec![d(1), d(2), d(3)],
            vec![("close_norm".to_string(), vec![0.1, 0.5, 0.9])],
        )
        .unwrap();
        let predicted = TimeSeriesTable::new(
            vec![d(2), d(3), d(4)],
            vec![("predicted_value".to_string(), vec![0.4, 0.9, 0.2])],
        )
        .unwrap();
        let metrics =
            ForecastEvaluator::evaluate_tables(&actual, "close_norm", &predicted, "predicted_value")
                .unwrap();
        assert_eq!(metrics.n_obs, 2);
        assert_relative_eq!(metrics.mae, 0.05, epsilon = 1e-12);

        assert!(matches!(
            ForecastEvaluator::evaluate_tables(&actual, "close", &predicted, "predicted_value"),
            Err(SentcastError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_evaluate_records() {
        let records = vec![
            ForecastRecord::new(d(1), 1.0, 1.5),
            ForecastRecord::new(d(2), 2.0, 1.0),
        ];
        let metrics = ForecastEvaluator::evaluate_records(&records).unwrap();
        assert_relative_eq!(metrics.mae, 0.75);
    }
}
