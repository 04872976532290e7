//! Persisted forecast records, scaler state and JSON reports.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use polars::prelude::*;
use sentcast_eval::ForecastRecord;
use sentcast_features::MinMaxScaler;
use sentcast_traits::types::frame_dates;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::csv::{read_frame, require_column, write_frame};
use crate::{DataError, Result};

const DATE: &str = "date";
const ACTUAL: &str = "actual_value";
const PREDICTED: &str = "predicted_value";
const LOWER: &str = "lower_bound";
const UPPER: &str = "upper_bound";

/// Write forecast records as CSV.
///
/// Columns are `date, actual_value, predicted_value`, followed by
/// `lower_bound, upper_bound` when any record carries bounds.
pub fn write_forecast_records(path: &Path, records: &[ForecastRecord]) -> Result<()> {
    let dates: Vec<_> = records.iter().map(|r| r.date).collect();
    let actual: Vec<f64> = records.iter().map(|r| r.actual_value).collect();
    let predicted: Vec<f64> = records.iter().map(|r| r.predicted_value).collect();

    let mut columns = vec![
        Column::new(DATE.into(), dates.as_slice()),
        Column::new(ACTUAL.into(), actual.as_slice()),
        Column::new(PREDICTED.into(), predicted.as_slice()),
    ];
    if records.iter().any(|r| r.lower_bound.is_some()) {
        let lower: Vec<Option<f64>> = records.iter().map(|r| r.lower_bound).collect();
        let upper: Vec<Option<f64>> = records.iter().map(|r| r.upper_bound).collect();
        columns.push(Column::new(LOWER.into(), lower.as_slice()));
        columns.push(Column::new(UPPER.into(), upper.as_slice()));
    }

    let mut df = DataFrame::new(columns)?;
    write_frame(path, &mut df)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn required_values(df: &DataFrame, path: &Path, name: &str) -> Result<Vec<f64>> {
    float_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                DataError::Core(sentcast_traits::SentcastError::InvalidData(format!(
                    "null {name} on row {row} of {}",
                    path.display()
                )))
            })
        })
        .collect()
}

/// Load forecast records written by [`write_forecast_records`].
///
/// Bound columns are optional; empty cells load as `None`.
pub fn load_forecast_records(path: &Path) -> Result<Vec<ForecastRecord>> {
    let df = read_frame(path)?;
    for column in [DATE, ACTUAL, PREDICTED] {
        require_column(&df, path, column)?;
    }

    let dates = frame_dates(&df, DATE)?;
    let actual = required_values(&df, path, ACTUAL)?;
    let predicted = required_values(&df, path, PREDICTED)?;
    let optional = |name: &str| -> Result<Vec<Option<f64>>> {
        if require_column(&df, path, name).is_ok() {
            float_column(&df, name)
        } else {
            Ok(vec![None; df.height()])
        }
    };
    let lower = optional(LOWER)?;
    let upper = optional(UPPER)?;

    Ok(dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| ForecastRecord {
            date,
            actual_value: actual[i],
            predicted_value: predicted[i],
            lower_bound: lower[i],
            upper_bound: upper[i],
        })
        .collect())
}

/// Write any serializable value as pretty-printed JSON.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Read a JSON file into `T`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Persist fitted scaler ranges so forecasts can be mapped back to raw units.
pub fn save_scaler(path: &Path, scaler: &MinMaxScaler) -> Result<()> {
    save_json(path, scaler)
}

/// Load scaler ranges written by [`save_scaler`].
pub fn load_scaler(path: &Path) -> Result<MinMaxScaler> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sentcast_traits::{Date, TimeSeriesTable};

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2022, 11, day).unwrap()
    }

    #[test]
    fn test_records_round_trip_with_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preds.csv");
        let records = vec![
            ForecastRecord::new(d(1), 0.5, 0.45).with_bounds(0.3, 0.6),
            ForecastRecord::new(d(2), 0.7, 0.55).with_bounds(0.4, 0.7),
        ];

        write_forecast_records(&path, &records).unwrap();
        let back = load_forecast_records(&path).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_records_without_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preds.csv");
        let records = vec![ForecastRecord::new(d(3), 1.0, 1.25)];

        write_forecast_records(&path, &records).unwrap();
        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("date,actual_value,predicted_value\n"));

        let back = load_forecast_records(&path).unwrap();
        assert_eq!(back[0].lower_bound, None);
        assert_relative_eq!(back[0].predicted_value, 1.25);
    }

    #[test]
    fn test_missing_prediction_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "date,actual_value\n2022-11-01,1.0\n").unwrap();
        assert!(matches!(
            load_forecast_records(&path),
            Err(DataError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_scaler_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let table = TimeSeriesTable::new(
            vec![d(1), d(2), d(3)],
            vec![("close".to_string(), vec![100.0, 120.0, 110.0])],
        )
        .unwrap();
        let scaler = MinMaxScaler::fit(&table, &["close"]).unwrap();

        save_scaler(&path, &scaler).unwrap();
        let back = load_scaler(&path).unwrap();
        assert_eq!(back, scaler);
        assert_relative_eq!(back.inverse_value("close", 0.5).unwrap(), 110.0);
    }
}
