//! Common types used throughout the sentcast pipeline.
//!
//! This module defines the date-keyed [`TimeSeriesTable`] every stage operates
//! on and the [`FeatureMatrix`] handed to forecast models.

use crate::{Result, SentcastError};
use chrono::{DateTime, Datelike, NaiveDateTime};
use ndarray::{Array2, ArrayView1, s};
use polars::prelude::*;
use std::ops::Range;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Days from 0001-01-01 (the proleptic CE epoch) to 1970-01-01.
///
/// Polars stores `Date` values as days since the Unix epoch, chrono counts
/// from the CE epoch.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Name of the date column produced by [`TimeSeriesTable::to_frame`].
pub const DATE_COLUMN: &str = "date";

/// Name of the column holding the date each row's target is realized on,
/// stored as [`epoch_days`].
pub const TARGET_DATE_COLUMN: &str = "target_date";

/// Days since 1970-01-01, the form a date takes inside a value column.
pub fn epoch_days(date: Date) -> f64 {
    f64::from(date.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS)
}

/// Parse a timestamp string into its calendar date, discarding time of day.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// RFC 3339 and `YYYY-MM-DD HH:MM:SS+HH:MM`. Offsets are ignored: the date is
/// the one written in the timestamp, not the one in UTC.
pub fn parse_calendar_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = Date::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local().date());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// An ordered-by-date table of named numeric columns.
///
/// Rows are keyed by a unique [`Date`] and kept in ascending date order.
/// Construction sorts the rows once; afterwards the table only grows by
/// appended columns or shrinks by order-preserving row selection.
///
/// # Example
///
/// ```
/// use sentcast_traits::{Date, TimeSeriesTable};
///
/// let d = |day| Date::from_ymd_opt(2024, 1, day).unwrap();
/// let table = TimeSeriesTable::new(
///     vec![d(3), d(1), d(2)],
///     vec![("close".to_string(), vec![12.0, 10.0, 11.0])],
/// )
/// .unwrap();
///
/// assert_eq!(table.dates(), &[d(1), d(2), d(3)]);
/// assert_eq!(table.column("close").unwrap(), &[10.0, 11.0, 12.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    dates: Vec<Date>,
    columns: Vec<(String, Vec<f64>)>,
}

impl TimeSeriesTable {
    /// Build a table, sorting rows ascending by date.
    ///
    /// # Errors
    ///
    /// Returns an error if a column length differs from the number of dates,
    /// a column name repeats, a value is not finite, or a date repeats.
    pub fn new(dates: Vec<Date>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let n = dates.len();

        for (i, (name, values)) in columns.iter().enumerate() {
            if values.len() != n {
                return Err(SentcastError::InvalidData(format!(
                    "column '{name}' has {} values for {n} dates",
                    values.len()
                )));
            }
            if columns[..i].iter().any(|(other, _)| other == name) {
                return Err(SentcastError::InvalidData(format!(
                    "duplicate column name '{name}'"
                )));
            }
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(SentcastError::InvalidData(format!(
                    "non-finite value in column '{name}' on {}",
                    dates[row]
                )));
            }
        }

        // Stable sort of row indices, applied to every column
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| dates[i]);

        if let Some(pair) = order.windows(2).find(|w| dates[w[0]] == dates[w[1]]) {
            return Err(SentcastError::DuplicateDate(dates[pair[0]]));
        }

        let sorted_dates = order.iter().map(|&i| dates[i]).collect();
        let sorted_columns = columns
            .into_iter()
            .map(|(name, values)| (name, order.iter().map(|&i| values[i]).collect()))
            .collect();

        Ok(Self {
            dates: sorted_dates,
            columns: sorted_columns,
        })
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Row dates in ascending order.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Column names in insertion order (the date key is not included).
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Gets a column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Gets a column by name, failing with [`SentcastError::MissingColumn`].
    pub fn require_column(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| SentcastError::MissingColumn(name.to_string()))
    }

    /// Row index of a date, if present.
    pub fn row_of(&self, date: Date) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Decode a column of [`epoch_days`] values back into dates.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::MissingColumn`] if the column is absent and
    /// [`SentcastError::InvalidData`] for a value that is not a whole day
    /// count within the calendar range.
    pub fn date_column(&self, name: &str) -> Result<Vec<Date>> {
        let lowest = f64::from(i32::MIN);
        let highest = f64::from(i32::MAX - CE_TO_UNIX_EPOCH_DAYS);
        self.require_column(name)?
            .iter()
            .zip(&self.dates)
            .map(|(&days, row_date)| {
                (days.fract() == 0.0 && (lowest..=highest).contains(&days))
                    .then(|| Date::from_num_days_from_ce_opt(days as i32 + CE_TO_UNIX_EPOCH_DAYS))
                    .flatten()
                    .ok_or_else(|| {
                        SentcastError::InvalidData(format!(
                            "column '{name}' holds {days} on {row_date}, not a day count"
                        ))
                    })
            })
            .collect()
    }

    /// Append a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the name already exists, the length does not match
    /// the row count, or a value is not finite.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(SentcastError::InvalidData(format!(
                "duplicate column name '{name}'"
            )));
        }
        if values.len() != self.len() {
            return Err(SentcastError::LengthMismatch {
                stage: "append column",
                expected: self.len(),
                actual: values.len(),
            });
        }
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(SentcastError::InvalidData(format!(
                "non-finite value in column '{name}' on {}",
                self.dates[row]
            )));
        }
        self.columns.push((name, values));
        Ok(self)
    }

    /// Contiguous block of rows. The range is clamped to the table.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Self {
            dates: self.dates[start..end].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), values[start..end].to_vec()))
                .collect(),
        }
    }

    /// Keep the rows whose mask entry is `true`, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::LengthMismatch`] if the mask length differs
    /// from the row count.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(SentcastError::LengthMismatch {
                stage: "row filter",
                expected: self.len(),
                actual: mask.len(),
            });
        }
        let keep = |values: &[f64]| {
            values
                .iter()
                .zip(mask)
                .filter_map(|(v, &m)| m.then_some(*v))
                .collect::<Vec<_>>()
        };
        Ok(Self {
            dates: self
                .dates
                .iter()
                .zip(mask)
                .filter_map(|(d, &m)| m.then_some(*d))
                .collect(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), keep(values)))
                .collect(),
        })
    }

    /// Project onto a subset of columns, in the given order.
    pub fn select_columns(&self, names: &[&str]) -> Result<Self> {
        let columns = names
            .iter()
            .map(|name| {
                self.require_column(name)
                    .map(|values| (name.to_string(), values.to_vec()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            dates: self.dates.clone(),
            columns,
        })
    }

    /// Build a model input matrix from the named columns (rows x columns).
    pub fn feature_matrix<S: AsRef<str>>(&self, names: &[S]) -> Result<FeatureMatrix> {
        let columns = names
            .iter()
            .map(|name| self.require_column(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let values = Array2::from_shape_fn((self.len(), columns.len()), |(i, j)| columns[j][i]);
        FeatureMatrix::new(
            names.iter().map(|n| n.as_ref().to_string()).collect(),
            values,
        )
    }

    /// Convert into a polars DataFrame with a leading `date` column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(DATE_COLUMN.into(), self.dates.as_slice()));
        for (name, values) in &self.columns {
            columns.push(Column::new(name.as_str().into(), values.as_slice()));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Read a table from a polars DataFrame.
    ///
    /// The date column may be of dtype `Date`, `Datetime` (truncated to the
    /// calendar date) or `String` (parsed with [`parse_calendar_date`]). Value
    /// columns are cast to `f64`; nulls are rejected rather than imputed.
    pub fn from_frame<S: AsRef<str>>(
        df: &DataFrame,
        date_column: &str,
        value_columns: &[S],
    ) -> Result<Self> {
        let dates = frame_dates(df, date_column)?;

        let mut columns = Vec::with_capacity(value_columns.len());
        for name in value_columns {
            let name = name.as_ref();
            let series = df
                .column(name)
                .map_err(|_| SentcastError::MissingColumn(name.to_string()))?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let values = series
                .f64()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    v.ok_or_else(|| {
                        SentcastError::InvalidData(format!(
                            "null value in column '{name}' on row {row}"
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            columns.push((name.to_string(), values));
        }

        Self::new(dates, columns)
    }
}

/// Extract a date column from a DataFrame as calendar dates.
pub fn frame_dates(df: &DataFrame, date_column: &str) -> Result<Vec<Date>> {
    let series = df
        .column(date_column)
        .map_err(|_| SentcastError::MissingColumn(date_column.to_string()))?
        .as_materialized_series();

    let invalid = |row: usize| {
        SentcastError::InvalidData(format!(
            "unparseable date in column '{date_column}' on row {row}"
        ))
    };

    match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, s)| s.and_then(parse_calendar_date).ok_or_else(|| invalid(row)))
            .collect(),
        DataType::Date | DataType::Datetime(_, _) => {
            let as_date = series.cast(&DataType::Date)?;
            as_date
                .date()?
                .into_iter()
                .enumerate()
                .map(|(row, d)| {
                    d.and_then(|days| Date::from_num_days_from_ce_opt(days + CE_TO_UNIX_EPOCH_DAYS))
                        .ok_or_else(|| invalid(row))
                })
                .collect()
        }
        other => Err(SentcastError::InvalidData(format!(
            "date column '{date_column}' has unsupported dtype {other}"
        ))),
    }
}

/// Named predictor columns for a forecast model.
///
/// Rows follow the order of the table the matrix was built from, so a target
/// series taken from the same table lines up positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Create a matrix, checking that every column has a name.
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(SentcastError::LengthMismatch {
                stage: "feature matrix",
                expected: values.ncols(),
                actual: names.len(),
            });
        }
        Ok(Self { names, values })
    }

    /// Column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The underlying rows x columns array.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// A column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| self.values.column(j))
    }

    /// Contiguous block of rows.
    pub fn rows(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.nrows());
        let start = range.start.min(end);
        Self {
            names: self.names.clone(),
            values: self.values.slice(s![start..end, ..]).to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn table() -> TimeSeriesTable {
        TimeSeriesTable::new(
            vec![d(1), d(2), d(3), d(4)],
            vec![
                ("close".to_string(), vec![10.0, 11.0, 12.0, 13.0]),
                ("sentiment".to_string(), vec![0.1, 0.2, 0.3, 0.4]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_sorts_rows_together() {
        let table = TimeSeriesTable::new(
            vec![d(3), d(1), d(2)],
            vec![
                ("close".to_string(), vec![3.0, 1.0, 2.0]),
                ("volume".to_string(), vec![30.0, 10.0, 20.0]),
            ],
        )
        .unwrap();

        assert_eq!(table.dates(), &[d(1), d(2), d(3)]);
        assert_eq!(table.column("close").unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(table.column("volume").unwrap(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_new_rejects_duplicate_dates() {
        let result = TimeSeriesTable::new(
            vec![d(1), d(2), d(1)],
            vec![("close".to_string(), vec![1.0, 2.0, 3.0])],
        );
        assert!(matches!(result, Err(SentcastError::DuplicateDate(date)) if date == d(1)));
    }

    #[test]
    fn test_new_rejects_length_mismatch_and_nan() {
        let short = TimeSeriesTable::new(
            vec![d(1), d(2)],
            vec![("close".to_string(), vec![1.0])],
        );
        assert!(matches!(short, Err(SentcastError::InvalidData(_))));

        let nan = TimeSeriesTable::new(
            vec![d(1), d(2)],
            vec![("close".to_string(), vec![1.0, f64::NAN])],
        );
        assert!(matches!(nan, Err(SentcastError::InvalidData(_))));
    }

    #[test]
    fn test_with_column() {
        let table = table().with_column("double", vec![20.0, 22.0, 24.0, 26.0]).unwrap();
        assert_eq!(table.column_names(), vec!["close", "sentiment", "double"]);

        let dup = table.clone().with_column("close", vec![0.0; 4]);
        assert!(dup.is_err());

        let short = table.with_column("short", vec![0.0; 3]);
        assert!(matches!(short, Err(SentcastError::LengthMismatch { .. })));
    }

    #[test]
    fn test_epoch_day_column() {
        assert_eq!(epoch_days(Date::from_ymd_opt(1970, 1, 2).unwrap()), 1.0);

        let days = table().dates().iter().map(|&d| epoch_days(d) + 1.0).collect();
        let table = table().with_column("next", days).unwrap();
        assert_eq!(table.date_column("next").unwrap(), vec![d(2), d(3), d(4), d(5)]);

        assert!(matches!(
            table.date_column("sentiment"),
            Err(SentcastError::InvalidData(_))
        ));
        assert!(matches!(
            table.date_column("missing"),
            Err(SentcastError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_slice_and_filter_preserve_order() {
        let table = table();

        let tail = table.slice(2..10);
        assert_eq!(tail.dates(), &[d(3), d(4)]);
        assert_eq!(tail.column("close").unwrap(), &[12.0, 13.0]);

        let filtered = table.filter_rows(&[true, false, true, false]).unwrap();
        assert_eq!(filtered.dates(), &[d(1), d(3)]);
        assert_eq!(filtered.column("sentiment").unwrap(), &[0.1, 0.3]);
    }

    #[test]
    fn test_require_column_missing() {
        let table = table();
        let result = table.require_column("open");
        assert!(matches!(result, Err(SentcastError::MissingColumn(ref c)) if c == "open"));
    }

    #[test]
    fn test_feature_matrix_layout() {
        let matrix = table().feature_matrix(&["sentiment", "close"]).unwrap();
        assert_eq!(matrix.nrows(), 4);
        assert_eq!(matrix.ncols(), 2);
        assert_eq!(matrix.values()[[1, 0]], 0.2);
        assert_eq!(matrix.values()[[1, 1]], 11.0);
        assert_eq!(matrix.column("close").unwrap()[3], 13.0);

        let head = matrix.rows(0..2);
        assert_eq!(head.nrows(), 2);
        assert_eq!(head.names(), matrix.names());
    }

    #[test]
    fn test_frame_round_trip() {
        let table = table();
        let df = table.to_frame().unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(df.width(), 3);

        let back = TimeSeriesTable::from_frame(&df, "date", &["close", "sentiment"]).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_from_frame_string_dates() {
        let df = df! {
            "Date" => &["2024-01-02 15:30:00", "2024-01-01"],
            "Close" => &[11.0, 10.0],
        }
        .unwrap();

        let table = TimeSeriesTable::from_frame(&df, "Date", &["Close"]).unwrap();
        assert_eq!(table.dates(), &[d(1), d(2)]);
        assert_eq!(table.column("Close").unwrap(), &[10.0, 11.0]);
    }

    #[test]
    fn test_from_frame_missing_column() {
        let df = df! {
            "date" => &["2024-01-01"],
        }
        .unwrap();
        let result = TimeSeriesTable::from_frame(&df, "date", &["close"]);
        assert!(matches!(result, Err(SentcastError::MissingColumn(_))));
    }

    #[test]
    fn test_parse_calendar_date_formats() {
        let expected = Some(d(5));
        assert_eq!(parse_calendar_date("2024-01-05"), expected);
        assert_eq!(parse_calendar_date("2024-01-05 23:41:16"), expected);
        assert_eq!(parse_calendar_date("2024-01-05T08:00:00"), expected);
        assert_eq!(parse_calendar_date("2024-01-05 23:41:16+00:00"), expected);
        assert_eq!(parse_calendar_date("2024-01-05T23:41:16Z"), expected);
        assert_eq!(parse_calendar_date("not a date"), None);
        assert_eq!(parse_calendar_date("   "), None);
    }
}
