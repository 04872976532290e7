//! Lag, rolling-window and target feature derivation.
//!
//! Turns a date-sorted [`TimeSeriesTable`] into a supervised-learning table:
//! lagged copies of each source field, trailing rolling mean and sample
//! standard deviation of the target field (and any extra roll fields), and a
//! one-step-ahead `target` together with the date it is realized on. Rows
//! whose features or target would reference positions outside the table are
//! trimmed, never imputed.

use sentcast_traits::types::TARGET_DATE_COLUMN;
use sentcast_traits::{Result, SentcastError, TimeSeriesTable, epoch_days, stats};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the one-step-ahead target column.
pub const TARGET_COLUMN: &str = "target";

const STAGE: &str = "feature engineering";

/// Column name of the `k`-row lag of `field`.
pub fn lag_column(field: &str, k: usize) -> String {
    format!("lag_{field}_{k}")
}

/// Column name of the trailing rolling mean of `field` over `window` rows.
pub fn roll_mean_column(field: &str, window: usize) -> String {
    format!("roll_mean_{field}_{window}")
}

/// Column name of the trailing rolling sample std of `field` over `window` rows.
pub fn roll_std_column(field: &str, window: usize) -> String {
    format!("roll_std_{field}_{window}")
}

/// Configuration for feature derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Field whose next-row value becomes the target (default: `close`)
    pub target_field: String,
    /// Additional fields to lag, e.g. a daily sentiment column
    pub source_fields: Vec<String>,
    /// Additional source fields that also get rolling mean and std; the
    /// target field always does
    pub roll_fields: Vec<String>,
    /// Number of lags per source field (default: 1)
    pub lag_depth: usize,
    /// Rolling window for mean and std, inclusive of the current row (default: 3)
    pub rolling_window: usize,
    /// Extra trailing-mean windows applied to the additional source fields
    pub extra_mean_windows: Vec<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            target_field: "close".to_string(),
            source_fields: Vec::new(),
            roll_fields: Vec::new(),
            lag_depth: 1,
            rolling_window: 3,
            extra_mean_windows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Derived {
    Lag { field: String, k: usize },
    Mean { field: String, window: usize },
    Std { field: String, window: usize },
}

impl Derived {
    fn column(&self) -> String {
        match self {
            Self::Lag { field, k } => lag_column(field, *k),
            Self::Mean { field, window } => roll_mean_column(field, *window),
            Self::Std { field, window } => roll_std_column(field, *window),
        }
    }

    fn field(&self) -> &str {
        match self {
            Self::Lag { field, .. } | Self::Mean { field, .. } | Self::Std { field, .. } => field,
        }
    }

    /// Value for row `i`; the caller guarantees `i` is past the warm-up.
    fn compute(&self, values: &[f64], i: usize) -> f64 {
        match self {
            Self::Lag { k, .. } => values[i - k],
            Self::Mean { window, .. } => {
                stats::mean(&values[i + 1 - window..=i]).unwrap_or(f64::NAN)
            }
            Self::Std { window, .. } => {
                stats::sample_std(&values[i + 1 - window..=i]).unwrap_or(f64::NAN)
            }
        }
    }
}

impl FeatureConfig {
    /// Config targeting `field` with default lag depth and window.
    pub fn new(target_field: impl Into<String>) -> Self {
        Self {
            target_field: target_field.into(),
            ..Default::default()
        }
    }

    /// Add a source field to lag alongside the target field.
    #[must_use]
    pub fn with_source_field(mut self, field: impl Into<String>) -> Self {
        self.source_fields.push(field.into());
        self
    }

    /// Add a source field that also gets rolling mean and std.
    #[must_use]
    pub fn with_roll_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.source_fields.contains(&field) {
            self.source_fields.push(field.clone());
        }
        self.roll_fields.push(field);
        self
    }

    /// Set the lag depth.
    #[must_use]
    pub const fn with_lag_depth(mut self, lag_depth: usize) -> Self {
        self.lag_depth = lag_depth;
        self
    }

    /// Set the rolling window.
    #[must_use]
    pub const fn with_rolling_window(mut self, rolling_window: usize) -> Self {
        self.rolling_window = rolling_window;
        self
    }

    /// Set extra trailing-mean windows for the additional source fields.
    #[must_use]
    pub fn with_extra_mean_windows(mut self, windows: Vec<usize>) -> Self {
        self.extra_mean_windows = windows;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::InvalidConfig`] if `lag_depth < 1`, any window
    /// is below 2, the target field name is empty, or a roll field is not a
    /// source field.
    pub fn validate(&self) -> Result<()> {
        if self.target_field.is_empty() {
            return Err(SentcastError::InvalidConfig(
                "target_field must not be empty".to_string(),
            ));
        }
        if self.lag_depth < 1 {
            return Err(SentcastError::InvalidConfig(format!(
                "lag_depth must be >= 1, got {}",
                self.lag_depth
            )));
        }
        if self.rolling_window < 2 {
            return Err(SentcastError::InvalidConfig(format!(
                "rolling_window must be >= 2, got {}",
                self.rolling_window
            )));
        }
        if let Some(w) = self.extra_mean_windows.iter().find(|&&w| w < 2) {
            return Err(SentcastError::InvalidConfig(format!(
                "extra mean windows must be >= 2, got {w}"
            )));
        }
        if let Some(field) = self
            .roll_fields
            .iter()
            .find(|&f| *f != self.target_field && !self.source_fields.contains(f))
        {
            return Err(SentcastError::InvalidConfig(format!(
                "roll field '{field}' is not a source field"
            )));
        }
        Ok(())
    }

    /// Target field followed by the additional source fields, deduplicated.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = vec![self.target_field.as_str()];
        for field in &self.source_fields {
            if !fields.contains(&field.as_str()) {
                fields.push(field);
            }
        }
        fields
    }

    /// Largest window in use.
    pub fn max_window(&self) -> usize {
        self.extra_mean_windows
            .iter()
            .copied()
            .fold(self.rolling_window, usize::max)
    }

    /// Leading rows with at least one undefined lag or rolling value.
    pub fn warmup_rows(&self) -> usize {
        self.lag_depth.max(self.max_window() - 1)
    }

    /// Smallest input size that leaves at least one complete row.
    pub fn min_rows(&self) -> usize {
        self.warmup_rows() + 2
    }

    /// Names of the derived predictor columns, in output order.
    ///
    /// The `target` column is not included.
    pub fn feature_columns(&self) -> Vec<String> {
        self.derived().iter().map(Derived::column).collect()
    }

    /// Lags of every field, then rolling stats of the target and roll
    /// fields, then the extra means of the source fields.
    fn derived(&self) -> Vec<Derived> {
        let fields = self.fields();
        let mut derived = Vec::new();
        for field in &fields {
            for k in 1..=self.lag_depth {
                derived.push(Derived::Lag {
                    field: field.to_string(),
                    k,
                });
            }
        }
        let rolled = fields
            .iter()
            .filter(|&&f| f == self.target_field || self.roll_fields.iter().any(|r| r == f));
        for field in rolled {
            derived.push(Derived::Mean {
                field: field.to_string(),
                window: self.rolling_window,
            });
            derived.push(Derived::Std {
                field: field.to_string(),
                window: self.rolling_window,
            });
        }
        for field in fields.iter().filter(|&&f| f != self.target_field) {
            for &window in &self.extra_mean_windows {
                let extra = Derived::Mean {
                    field: field.to_string(),
                    window,
                };
                if !derived.contains(&extra) {
                    derived.push(extra);
                }
            }
        }
        derived
    }
}

/// Derives lag, rolling and target columns from a date-sorted table.
///
/// # Example
///
/// ```
/// use sentcast_features::{FeatureConfig, FeatureEngineer};
/// use sentcast_traits::{Date, TimeSeriesTable};
///
/// let dates = (1..=5).map(|d| Date::from_ymd_opt(2024, 1, d).unwrap()).collect();
/// let table = TimeSeriesTable::new(
///     dates,
///     vec![("close".to_string(), vec![10.0, 11.0, 12.0, 11.0, 13.0])],
/// )
/// .unwrap();
///
/// let features = FeatureEngineer::new(FeatureConfig::default()).derive(&table).unwrap();
/// assert_eq!(features.len(), 2);
/// assert!(features.has_column("roll_std_close_3"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: FeatureConfig,
}

impl FeatureEngineer {
    /// Create an engineer with the given configuration.
    #[must_use]
    pub const fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Derive features, keeping only fully-determined rows.
    ///
    /// The output keeps the input columns, appends the derived columns in
    /// [`FeatureConfig::feature_columns`] order followed by `target` and
    /// `target_date`, and drops the first [`FeatureConfig::warmup_rows`] rows
    /// and the last row. Rows stay dated by the feature row; `target_date`
    /// holds the next row's date as [`epoch_days`].
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::InvalidConfig`] for out-of-range parameters,
    /// [`SentcastError::MissingColumn`] for an unknown field, and
    /// [`SentcastError::InsufficientData`] when fewer than
    /// [`FeatureConfig::min_rows`] rows are available.
    pub fn derive(&self, table: &TimeSeriesTable) -> Result<TimeSeriesTable> {
        self.config.validate()?;
        for field in self.config.fields() {
            table.require_column(field)?;
        }

        let n = table.len();
        let required = self.config.min_rows();
        if n < required {
            return Err(SentcastError::InsufficientData {
                stage: STAGE,
                rows: n,
                required,
            });
        }

        let keep = self.config.warmup_rows()..n - 1;

        let mut columns = Vec::new();
        for derived in self.config.derived() {
            let values = table.require_column(derived.field())?;
            let column = keep.clone().map(|i| derived.compute(values, i)).collect();
            columns.push((derived.column(), column));
        }
        let target_values = table.require_column(&self.config.target_field)?;
        columns.push((
            TARGET_COLUMN.to_string(),
            keep.clone().map(|i| target_values[i + 1]).collect(),
        ));
        let dates = table.dates();
        columns.push((
            TARGET_DATE_COLUMN.to_string(),
            keep.clone().map(|i| epoch_days(dates[i + 1])).collect(),
        ));

        let mut output = table.slice(keep);
        for (name, values) in columns {
            output = output.with_column(name, values)?;
        }

        debug!(
            rows_in = n,
            rows_out = output.len(),
            target = %self.config.target_field,
            "derived features"
        );

        Ok(output)
    }
}

/// Derive features for a single target field.
///
/// Shorthand for [`FeatureEngineer::derive`] with a config that has no
/// additional source fields.
pub fn derive(
    table: &TimeSeriesTable,
    target_field: &str,
    lag_depth: usize,
    rolling_window: usize,
) -> Result<TimeSeriesTable> {
    let config = FeatureConfig::new(target_field)
        .with_lag_depth(lag_depth)
        .with_rolling_window(rolling_window);
    FeatureEngineer::new(config).derive(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sentcast_traits::Date;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn close_table(values: &[f64]) -> TimeSeriesTable {
        let dates = (1..=values.len() as u32).map(d).collect();
        TimeSeriesTable::new(dates, vec![("close".to_string(), values.to_vec())]).unwrap()
    }

    #[test]
    fn test_five_day_scenario() {
        let table = close_table(&[10.0, 11.0, 12.0, 11.0, 13.0]);
        let out = derive(&table, "close", 1, 3).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out.dates(), &[d(3), d(4)]);

        let lag = out.column("lag_close_1").unwrap();
        let mean = out.column("roll_mean_close_3").unwrap();
        let std = out.column("roll_std_close_3").unwrap();
        let target = out.column("target").unwrap();

        assert_eq!(lag, &[11.0, 12.0]);
        assert_relative_eq!(mean[0], 11.0);
        assert_relative_eq!(mean[1], 34.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(std[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(std[1], (1.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(target, &[11.0, 13.0]);
    }

    #[test]
    fn test_boundary_lag_plus_window_rows() {
        // lag_depth + rolling_window = 4 rows leaves exactly one row
        let table = close_table(&[1.0, 2.0, 3.0, 4.0]);
        let out = derive(&table, "close", 1, 3).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.dates(), &[d(3)]);
        assert_eq!(out.column("target").unwrap(), &[4.0]);
    }

    #[test]
    fn test_too_few_rows_is_an_error() {
        let table = close_table(&[1.0, 2.0, 3.0]);
        let err = derive(&table, "close", 1, 3).unwrap_err();
        assert!(matches!(
            err,
            SentcastError::InsufficientData {
                rows: 3,
                required: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_deep_lags_dominate_warmup() {
        // lag_depth 3 > rolling_window - 1, so 3 leading rows are trimmed
        let table = close_table(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let out = derive(&table, "close", 3, 2).unwrap();
        assert_eq!(out.dates(), &[d(4), d(5)]);
        assert_eq!(out.column("lag_close_3").unwrap(), &[1.0, 2.0]);
        assert_eq!(out.column("lag_close_1").unwrap(), &[3.0, 4.0]);

        let short = close_table(&[1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            derive(&short, "close", 3, 2),
            Err(SentcastError::InsufficientData { required: 5, .. })
        ));
    }

    #[test]
    fn test_target_is_next_row_and_order_preserved() {
        let values = [5.0, 3.0, 8.0, 1.0, 9.0, 2.0, 7.0, 4.0];
        let table = close_table(&values);
        let out = derive(&table, "close", 2, 3).unwrap();

        assert!(out.dates().windows(2).all(|w| w[0] < w[1]));
        for (date, target) in out.dates().iter().zip(out.column("target").unwrap()) {
            let row = table.row_of(*date).unwrap();
            assert_eq!(*target, values[row + 1]);
        }
    }

    #[test]
    fn test_source_fields_and_extra_windows() {
        let dates: Vec<Date> = (1..=8).map(d).collect();
        let table = TimeSeriesTable::new(
            dates,
            vec![
                ("close".to_string(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
                ("sentiment".to_string(), vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
            ],
        )
        .unwrap();

        let config = FeatureConfig::new("close")
            .with_source_field("sentiment")
            .with_extra_mean_windows(vec![3, 5]);
        let out = FeatureEngineer::new(config.clone()).derive(&table).unwrap();

        // window 5 sets the warm-up: 4 leading rows plus the last row go
        assert_eq!(out.len(), 3);
        assert_eq!(
            config.feature_columns(),
            vec![
                "lag_close_1",
                "lag_sentiment_1",
                "roll_mean_close_3",
                "roll_std_close_3",
                "roll_mean_sentiment_3",
                "roll_mean_sentiment_5",
            ]
        );
        for column in config.feature_columns() {
            assert!(out.has_column(&column), "missing {column}");
        }
        assert_relative_eq!(out.column("roll_mean_sentiment_5").unwrap()[0], 0.4);
    }

    #[test]
    fn test_roll_fields_get_rolling_stats() {
        let lagged = FeatureConfig::new("close").with_source_field("sentiment");
        assert_eq!(
            lagged.feature_columns(),
            vec![
                "lag_close_1",
                "lag_sentiment_1",
                "roll_mean_close_3",
                "roll_std_close_3"
            ]
        );

        let rolled = FeatureConfig::new("close").with_roll_field("sentiment");
        assert_eq!(rolled.source_fields, vec!["sentiment"]);
        assert_eq!(
            rolled.feature_columns(),
            vec![
                "lag_close_1",
                "lag_sentiment_1",
                "roll_mean_close_3",
                "roll_std_close_3",
                "roll_mean_sentiment_3",
                "roll_std_sentiment_3",
            ]
        );

        let mut stray = FeatureConfig::new("close");
        stray.roll_fields.push("sentiment".to_string());
        assert!(matches!(stray.validate(), Err(SentcastError::InvalidConfig(_))));
    }

    #[test]
    fn test_target_date_is_next_row() {
        let table = close_table(&[10.0, 11.0, 12.0, 11.0, 13.0]);
        let out = derive(&table, "close", 1, 3).unwrap();

        let target_dates = out.date_column(TARGET_DATE_COLUMN).unwrap();
        assert_eq!(target_dates, vec![d(4), d(5)]);
        for (date, target) in target_dates.iter().zip(out.column("target").unwrap()) {
            let row = table.row_of(*date).unwrap();
            assert_eq!(*target, table.column("close").unwrap()[row]);
        }
        assert!(!FeatureConfig::default()
            .feature_columns()
            .contains(&TARGET_DATE_COLUMN.to_string()));
    }

    #[test]
    fn test_invalid_config() {
        let table = close_table(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(matches!(
            derive(&table, "close", 0, 3),
            Err(SentcastError::InvalidConfig(_))
        ));
        assert!(matches!(
            derive(&table, "close", 1, 1),
            Err(SentcastError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_field() {
        let table = close_table(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(matches!(
            derive(&table, "open", 1, 3),
            Err(SentcastError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = FeatureConfig::default();
        assert_eq!(config.target_field, "close");
        assert_eq!(config.lag_depth, 1);
        assert_eq!(config.rolling_window, 3);
        assert_eq!(config.warmup_rows(), 2);
        assert_eq!(config.min_rows(), 4);
    }
}
