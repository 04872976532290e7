//! Forecast records exchanged with reporting and presentation tools.

use sentcast_traits::Date;
use serde::{Deserialize, Serialize};

/// One dated forecast next to the realized value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Date the forecast value is realized on
    pub date: Date,
    /// Realized target value
    pub actual_value: f64,
    /// Point forecast
    pub predicted_value: f64,
    /// Lower prediction bound, when the model provides intervals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    /// Upper prediction bound, when the model provides intervals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

impl ForecastRecord {
    /// Record without prediction bounds.
    pub const fn new(date: Date, actual_value: f64, predicted_value: f64) -> Self {
        Self {
            date,
            actual_value,
            predicted_value,
            lower_bound: None,
            upper_bound: None,
        }
    }

    /// Attach prediction bounds.
    #[must_use]
    pub const fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = Some(lower);
        self.upper_bound = Some(upper);
        self
    }

    /// Forecast error, `actual - predicted`.
    pub fn error(&self) -> f64 {
        self.actual_value - self.predicted_value
    }

    /// Apply `f` to every value, e.g. to undo min-max scaling.
    #[must_use]
    pub fn map_values(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            date: self.date,
            actual_value: f(self.actual_value),
            predicted_value: f(self.predicted_value),
            lower_bound: self.lower_bound.map(&f),
            upper_bound: self.upper_bound.map(&f),
        }
    }

    /// Whether the actual value lies within the bounds, `None` without bounds.
    pub fn covered(&self) -> Option<bool> {
        match (self.lower_bound, self.upper_bound) {
            (Some(lo), Some(hi)) => Some(lo <= self.actual_value && self.actual_value <= hi),
            _ => None,
        }
    }
}

/// Fraction of records whose actual value falls inside the bounds.
///
/// Records without bounds are skipped; `None` if none has bounds.
pub fn interval_coverage(records: &[ForecastRecord]) -> Option<f64> {
    let covered: Vec<bool> = records.iter().filter_map(ForecastRecord::covered).collect();
    if covered.is_empty() {
        return None;
    }
    Some(covered.iter().filter(|&&c| c).count() as f64 / covered.len() as f64)
}
