//! Min-max scaling to [0, 1].

use sentcast_traits::{Result, SentcastError, TimeSeriesTable, stats};
use serde::{Deserialize, Serialize};

/// Observed range of one scaled field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    /// Field name in the unscaled table
    pub field: String,
    /// Minimum observed value
    pub min: f64,
    /// Maximum observed value
    pub max: f64,
}

impl FieldRange {
    /// Map a raw value onto the fitted range.
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    /// Map a scaled value back to raw units.
    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * (self.max - self.min) + self.min
    }
}

/// Fitted min-max scaler over one or more fields.
///
/// The fitted ranges are retained so forecasts in normalized space can be
/// mapped back to raw units, and serialize so the scaler can be stored next
/// to a trained model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    ranges: Vec<FieldRange>,
}

impl MinMaxScaler {
    /// Fit ranges for `fields` over every row of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::MissingColumn`] for an unknown field,
    /// [`SentcastError::InsufficientData`] for an empty table, and
    /// [`SentcastError::DegenerateScale`] when a field's max equals its min.
    pub fn fit<S: AsRef<str>>(table: &TimeSeriesTable, fields: &[S]) -> Result<Self> {
        if table.is_empty() {
            return Err(SentcastError::InsufficientData {
                stage: "min-max scaling",
                rows: 0,
                required: 1,
            });
        }

        let mut ranges = Vec::with_capacity(fields.len());
        for field in fields {
            let field = field.as_ref();
            let values = table.require_column(field)?;
            let (min, max) = stats::min_max(values).ok_or_else(|| {
                SentcastError::InvalidData(format!("column '{field}' contains NaN"))
            })?;
            if max - min <= 0.0 {
                return Err(SentcastError::DegenerateScale {
                    field: field.to_string(),
                    value: min,
                });
            }
            ranges.push(FieldRange {
                field: field.to_string(),
                min,
                max,
            });
        }

        Ok(Self { ranges })
    }

    /// All fitted ranges, in fit order.
    pub fn ranges(&self) -> &[FieldRange] {
        &self.ranges
    }

    /// Fitted range of `field`.
    pub fn range(&self, field: &str) -> Option<&FieldRange> {
        self.ranges.iter().find(|r| r.field == field)
    }

    fn require_range(&self, field: &str) -> Result<&FieldRange> {
        self.range(field).ok_or_else(|| {
            SentcastError::InvalidConfig(format!("scaler was not fitted on field '{field}'"))
        })
    }

    /// Scale one raw value of `field`.
    pub fn scale_value(&self, field: &str, value: f64) -> Result<f64> {
        Ok(self.require_range(field)?.scale(value))
    }

    /// Map one scaled value of `field` back to raw units.
    pub fn inverse_value(&self, field: &str, scaled: f64) -> Result<f64> {
        Ok(self.require_range(field)?.inverse(scaled))
    }

    /// Map a series of scaled values of `field` back to raw units.
    pub fn inverse_transform(&self, field: &str, scaled: &[f64]) -> Result<Vec<f64>> {
        let range = self.require_range(field)?;
        Ok(scaled.iter().map(|&v| range.inverse(v)).collect())
    }

    /// Append a `<field><suffix>` column for every fitted field.
    ///
    /// Values outside the fitted range map outside [0, 1]; the raw columns are
    /// kept unchanged.
    pub fn transform(&self, table: &TimeSeriesTable, suffix: &str) -> Result<TimeSeriesTable> {
        let mut output = table.clone();
        for range in &self.ranges {
            let scaled = table
                .require_column(&range.field)?
                .iter()
                .map(|&v| range.scale(v))
                .collect();
            output = output.with_column(format!("{}{suffix}", range.field), scaled)?;
        }
        Ok(output)
    }
}
