//! Date join of prices with daily sentiment, followed by min-max scaling.

use std::collections::BTreeMap;

use sentcast_traits::{Date, Result, SentcastError, TimeSeriesTable};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scaler::MinMaxScaler;

/// Configuration for [`merge_and_normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Name given to the joined sentiment column (default: `sentiment`)
    pub sentiment_column: String,
    /// Suffix appended to scaled column names (default: `_norm`)
    pub scaled_suffix: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            sentiment_column: "sentiment".to_string(),
            scaled_suffix: "_norm".to_string(),
        }
    }
}

/// A merged table together with the scaler fitted on it.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    /// Joined table holding raw and scaled columns
    pub table: TimeSeriesTable,
    /// Ranges used for scaling, needed to invert forecasts
    pub scaler: MinMaxScaler,
}

/// Inner-join `price_table` with `sentiment` on date and min-max scale fields.
///
/// Only dates present on both sides survive. The sentiment value is added as
/// [`MergeConfig::sentiment_column`], then each of `fields_to_scale` (which may
/// name the sentiment column) gets a `<field><suffix>` column in [0, 1].
///
/// # Errors
///
/// Returns [`SentcastError::NoOverlap`] if no date matches,
/// [`SentcastError::DegenerateScale`] if a field to scale is constant over the
/// joined rows, and [`SentcastError::MissingColumn`] for an unknown field.
pub fn merge_and_normalize<S: AsRef<str>>(
    price_table: &TimeSeriesTable,
    sentiment: &BTreeMap<Date, f64>,
    fields_to_scale: &[S],
    config: &MergeConfig,
) -> Result<NormalizedTable> {
    let mask: Vec<bool> = price_table
        .dates()
        .iter()
        .map(|date| sentiment.contains_key(date))
        .collect();
    let joined = price_table.filter_rows(&mask)?;
    if joined.is_empty() {
        return Err(SentcastError::NoOverlap { stage: "merge" });
    }

    let dropped = price_table.len() - joined.len();
    if dropped > 0 {
        warn!(dropped, "price rows without a sentiment value were dropped");
    }

    let values = joined
        .dates()
        .iter()
        .filter_map(|date| sentiment.get(date).copied())
        .collect();
    let joined = joined.with_column(config.sentiment_column.as_str(), values)?;

    let scaler = MinMaxScaler::fit(&joined, fields_to_scale)?;
    let table = scaler.transform(&joined, &config.scaled_suffix)?;

    info!(
        rows = table.len(),
        price_rows = price_table.len(),
        sentiment_days = sentiment.len(),
        "merged prices with sentiment"
    );

    Ok(NormalizedTable { table, scaler })
}
