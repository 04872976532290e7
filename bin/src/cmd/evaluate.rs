//! Forecast evaluation command.

use std::path::Path;

use anyhow::Result;
use sentcast::data;
use sentcast::eval::{ForecastEvaluator, ForecastMetrics};

/// Options of the `evaluate` command.
#[derive(Debug)]
pub(crate) struct EvaluateOptions<'a> {
    pub(crate) actual_column: &'a str,
    pub(crate) predicted_column: &'a str,
    pub(crate) key: &'a str,
}

/// Compare a forecast column against actual values joined on date.
pub(crate) fn evaluate_forecast(
    actual: &Path,
    predicted: &Path,
    options: &EvaluateOptions<'_>,
) -> Result<ForecastMetrics> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Forecast Evaluation                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let actual_table = data::load_keyed_table(actual, options.key)?;
    let predicted_table = data::load_keyed_table(predicted, options.key)?;

    println!(
        "Actual:    {} [{}] ({} rows)",
        actual.display(),
        options.actual_column,
        actual_table.len()
    );
    println!(
        "Predicted: {} [{}] ({} rows)",
        predicted.display(),
        options.predicted_column,
        predicted_table.len()
    );

    let metrics = ForecastEvaluator::evaluate_tables(
        &actual_table,
        options.actual_column,
        &predicted_table,
        options.predicted_column,
    )?;

    println!("\n━━━ Metrics ━━━");
    println!("  MAE:      {:.6}", metrics.mae);
    println!("  RMSE:     {:.6}", metrics.rmse);
    println!("  Matched:  {} of {}", metrics.n_obs, predicted_table.len());
    Ok(metrics)
}
