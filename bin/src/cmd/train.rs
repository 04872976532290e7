//! Model training command.

use std::path::Path;

use anyhow::{Context, Result};
use sentcast::TimeSeriesTable;
use sentcast::data;
use sentcast::eval::{
    ForecastEvaluator, ForecastHarness, ForecastRecord, ForecastRun, interval_coverage,
};
use sentcast::features::{FeatureConfig, FeatureEngineer, MinMaxScaler};
use sentcast::models::ModelSpec;

use crate::config::PipelineConfig;

/// Options of the `train` command.
#[derive(Debug)]
pub(crate) struct TrainOptions<'a> {
    pub(crate) feature_set: Option<&'a str>,
    pub(crate) model: Option<&'a str>,
    pub(crate) alpha: Option<f64>,
    pub(crate) test_fraction: Option<f64>,
    pub(crate) scaler: Option<&'a Path>,
    pub(crate) field: &'a str,
}

/// Fit a model on the training prefix of a merged table and write its
/// hold-out forecasts.
pub(crate) fn train_model(
    config: &PipelineConfig,
    input: &Path,
    output: &Path,
    options: &TrainOptions<'_>,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Model Training                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let table = data::load_table(input)?;
    let features = config.feature_config(options.feature_set)?;
    let spec = config.model_spec(options.model, options.alpha)?;

    println!("Input:     {} ({} rows)", input.display(), table.len());
    println!("Model:     {}", spec.label());

    let run = fit_and_forecast(config, &table, &features, &spec, options.test_fraction)?;
    print_run(&run);

    let records = match options.scaler {
        Some(path) => {
            let scaler = data::load_scaler(path)?;
            let raw = to_raw_units(&run.records, &scaler, options.field)?;
            println!(
                "Raw units: {} ({})",
                ForecastEvaluator::evaluate_records(&raw)?,
                options.field
            );
            raw
        }
        None => run.records,
    };

    data::write_forecast_records(output, &records)?;
    println!("\nWrote {} forecasts to {}", records.len(), output.display());
    Ok(())
}

/// Derive features and run one hold-out evaluation.
pub(crate) fn fit_and_forecast(
    config: &PipelineConfig,
    table: &TimeSeriesTable,
    features: &FeatureConfig,
    spec: &ModelSpec,
    test_fraction: Option<f64>,
) -> Result<ForecastRun> {
    let derived = FeatureEngineer::new(features.clone()).derive(table)?;
    let harness = ForecastHarness::new(config.harness_config(features, spec, test_fraction));
    let mut model = spec.build();
    let run = harness
        .run(&derived, model.as_mut())
        .with_context(|| format!("{} failed", spec.label()))?;
    Ok(run)
}

/// Map scaled forecasts back to the units of `field`.
pub(crate) fn to_raw_units(
    records: &[ForecastRecord],
    scaler: &MinMaxScaler,
    field: &str,
) -> Result<Vec<ForecastRecord>> {
    let range = scaler
        .range(field)
        .with_context(|| format!("scaler has no range for '{}'", field))?;
    Ok(records
        .iter()
        .map(|record| record.map_values(|v| range.inverse(v)))
        .collect())
}

fn print_run(run: &ForecastRun) {
    println!("Train:     {} rows", run.train_rows);
    println!("Test:      {} rows", run.records.len());
    println!("\n━━━ Hold-out ━━━");
    println!("  MAE:      {:.6}", run.metrics.mae);
    println!("  RMSE:     {:.6}", run.metrics.rmse);
    if let Some(coverage) = interval_coverage(&run.records) {
        println!("  Coverage: {:.1}%", coverage * 100.0);
    }
}
