//! Full pipeline command: raw prices and messages in, forecasts and a report out.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sentcast::TimeSeriesTable;
use sentcast::data;
use sentcast::eval::{
    ForecastEvaluator, ForecastMetrics, ForecastRun, TuningReport, interval_coverage,
};
use sentcast::features::MinMaxScaler;
use sentcast::models::ModelSpec;
use serde::Serialize;
use tracing::{info, warn};

use super::compare::{compare_row, print_table};
use super::{merge, sentiment, train, tune};
use crate::config::PipelineConfig;

/// Summary written to `report.json`.
#[derive(Debug, Serialize)]
pub(crate) struct PipelineReport {
    pub(crate) messages: usize,
    pub(crate) scored_messages: usize,
    pub(crate) sentiment_days: usize,
    pub(crate) merged_rows: usize,
    pub(crate) runs: Vec<RunSummary>,
    pub(crate) best_ridge: Option<ModelSpec>,
}

/// Outcome of one feature set and model.
#[derive(Debug, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) feature_set: String,
    pub(crate) model: String,
    pub(crate) train_rows: usize,
    /// Metrics on the scaled target
    pub(crate) metrics: ForecastMetrics,
    /// Metrics after mapping forecasts back to prices
    pub(crate) price_metrics: ForecastMetrics,
    pub(crate) coverage: Option<f64>,
    pub(crate) predictions: String,
}

/// Run every stage and write all artifacts to `output_dir`.
pub(crate) fn run_pipeline(
    config: &PipelineConfig,
    prices: &Path,
    tweets: &Path,
    output_dir: &Path,
) -> Result<PipelineReport> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Forecast Pipeline                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    println!("━━━ Sentiment ━━━");
    let scored = sentiment::score_messages(config, tweets)?;
    sentiment::print_report(&scored);
    data::write_daily_sentiment(
        &output_dir.join("daily_sentiment.csv"),
        &scored.daily,
        &config.merge.sentiment_column,
    )?;

    println!("\n━━━ Merge ━━━");
    let merged = merge::merge_prices(config, prices, &scored.daily)?;
    data::write_table(&output_dir.join("merged.csv"), &merged.table)?;
    data::save_scaler(&output_dir.join("scaler.json"), &merged.scaler)?;

    println!("━━━ Forecasts ━━━");
    let price_field = config.price_field();
    let mut runs = Vec::new();
    let mut rows = Vec::new();
    for (set_name, spec) in run_plan(config) {
        let features = config.feature_config(Some(set_name.as_str()))?;
        let run = train::fit_and_forecast(config, &merged.table, &features, &spec, None)?;
        let label = format!("{}/{}", set_name, spec.label());
        info!(feature_set = %set_name, model = %spec.label(), "finished run");

        let file = format!("predictions_{}_{}.csv", set_name, run.model);
        data::write_forecast_records(&output_dir.join(&file), &run.records)?;

        rows.push(compare_row(&label, &run.records)?);
        runs.push(summarize(&set_name, &spec, run, &merged.scaler, &price_field, file)?);
    }
    println!();
    print_table(&rows);

    println!("\n━━━ Tuning ━━━");
    let best_ridge = match tune_configured(config, &merged.table) {
        Ok(report) => {
            tune::print_ranking(&report);
            data::save_json(&output_dir.join("tuning.json"), &report)?;
            report.best().map(|trial| trial.candidate.clone())
        }
        Err(e) => {
            warn!(error = %e, "tuning skipped");
            println!("Skipped: {:#}", e);
            None
        }
    };

    let report = PipelineReport {
        messages: scored.total,
        scored_messages: scored.scored,
        sentiment_days: scored.daily.len(),
        merged_rows: merged.table.len(),
        runs,
        best_ridge,
    };
    data::save_json(&output_dir.join("report.json"), &report)?;
    println!("\nWrote artifacts to {}", output_dir.display());
    Ok(report)
}

/// Configured model on every compared feature set, plus a persistence
/// baseline on the first.
fn run_plan(config: &PipelineConfig) -> Vec<(String, ModelSpec)> {
    let mut plan: Vec<(String, ModelSpec)> = config
        .compare_sets
        .iter()
        .map(|name| (name.clone(), config.model.clone()))
        .collect();
    if let Some(first) = config.compare_sets.first() {
        let baseline = ModelSpec::persistence(format!(
            "{}{}",
            config.price_field(),
            config.merge.scaled_suffix
        ));
        if baseline != config.model {
            plan.push((first.clone(), baseline));
        }
    }
    plan
}

fn tune_configured(
    config: &PipelineConfig,
    table: &TimeSeriesTable,
) -> Result<TuningReport<ModelSpec>> {
    let features = config.feature_config(None)?;
    tune::search_ridge(config, table, &features, &config.tuning)
}

fn summarize(
    set_name: &str,
    spec: &ModelSpec,
    run: ForecastRun,
    scaler: &MinMaxScaler,
    price_field: &str,
    predictions: String,
) -> Result<RunSummary> {
    let raw = train::to_raw_units(&run.records, scaler, price_field)?;
    Ok(RunSummary {
        feature_set: set_name.to_string(),
        model: spec.label(),
        train_rows: run.train_rows,
        metrics: run.metrics,
        price_metrics: ForecastEvaluator::evaluate_records(&raw)?,
        coverage: interval_coverage(&run.records),
        predictions,
    })
}
