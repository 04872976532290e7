//! Hyperparameter tuning command.

use std::path::Path;

use anyhow::Result;
use sentcast::TimeSeriesTable;
use sentcast::data;
use sentcast::eval::{GridSearch, TuningConfig, TuningReport, WalkForwardSplitter};
use sentcast::features::{FeatureConfig, FeatureEngineer, TARGET_COLUMN};
use sentcast::models::{ModelSpec, ridge_alpha_grid};

use crate::config::PipelineConfig;

/// Search the ridge penalty grid on a merged table.
pub(crate) fn tune_model(
    config: &PipelineConfig,
    input: &Path,
    feature_set: Option<&str>,
    folds: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Hyperparameter Tuning                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let table = data::load_table(input)?;
    let features = config.feature_config(feature_set)?;
    let tuning = TuningConfig {
        folds: folds.unwrap_or(config.tuning.folds),
    };

    println!("Input:     {} ({} rows)", input.display(), table.len());
    println!("Folds:     {}", tuning.folds);

    let report = search_ridge(config, &table, &features, &tuning)?;
    print_ranking(&report);

    if let Some(path) = output {
        data::save_json(path, &report)?;
        println!("\nWrote tuning report to {}", path.display());
    }
    Ok(())
}

/// Grid-search ridge penalties on the training prefix of the derived table.
///
/// The hold-out block used by `train` never enters a fold.
pub(crate) fn search_ridge(
    config: &PipelineConfig,
    table: &TimeSeriesTable,
    features: &FeatureConfig,
    tuning: &TuningConfig,
) -> Result<TuningReport<ModelSpec>> {
    let derived = FeatureEngineer::new(features.clone()).derive(table)?;
    let (train, _) = WalkForwardSplitter::split(&derived, config.test_fraction)?;
    println!("Training:  {} rows\n", train.len());

    let matrix = train.feature_matrix(&features.feature_columns())?;
    let target = train.require_column(TARGET_COLUMN)?;
    let report = GridSearch::new(tuning.clone()).run(
        &ridge_alpha_grid(),
        ModelSpec::build,
        &matrix,
        target,
    )?;
    Ok(report)
}

/// Print trials best first.
pub(crate) fn print_ranking(report: &TuningReport<ModelSpec>) {
    println!("{:<4} {:<22} {:>12}", "Rank", "Candidate", "Mean MAE");
    println!("{}", "─".repeat(40));
    for (rank, trial) in report.trials.iter().enumerate() {
        match (trial.mean_mae, &trial.error) {
            (Some(mae), _) => println!(
                "{:<4} {:<22} {:>12.6}",
                rank + 1,
                trial.candidate.label(),
                mae
            ),
            (None, error) => println!(
                "{:<4} {:<22} {:>12}  {}",
                rank + 1,
                trial.candidate.label(),
                "failed",
                error.as_deref().unwrap_or("")
            ),
        }
    }

    if let Some(best) = report.best() {
        println!("\nBest: {}", best.candidate.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentcast::Date;

    #[test]
    fn test_search_ridge_ranks_all_alphas() {
        let n = 80;
        let start = Date::from_ymd_opt(2022, 1, 3).unwrap();
        let close: Vec<f64> = (0..n).map(|i| 0.5 + 0.4 * (i as f64 * 0.2).sin()).collect();
        let table = TimeSeriesTable::new(
            start.iter_days().take(n).collect(),
            vec![("close_norm".to_string(), close)],
        )
        .unwrap();
        let config = PipelineConfig::default();
        let features = config.feature_config(Some("price_only")).unwrap();

        let report = search_ridge(&config, &table, &features, &TuningConfig { folds: 3 }).unwrap();
        assert_eq!(report.folds, 3);
        assert_eq!(report.trials.len(), ridge_alpha_grid().len());
        assert!(report.best().is_some());

        let maes: Vec<f64> = report.trials.iter().filter_map(|t| t.mean_mae).collect();
        assert!(maes.windows(2).all(|w| w[0] <= w[1]));
    }
}
