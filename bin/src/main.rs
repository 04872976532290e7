//! Sentcast CLI binary.
//!
//! Provides command-line interface for the sentcast forecasting pipeline.

mod cmd;
mod config;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::evaluate::EvaluateOptions;
use cmd::train::TrainOptions;
use config::PipelineConfig;

#[derive(Parser)]
#[command(name = "sentcast")]
#[command(about = "Sentiment-enriched stock price forecasting", long_about = None)]
#[command(version)]
struct Cli {
    /// Pipeline configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score messages and average them per calendar date
    Sentiment {
        /// Message CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV of daily sentiment
        #[arg(short, long)]
        output: PathBuf,

        /// Timestamp column of the message file
        #[arg(long)]
        date_column: Option<String>,

        /// Text column of the message file
        #[arg(long)]
        text_column: Option<String>,

        /// Score messages on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Join prices with daily sentiment and scale to [0, 1]
    Merge {
        /// Price CSV file
        #[arg(long)]
        prices: PathBuf,

        /// Daily sentiment CSV file
        #[arg(long)]
        sentiment: PathBuf,

        /// Output CSV of the merged table
        #[arg(short, long)]
        output: PathBuf,

        /// Write the fitted scaler ranges as JSON
        #[arg(long)]
        scaler_out: Option<PathBuf>,
    },

    /// Derive lag and rolling features from a merged table
    Features {
        /// Merged table CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV of the feature table
        #[arg(short, long)]
        output: PathBuf,

        /// Feature set name
        #[arg(short, long)]
        feature_set: Option<String>,
    },

    /// Fit a model on the training prefix and forecast the hold-out block
    Train {
        /// Merged table CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Feature set name
        #[arg(short, long)]
        feature_set: Option<String>,

        /// Model (ridge or persistence)
        #[arg(short, long)]
        model: Option<String>,

        /// Ridge penalty
        #[arg(long)]
        alpha: Option<f64>,

        /// Fraction of rows held out
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Output CSV of forecast records
        #[arg(short, long)]
        output: PathBuf,

        /// Scaler JSON; forecasts are written in raw units when given
        #[arg(long)]
        scaler: Option<PathBuf>,

        /// Scaled field the forecasts are mapped back from
        #[arg(long, default_value = "close")]
        field: String,
    },

    /// Search ridge penalties with expanding-window folds
    Tune {
        /// Merged table CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Feature set name
        #[arg(short, long)]
        feature_set: Option<String>,

        /// Number of folds
        #[arg(long)]
        folds: Option<usize>,

        /// Write the tuning report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare a forecast column with actual values
    Evaluate {
        /// CSV holding the actual values
        #[arg(long)]
        actual: PathBuf,

        /// Column of actual values
        #[arg(long, default_value = "close_norm")]
        actual_column: String,

        /// CSV holding the forecasts
        #[arg(long)]
        predicted: PathBuf,

        /// Column of forecasts
        #[arg(long, default_value = "predicted_value")]
        predicted_column: String,

        /// Date column joining the two files
        #[arg(long, default_value = "date")]
        key: String,
    },

    /// Compare forecast files side by side
    Compare {
        /// Forecast record CSV files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only compare dates present in every file
        #[arg(long)]
        common: bool,
    },

    /// Run the full pipeline from raw prices and messages
    Run {
        /// Price CSV file
        #[arg(long)]
        prices: PathBuf,

        /// Message CSV file
        #[arg(long)]
        tweets: PathBuf,

        /// Directory for all artifacts
        #[arg(short, long, default_value = "out")]
        output_dir: PathBuf,
    },

    /// List available feature sets
    FeatureSets {
        /// Show derivation details
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "sentcast=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Sentiment {
            input,
            output,
            date_column,
            text_column,
            parallel,
        } => {
            if let Some(column) = date_column {
                config.message_date_column = column;
            }
            if let Some(column) = text_column {
                config.message_text_column = column;
            }
            config.aggregator.parallel |= parallel;
            cmd::sentiment::aggregate_sentiment(&config, &input, &output)?;
        }
        Commands::Merge {
            prices,
            sentiment,
            output,
            scaler_out,
        } => {
            cmd::merge::merge_files(
                &config,
                &prices,
                &sentiment,
                &output,
                scaler_out.as_deref(),
            )?;
        }
        Commands::Features {
            input,
            output,
            feature_set,
        } => {
            cmd::features::derive_features(&config, &input, &output, feature_set.as_deref())?;
        }
        Commands::Train {
            input,
            feature_set,
            model,
            alpha,
            test_fraction,
            output,
            scaler,
            field,
        } => {
            let options = TrainOptions {
                feature_set: feature_set.as_deref(),
                model: model.as_deref(),
                alpha,
                test_fraction,
                scaler: scaler.as_deref(),
                field: &field,
            };
            cmd::train::train_model(&config, &input, &output, &options)?;
        }
        Commands::Tune {
            input,
            feature_set,
            folds,
            output,
        } => {
            cmd::tune::tune_model(
                &config,
                &input,
                feature_set.as_deref(),
                folds,
                output.as_deref(),
            )?;
        }
        Commands::Evaluate {
            actual,
            actual_column,
            predicted,
            predicted_column,
            key,
        } => {
            let options = EvaluateOptions {
                actual_column: &actual_column,
                predicted_column: &predicted_column,
                key: &key,
            };
            cmd::evaluate::evaluate_forecast(&actual, &predicted, &options)?;
        }
        Commands::Compare { files, common } => {
            cmd::compare::compare_forecasts(&files, common)?;
        }
        Commands::Run {
            prices,
            tweets,
            output_dir,
        } => {
            cmd::run::run_pipeline(&config, &prices, &tweets, &output_dir)?;
        }
        Commands::FeatureSets { verbose } => {
            cmd::feature_sets::list_feature_sets(verbose);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_evaluate_defaults() {
        let cli = Cli::parse_from([
            "sentcast",
            "evaluate",
            "--actual",
            "merged.csv",
            "--predicted",
            "preds.csv",
        ]);
        match cli.command {
            Commands::Evaluate {
                actual_column,
                predicted_column,
                key,
                ..
            } => {
                assert_eq!(actual_column, "close_norm");
                assert_eq!(predicted_column, "predicted_value");
                assert_eq!(key, "date");
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["sentcast", "feature-sets", "--config", "pipeline.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("pipeline.json")));
        assert!(matches!(cli.command, Commands::FeatureSets { verbose: false }));
    }
}
