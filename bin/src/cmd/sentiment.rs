//! Daily sentiment aggregation command.

use std::path::Path;

use anyhow::Result;
use sentcast::data;
use sentcast::sentiment::{AggregationReport, LexiconScorer, SentimentAggregator};

use crate::config::PipelineConfig;

/// Score a message file and write one mean score per date.
pub(crate) fn aggregate_sentiment(
    config: &PipelineConfig,
    input: &Path,
    output: &Path,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Sentiment Aggregation                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Input:     {}", input.display());
    println!("Columns:   {} / {}", config.message_date_column, config.message_text_column);
    println!("Parallel:  {}", config.aggregator.parallel);
    println!();

    let report = score_messages(config, input)?;
    data::write_daily_sentiment(output, &report.daily, &config.merge.sentiment_column)?;

    print_report(&report);
    println!("\nWrote {} days to {}", report.daily.len(), output.display());
    Ok(())
}

/// Load messages and aggregate them with the built-in lexicon scorer.
pub(crate) fn score_messages(config: &PipelineConfig, input: &Path) -> Result<AggregationReport> {
    let messages = data::load_messages(
        input,
        &config.message_date_column,
        &config.message_text_column,
    )?;
    let scorer = LexiconScorer::default();
    Ok(SentimentAggregator::new(config.aggregator.clone()).aggregate_messages(
        &messages,
        &scorer,
        config.score_reduction,
    ))
}

/// Print message counts and a sample of failures.
pub(crate) fn print_report(report: &AggregationReport) {
    println!("Messages:  {}", report.total);
    println!(
        "Scored:    {} ({:.1}%)",
        report.scored,
        report.success_rate() * 100.0
    );
    println!("Days:      {}", report.daily.len());

    if !report.failures.is_empty() {
        println!("\nFailed messages ({}):", report.failures.len());
        for failure in report.failures.iter().take(5) {
            println!("  row {:>6}  {}", failure.index, failure.reason);
        }
        if report.failures.len() > 5 {
            println!("  ... and {} more", report.failures.len() - 5);
        }
    }

    if let (Some((first, _)), Some((last, _))) =
        (report.daily.iter().next(), report.daily.iter().last())
    {
        println!("Range:     {} to {}", first, last);
    }
}
