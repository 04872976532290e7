//! Price and sentiment merge command.

use std::path::Path;

use anyhow::Result;
use sentcast::data;
use sentcast::features::{NormalizedTable, merge_and_normalize};
use sentcast::sentiment::DailySentiment;

use crate::config::PipelineConfig;

/// Join a price file with a daily sentiment file and write the scaled table.
pub(crate) fn merge_files(
    config: &PipelineConfig,
    prices: &Path,
    sentiment: &Path,
    output: &Path,
    scaler_out: Option<&Path>,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Merge & Normalize                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let daily = data::load_daily_sentiment(
        sentiment,
        sentcast::traits::types::DATE_COLUMN,
        &config.merge.sentiment_column,
    )?;
    let merged = merge_prices(config, prices, &daily)?;

    data::write_table(output, &merged.table)?;
    println!("Wrote {} rows to {}", merged.table.len(), output.display());

    if let Some(path) = scaler_out {
        data::save_scaler(path, &merged.scaler)?;
        println!("Wrote scaler to {}", path.display());
    }
    Ok(())
}

/// Load prices and merge them with daily sentiment, printing the scaled ranges.
pub(crate) fn merge_prices(
    config: &PipelineConfig,
    prices: &Path,
    daily: &DailySentiment,
) -> Result<NormalizedTable> {
    let price_table =
        data::load_price_table(prices, &config.price_date_column, &[&config.price_column])?;
    println!("Prices:    {} rows", price_table.len());
    println!("Sentiment: {} days", daily.len());

    let merged = merge_and_normalize(
        &price_table,
        daily.as_map(),
        &config.scaled_fields(),
        &config.merge,
    )?;
    println!("Merged:    {} rows\n", merged.table.len());

    println!("{:<14} {:>12} {:>12}", "Field", "Min", "Max");
    println!("{}", "─".repeat(40));
    for range in merged.scaler.ranges() {
        println!("{:<14} {:>12.4} {:>12.4}", range.field, range.min, range.max);
    }
    println!();
    Ok(merged)
}
