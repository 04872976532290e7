//! Feature derivation command.

use std::path::Path;

use anyhow::Result;
use sentcast::data;
use sentcast::features::FeatureEngineer;

use crate::config::PipelineConfig;

/// Derive lag and rolling features from a merged table.
pub(crate) fn derive_features(
    config: &PipelineConfig,
    input: &Path,
    output: &Path,
    feature_set: Option<&str>,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Feature Engineering                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let table = data::load_table(input)?;
    let features = config.feature_config(feature_set)?;

    println!("Input:     {} ({} rows)", input.display(), table.len());
    println!("Target:    {}", features.target_field);
    println!("Lags:      {}", features.lag_depth);
    println!("Window:    {}", features.rolling_window);
    println!("Warm-up:   {} rows", features.warmup_rows());

    let derived = FeatureEngineer::new(features.clone()).derive(&table)?;
    data::write_table(output, &derived)?;

    println!("\n━━━ Columns ━━━");
    for column in features.feature_columns() {
        println!("  {}", column);
    }
    println!("\nWrote {} rows to {}", derived.len(), output.display());
    Ok(())
}
