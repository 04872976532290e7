//! Feature set listing command.

use sentcast::features::available_feature_sets;

/// List built-in feature sets.
pub(crate) fn list_feature_sets(verbose: bool) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Feature Sets                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    for set in available_feature_sets() {
        let marker = if set.uses_sentiment { "+sentiment" } else { "" };
        println!("  {:<14} {:<11} {}", set.name, marker, set.description);

        if verbose {
            println!("      target:   {}", set.config.target_field);
            println!("      lags:     {}", set.config.lag_depth);
            println!("      window:   {}", set.config.rolling_window);
            println!("      warm-up:  {} rows", set.config.warmup_rows());
            println!("      columns:  {}", set.feature_columns().join(", "));
            println!();
        }
    }
    println!();
}
