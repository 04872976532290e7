//! Side-by-side comparison of forecast files.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Result, bail};
use sentcast::Date;
use sentcast::data;
use sentcast::eval::{ForecastEvaluator, ForecastMetrics, ForecastRecord, interval_coverage};

/// One compared forecast file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComparisonRow {
    pub(crate) label: String,
    pub(crate) metrics: ForecastMetrics,
    pub(crate) coverage: Option<f64>,
}

/// Load forecast files and print their metrics in one table.
pub(crate) fn compare_forecasts(files: &[PathBuf], common: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                       Model Comparison                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    if files.is_empty() {
        bail!("no forecast files given");
    }

    let mut loaded = Vec::with_capacity(files.len());
    for path in files {
        let label = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        loaded.push((label, data::load_forecast_records(path)?));
    }

    if common {
        let dates = common_dates(loaded.iter().map(|(_, records)| records.as_slice()));
        println!("Restricted to {} common dates\n", dates.len());
        for (_, records) in &mut loaded {
            records.retain(|r| dates.contains(&r.date));
        }
    }

    let rows = loaded
        .iter()
        .map(|(label, records)| compare_row(label, records))
        .collect::<Result<Vec<_>>>()?;
    print_table(&rows);
    Ok(())
}

/// Metrics and interval coverage of one set of records.
pub(crate) fn compare_row(label: &str, records: &[ForecastRecord]) -> Result<ComparisonRow> {
    Ok(ComparisonRow {
        label: label.to_string(),
        metrics: ForecastEvaluator::evaluate_records(records)?,
        coverage: interval_coverage(records),
    })
}

/// Dates present in every record set.
pub(crate) fn common_dates<'a>(
    mut sets: impl Iterator<Item = &'a [ForecastRecord]>,
) -> BTreeSet<Date> {
    let Some(first) = sets.next() else {
        return BTreeSet::new();
    };
    let mut dates: BTreeSet<Date> = first.iter().map(|r| r.date).collect();
    for records in sets {
        let other: BTreeSet<Date> = records.iter().map(|r| r.date).collect();
        dates.retain(|d| other.contains(d));
    }
    dates
}

/// Print rows sorted by MAE, best first.
pub(crate) fn print_table(rows: &[ComparisonRow]) {
    let mut sorted: Vec<&ComparisonRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.metrics.mae.total_cmp(&b.metrics.mae));

    println!(
        "{:<24} {:>12} {:>12} {:>6} {:>10}",
        "Forecast", "MAE", "RMSE", "N", "Coverage"
    );
    println!("{}", "─".repeat(68));
    for row in sorted {
        let coverage = row
            .coverage
            .map_or_else(|| "-".to_string(), |c| format!("{:.1}%", c * 100.0));
        println!(
            "{:<24} {:>12.6} {:>12.6} {:>6} {:>10}",
            row.label, row.metrics.mae, row.metrics.rmse, row.metrics.n_obs, coverage
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2022, 10, day).unwrap()
    }

    #[test]
    fn test_common_dates() {
        let a = vec![
            ForecastRecord::new(d(3), 1.0, 1.0),
            ForecastRecord::new(d(4), 1.0, 1.0),
            ForecastRecord::new(d(5), 1.0, 1.0),
        ];
        let b = vec![
            ForecastRecord::new(d(4), 1.0, 1.0),
            ForecastRecord::new(d(5), 1.0, 1.0),
            ForecastRecord::new(d(6), 1.0, 1.0),
        ];
        let dates = common_dates([a.as_slice(), b.as_slice()].into_iter());
        assert_eq!(dates.into_iter().collect::<Vec<_>>(), vec![d(4), d(5)]);
    }

    #[test]
    fn test_compare_row() {
        let records = vec![
            ForecastRecord::new(d(3), 1.0, 1.5).with_bounds(0.5, 2.0),
            ForecastRecord::new(d(4), 2.0, 1.0).with_bounds(1.5, 3.0),
        ];
        let row = compare_row("ridge", &records).unwrap();
        assert_relative_eq!(row.metrics.mae, 0.75);
        assert_eq!(row.coverage, Some(1.0));
        assert!(compare_row("empty", &[]).is_err());
    }

    #[test]
    fn test_compare_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("ridge.csv");
        let b = dir.path().join("persistence.csv");
        data::write_forecast_records(
            &a,
            &[
                ForecastRecord::new(d(3), 1.0, 1.1).with_bounds(0.9, 1.3),
                ForecastRecord::new(d(4), 1.2, 1.1).with_bounds(0.9, 1.3),
            ],
        )
        .unwrap();
        data::write_forecast_records(&b, &[ForecastRecord::new(d(4), 1.2, 1.0)]).unwrap();

        compare_forecasts(&[a.clone(), b.clone()], true).unwrap();
        compare_forecasts(&[a, b], false).unwrap();
        assert!(compare_forecasts(&[], false).is_err());
    }
}
