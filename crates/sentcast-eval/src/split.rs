//! Walk-forward train/test splitting.
//!
//! Splits never shuffle: the training side is always a prefix of the table
//! and the evaluation side the rows immediately after it, so no training row
//! is dated after an evaluation row.

use std::ops::Range;

use sentcast_traits::{Result, SentcastError, TimeSeriesTable};
use serde::{Deserialize, Serialize};

/// Row boundaries of one chronological split.
///
/// Training rows are `[0, train_end)`, evaluation rows `[train_end, test_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// End (exclusive) of the training prefix
    pub train_end: usize,
    /// End (exclusive) of the evaluation block
    pub test_end: usize,
}

impl Split {
    /// Training row range.
    pub const fn train_range(&self) -> Range<usize> {
        0..self.train_end
    }

    /// Evaluation row range.
    pub const fn test_range(&self) -> Range<usize> {
        self.train_end..self.test_end
    }

    /// Number of training rows.
    pub const fn train_len(&self) -> usize {
        self.train_end
    }

    /// Number of evaluation rows.
    pub const fn test_len(&self) -> usize {
        self.test_end - self.train_end
    }

    fn apply(&self, table: &TimeSeriesTable) -> (TimeSeriesTable, TimeSeriesTable) {
        (table.slice(self.train_range()), table.slice(self.test_range()))
    }
}

/// Chronological hold-out and expanding-window splits.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkForwardSplitter;

fn holdout_size(n: usize, test_fraction: f64) -> usize {
    (test_fraction * n as f64).round() as usize
}

/// Smallest row count for which both sides of a hold-out split are non-empty.
///
/// `round(f * n) >= 1` needs `f * n >= 0.5` and `round(f * n) <= n - 1` needs
/// `(1 - f) * n > 0.5`. The estimate is checked one row either side for float
/// error and saturates at `usize::MAX` when no row count qualifies.
fn min_rows_for_holdout(test_fraction: f64) -> usize {
    let lower = (0.5 / test_fraction).ceil();
    let upper = (0.5 / (1.0 - test_fraction)).floor() + 1.0;
    let estimate = lower.max(upper).max(2.0) as usize;
    (estimate.saturating_sub(1)..=estimate.saturating_add(1))
        .find(|&n| n >= 2 && (1..n).contains(&holdout_size(n, test_fraction)))
        .unwrap_or(estimate)
}

impl WalkForwardSplitter {
    /// Bounds of a hold-out split of `n` rows.
    ///
    /// The evaluation block is the last `round(test_fraction * n)` rows.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::InvalidConfig`] unless `0 < test_fraction < 1`
    /// and [`SentcastError::InsufficientData`] if either side would be empty.
    pub fn split_bounds(n: usize, test_fraction: f64) -> Result<Split> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(SentcastError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {test_fraction}"
            )));
        }
        let test = holdout_size(n, test_fraction);
        if test == 0 || test >= n {
            return Err(SentcastError::InsufficientData {
                stage: "walk-forward split",
                rows: n,
                required: min_rows_for_holdout(test_fraction),
            });
        }
        Ok(Split {
            train_end: n - test,
            test_end: n,
        })
    }

    /// Bounds of `k` expanding-window folds over `n` rows.
    ///
    /// Each validation block has `n / (k + 1)` rows; the first training prefix
    /// takes every row before the `k` blocks, and each later fold trains on
    /// the previous fold's training and validation rows.
    ///
    /// # Errors
    ///
    /// Returns [`SentcastError::InvalidConfig`] for `k == 0` and
    /// [`SentcastError::InsufficientData`] when `n < k + 1`.
    pub fn fold_bounds(n: usize, k: usize) -> Result<Vec<Split>> {
        if k == 0 {
            return Err(SentcastError::InvalidConfig(
                "number of folds must be >= 1".to_string(),
            ));
        }
        let block = n / (k + 1);
        if block == 0 {
            return Err(SentcastError::InsufficientData {
                stage: "k-fold split",
                rows: n,
                required: k + 1,
            });
        }
        let first_train = n - k * block;
        Ok((0..k)
            .map(|i| {
                let train_end = first_train + i * block;
                Split {
                    train_end,
                    test_end: train_end + block,
                }
            })
            .collect())
    }

    /// Split a table into a training prefix and an evaluation suffix.
    ///
    /// # Example
    ///
    /// ```
    /// use sentcast_eval::WalkForwardSplitter;
    /// use sentcast_traits::{Date, TimeSeriesTable};
    ///
    /// let dates = (1..=10).map(|d| Date::from_ymd_opt(2024, 1, d).unwrap()).collect();
    /// let table =
    ///     TimeSeriesTable::new(dates, vec![("x".to_string(), (0..10).map(f64::from).collect())])
    ///         .unwrap();
    ///
    /// let (train, test) = WalkForwardSplitter::split(&table, 0.2).unwrap();
    /// assert_eq!((train.len(), test.len()), (8, 2));
    /// ```
    pub fn split(
        table: &TimeSeriesTable,
        test_fraction: f64,
    ) -> Result<(TimeSeriesTable, TimeSeriesTable)> {
        Ok(Self::split_bounds(table.len(), test_fraction)?.apply(table))
    }

    /// Expanding-window folds as `(train, validation)` table pairs.
    pub fn kfold(
        table: &TimeSeriesTable,
        k: usize,
    ) -> Result<Vec<(TimeSeriesTable, TimeSeriesTable)>> {
        Ok(Self::fold_bounds(table.len(), k)?
            .iter()
            .map(|split| split.apply(table))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentcast_traits::Date;

    fn table(n: usize) -> TimeSeriesTable {
        let start = Date::from_ymd_opt(2023, 1, 1).unwrap();
        let dates = (0..n as u64)
            .map(|i| start + chrono::Days::new(i))
            .collect();
        TimeSeriesTable::new(
            dates,
            vec![("x".to_string(), (0..n).map(|i| i as f64).collect())],
        )
        .unwrap()
    }

    #[test]
    fn test_ten_rows_twenty_percent() {
        let (train, test) = WalkForwardSplitter::split(&table(10), 0.2).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert!(train.dates().last().unwrap() < test.dates().first().unwrap());
        assert_eq!(test.column("x").unwrap(), &[8.0, 9.0]);
    }

    #[test]
    fn test_holdout_rounds() {
        // 0.2 * 13 = 2.6 rounds to 3
        let split = WalkForwardSplitter::split_bounds(13, 0.2).unwrap();
        assert_eq!(split.test_len(), 3);
        assert_eq!(split.train_len(), 10);
    }

    #[test]
    fn test_holdout_errors() {
        assert!(matches!(
            WalkForwardSplitter::split_bounds(10, 0.0),
            Err(SentcastError::InvalidConfig(_))
        ));
        assert!(matches!(
            WalkForwardSplitter::split_bounds(10, 1.0),
            Err(SentcastError::InvalidConfig(_))
        ));
        assert!(matches!(
            WalkForwardSplitter::split_bounds(2, 0.2),
            Err(SentcastError::InsufficientData { rows: 2, required: 3, .. })
        ));
        assert!(matches!(
            WalkForwardSplitter::split_bounds(1, 0.5),
            Err(SentcastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_required_rows_at_extreme_fractions() {
        // no representable row count yields a non-empty block
        assert!(matches!(
            WalkForwardSplitter::split_bounds(10, 1e-300),
            Err(SentcastError::InsufficientData { rows: 10, required: usize::MAX, .. })
        ));

        let near_one = 0.9999999999999999;
        let required = match WalkForwardSplitter::split_bounds(10, near_one) {
            Err(SentcastError::InsufficientData { required, .. }) => required,
            other => panic!("expected InsufficientData, got {other:?}"),
        };
        assert!(required > 10);
        let split = WalkForwardSplitter::split_bounds(required, near_one).unwrap();
        assert!(split.train_len() >= 1 && split.test_len() >= 1);
        assert!(WalkForwardSplitter::split_bounds(required - 1, near_one).is_err());
    }

    #[test]
    fn test_required_rows_match_search() {
        for fraction in [0.01, 0.1, 0.2, 0.25, 0.3, 0.5, 0.7, 0.9, 0.99] {
            let smallest = (2..1000)
                .find(|&n| WalkForwardSplitter::split_bounds(n, fraction).is_ok())
                .unwrap();
            assert_eq!(min_rows_for_holdout(fraction), smallest, "fraction {fraction}");
        }
    }

    #[test]
    fn test_fold_sizes() {
        // 23 rows, 5 folds: block 3, first training prefix 8
        let folds = WalkForwardSplitter::fold_bounds(23, 5).unwrap();
        assert_eq!(folds.len(), 5);
        assert_eq!(
            folds[0],
            Split {
                train_end: 8,
                test_end: 11
            }
        );
        assert_eq!(folds[4].test_end, 23);
        assert!(folds.iter().all(|s| s.test_len() == 3));
    }

    #[test]
    fn test_folds_expand() {
        let folds = WalkForwardSplitter::kfold(&table(30), 4).unwrap();
        for pair in folds.windows(2) {
            let (train, validation) = &pair[0];
            let (next_train, _) = &pair[1];
            assert_eq!(next_train.len(), train.len() + validation.len());
            assert_eq!(&next_train.dates()[..train.len()], train.dates());
            assert_eq!(&next_train.dates()[train.len()..], validation.dates());
        }
        for (train, validation) in &folds {
            assert!(train.dates().last() < validation.dates().first());
        }
    }

    #[test]
    fn test_fold_errors() {
        assert!(matches!(
            WalkForwardSplitter::fold_bounds(10, 0),
            Err(SentcastError::InvalidConfig(_))
        ));
        assert!(matches!(
            WalkForwardSplitter::fold_bounds(4, 5),
            Err(SentcastError::InsufficientData { required: 6, .. })
        ));
    }
}
