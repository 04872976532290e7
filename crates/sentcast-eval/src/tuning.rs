//! Hyperparameter search over expanding-window folds.
//!
//! Each candidate is an independent trial with its own model instance; the
//! feature matrix and target are shared read-only, so trials run on the rayon
//! pool without coordination. A failing trial is recorded with its error and
//! ranked last.

use std::cmp::Ordering;
use std::fmt::Debug;

use rayon::prelude::*;
use sentcast_traits::{FeatureMatrix, ForecastModel, Result, SentcastError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::evaluator::ForecastEvaluator;
use crate::split::{Split, WalkForwardSplitter};

/// Configuration for [`GridSearch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Number of expanding-window folds (default: 5)
    pub folds: usize,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self { folds: 5 }
    }
}

/// Result of evaluating one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult<C> {
    /// The candidate evaluated
    pub candidate: C,
    /// Validation MAE per fold; empty if the trial failed
    pub fold_mae: Vec<f64>,
    /// Mean validation MAE over folds
    pub mean_mae: Option<f64>,
    /// Error that aborted the trial
    pub error: Option<String>,
}

impl<C> TrialResult<C> {
    /// Whether the trial completed every fold.
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn rank(&self, other: &Self) -> Ordering {
        match (self.mean_mae, other.mean_mae) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// All trials of a search, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningReport<C> {
    /// Number of folds each trial was evaluated on
    pub folds: usize,
    /// Trials sorted by mean validation MAE; failed trials last
    pub trials: Vec<TrialResult<C>>,
}

impl<C> TuningReport<C> {
    /// Best successful trial.
    pub fn best(&self) -> Option<&TrialResult<C>> {
        self.trials.first().filter(|t| t.is_ok())
    }

    /// Trials that failed.
    pub fn failures(&self) -> impl Iterator<Item = &TrialResult<C>> {
        self.trials.iter().filter(|t| !t.is_ok())
    }
}

/// Exhaustive search over a list of candidates.
#[derive(Debug, Clone, Default)]
pub struct GridSearch {
    config: TuningConfig,
}

fn cross_validate(
    model: &mut dyn ForecastModel,
    matrix: &FeatureMatrix,
    target: &[f64],
    folds: &[Split],
) -> Result<Vec<f64>> {
    folds
        .iter()
        .map(|split| {
            let train = matrix.rows(split.train_range());
            model.fit(&train, &target[split.train_range()])?;
            let predictions = model.predict(&matrix.rows(split.test_range()))?;
            Ok(ForecastEvaluator::evaluate(&target[split.test_range()], &predictions)?.mae)
        })
        .collect()
}

impl GridSearch {
    /// Create a search.
    #[must_use]
    pub const fn new(config: TuningConfig) -> Self {
        Self { config }
    }

    /// Evaluate every candidate and rank them by mean validation MAE.
    ///
    /// `factory` builds a fresh model for a candidate. Row `i` of `matrix`
    /// predicts `target[i]`.
    ///
    /// # Errors
    ///
    /// Fails only on structural problems shared by all trials: no candidates,
    /// a misaligned target, or too few rows for the folds. Per-trial errors are
    /// recorded in the report.
    pub fn run<C, F>(
        &self,
        candidates: &[C],
        factory: F,
        matrix: &FeatureMatrix,
        target: &[f64],
    ) -> Result<TuningReport<C>>
    where
        C: Clone + Debug + Send + Sync,
        F: Fn(&C) -> Box<dyn ForecastModel> + Sync,
    {
        if candidates.is_empty() {
            return Err(SentcastError::InvalidConfig(
                "grid search needs at least one candidate".to_string(),
            ));
        }
        if target.len() != matrix.nrows() {
            return Err(SentcastError::LengthMismatch {
                stage: "grid search",
                expected: matrix.nrows(),
                actual: target.len(),
            });
        }
        let folds = WalkForwardSplitter::fold_bounds(matrix.nrows(), self.config.folds)?;

        let mut trials: Vec<TrialResult<C>> = candidates
            .par_iter()
            .map(|candidate| {
                let mut model = factory(candidate);
                match cross_validate(model.as_mut(), matrix, target, &folds) {
                    Ok(fold_mae) => {
                        let mean_mae = fold_mae.iter().sum::<f64>() / fold_mae.len() as f64;
                        TrialResult {
                            candidate: candidate.clone(),
                            fold_mae,
                            mean_mae: Some(mean_mae),
                            error: None,
                        }
                    }
                    Err(err) => {
                        warn!(?candidate, error = %err, "tuning trial failed");
                        TrialResult {
                            candidate: candidate.clone(),
                            fold_mae: Vec::new(),
                            mean_mae: None,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect();
        trials.sort_by(TrialResult::rank);

        let report = TuningReport {
            folds: folds.len(),
            trials,
        };
        info!(
            candidates = candidates.len(),
            folds = report.folds,
            failed = report.failures().count(),
            best_mae = report.best().and_then(|t| t.mean_mae),
            "grid search finished"
        );
        Ok(report)
    }
}
