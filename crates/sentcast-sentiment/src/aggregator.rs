//! Daily sentiment aggregation.
//!
//! Every message is scored on its own first, sequentially or across a rayon
//! pool, and each outcome is recorded. Grouping by calendar date runs only
//! once all outcomes exist, so the daily means never depend on scheduling.
//! A message that cannot be dated or scored becomes a [`MessageFailure`] in
//! the report; it never aborts the batch and is never counted as neutral.

use std::collections::BTreeMap;

use rayon::prelude::*;
use sentcast_traits::{
    Date, Result, ScoreReduction, ScorerError, SentimentScorer, TimeSeriesTable,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::message::Message;

/// Why a single message produced no score.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFailure {
    /// The timestamp could not be reduced to a calendar date.
    #[error("unparseable timestamp")]
    UnparseableDate,

    /// The message has no text.
    #[error("missing text")]
    MissingText,

    /// The scorer rejected the text.
    #[error("scorer failed: {0}")]
    Scorer(String),

    /// The scorer returned NaN or infinity.
    #[error("non-finite score")]
    NonFinite,
}

impl From<ScorerError> for ScoringFailure {
    fn from(err: ScorerError) -> Self {
        match err {
            ScorerError::EmptyText => Self::MissingText,
            ScorerError::Unscorable(reason) => Self::Scorer(reason),
        }
    }
}

/// A failed message and its position in the input batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFailure {
    /// Index of the message in the input slice
    pub index: usize,
    /// Why it was not scored
    pub reason: ScoringFailure,
}

/// Mean sentiment per calendar date.
///
/// Only dates with at least one successfully scored message are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySentiment(BTreeMap<Date, f64>);

impl DailySentiment {
    /// Wrap an existing date map.
    pub const fn new(scores: BTreeMap<Date, f64>) -> Self {
        Self(scores)
    }

    /// The underlying map.
    pub const fn as_map(&self) -> &BTreeMap<Date, f64> {
        &self.0
    }

    /// Unwrap into the underlying map.
    pub fn into_inner(self) -> BTreeMap<Date, f64> {
        self.0
    }

    /// Score for `date`.
    pub fn get(&self, date: &Date) -> Option<f64> {
        self.0.get(date).copied()
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no date has a score.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(date, score)` in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.0.iter().map(|(d, s)| (*d, *s))
    }

    /// Single-column table of the scores.
    pub fn to_table(&self, column: &str) -> Result<TimeSeriesTable> {
        TimeSeriesTable::new(
            self.0.keys().copied().collect(),
            vec![(column.to_string(), self.0.values().copied().collect())],
        )
    }

    /// Read scores back from a table column.
    pub fn from_table(table: &TimeSeriesTable, column: &str) -> Result<Self> {
        let values = table.require_column(column)?;
        Ok(Self(
            table.dates().iter().copied().zip(values.iter().copied()).collect(),
        ))
    }
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationReport {
    /// Mean score per date
    pub daily: DailySentiment,
    /// Messages that could not be scored, in input order
    pub failures: Vec<MessageFailure>,
    /// Number of messages in the batch
    pub total: usize,
    /// Number of messages that contributed a score
    pub scored: usize,
}

impl AggregationReport {
    /// Fraction of messages that contributed a score, 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.scored as f64 / self.total as f64
        }
    }
}

/// Configuration for [`SentimentAggregator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Score messages on the rayon thread pool
    pub parallel: bool,
}

#[derive(Debug)]
struct ScoredMessage {
    index: usize,
    outcome: std::result::Result<(Date, f64), ScoringFailure>,
}

/// Groups per-message scores into daily means.
#[derive(Debug, Clone, Default)]
pub struct SentimentAggregator {
    config: AggregatorConfig,
}

impl SentimentAggregator {
    /// Create an aggregator.
    #[must_use]
    pub const fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Score every message and average the scores per calendar date.
    ///
    /// `date_extractor` maps a message to its calendar date (`None` when the
    /// timestamp is unparseable) and `score_fn` maps it to a scalar score.
    /// Messages are not scored when they cannot be dated.
    ///
    /// # Example
    ///
    /// ```
    /// use sentcast_sentiment::{AggregatorConfig, ScoringFailure, SentimentAggregator};
    /// use sentcast_traits::Date;
    ///
    /// let day = Date::from_ymd_opt(2022, 10, 3).unwrap();
    /// let messages = [(day, 0.8), (day, 0.2)];
    ///
    /// let report = SentimentAggregator::new(AggregatorConfig::default()).aggregate(
    ///     &messages,
    ///     |m| Some(m.0),
    ///     |m| Ok::<f64, ScoringFailure>(m.1),
    /// );
    /// assert!((report.daily.get(&day).unwrap() - 0.5).abs() < 1e-12);
    /// ```
    pub fn aggregate<M, D, S>(
        &self,
        messages: &[M],
        date_extractor: D,
        score_fn: S,
    ) -> AggregationReport
    where
        M: Sync,
        D: Fn(&M) -> Option<Date> + Sync,
        S: Fn(&M) -> std::result::Result<f64, ScoringFailure> + Sync,
    {
        let score_one = |(index, message): (usize, &M)| {
            let outcome = date_extractor(message)
                .ok_or(ScoringFailure::UnparseableDate)
                .and_then(|date| {
                    let score = score_fn(message)?;
                    if score.is_finite() {
                        Ok((date, score))
                    } else {
                        Err(ScoringFailure::NonFinite)
                    }
                });
            ScoredMessage { index, outcome }
        };

        let outcomes: Vec<ScoredMessage> = if self.config.parallel {
            messages.par_iter().enumerate().map(score_one).collect()
        } else {
            messages.iter().enumerate().map(score_one).collect()
        };
        debug!(
            messages = messages.len(),
            parallel = self.config.parallel,
            "scored messages"
        );

        let mut sums: BTreeMap<Date, (f64, usize)> = BTreeMap::new();
        let mut failures = Vec::new();
        for scored in outcomes {
            match scored.outcome {
                Ok((date, score)) => {
                    let entry = sums.entry(date).or_insert((0.0, 0));
                    entry.0 += score;
                    entry.1 += 1;
                }
                Err(reason) => {
                    warn!(index = scored.index, %reason, "message not scored");
                    failures.push(MessageFailure {
                        index: scored.index,
                        reason,
                    });
                }
            }
        }

        let scored = messages.len() - failures.len();
        let daily = DailySentiment(
            sums.into_iter()
                .map(|(date, (sum, count))| (date, sum / count as f64))
                .collect(),
        );

        info!(
            messages = messages.len(),
            scored,
            failed = failures.len(),
            days = daily.len(),
            "aggregated daily sentiment"
        );

        AggregationReport {
            daily,
            failures,
            total: messages.len(),
            scored,
        }
    }

    /// Aggregate [`Message`]s with a [`SentimentScorer`].
    ///
    /// Each score is reduced to a scalar with `reduction` before averaging.
    pub fn aggregate_messages<S>(
        &self,
        messages: &[Message],
        scorer: &S,
        reduction: ScoreReduction,
    ) -> AggregationReport
    where
        S: SentimentScorer + ?Sized,
    {
        self.aggregate(messages, Message::date, |message| {
            let text = message.text().ok_or(ScoringFailure::MissingText)?;
            scorer
                .score(text)?
                .reduce(reduction)
                .ok_or(ScoringFailure::NonFinite)
        })
    }
}
