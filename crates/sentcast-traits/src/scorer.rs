//! Sentiment scorer trait and score types.
//!
//! A scorer turns one message's text into a [`SentimentScore`]. Lexicon
//! lookups and pretrained classifiers both fit behind [`SentimentScorer`];
//! the aggregation stage only sees the scalar chosen by a [`ScoreReduction`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The raw output of a sentiment scorer for one message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentScore {
    /// A single compound polarity value in [-1, 1].
    Polarity(f64),
    /// A probability distribution over negative, neutral and positive.
    Distribution {
        /// Probability of the negative class.
        negative: f64,
        /// Probability of the neutral class.
        neutral: f64,
        /// Probability of the positive class.
        positive: f64,
    },
}

/// How a [`SentimentScore`] is reduced to the scalar that gets aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreReduction {
    /// Signed polarity: polarity values as-is, distributions as
    /// `positive - negative`.
    #[default]
    Polarity,
    /// Probability of the positive class; polarity values are mapped from
    /// [-1, 1] to [0, 1].
    Positive,
}

impl SentimentScore {
    /// Reduce to a scalar, `None` if the score holds a non-finite value.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentcast_traits::{ScoreReduction, SentimentScore};
    ///
    /// let score = SentimentScore::Distribution { negative: 0.1, neutral: 0.3, positive: 0.6 };
    /// assert_eq!(score.reduce(ScoreReduction::Positive), Some(0.6));
    /// assert!((score.reduce(ScoreReduction::Polarity).unwrap() - 0.5).abs() < 1e-12);
    /// ```
    pub fn reduce(&self, reduction: ScoreReduction) -> Option<f64> {
        let value = match (*self, reduction) {
            (Self::Polarity(p), ScoreReduction::Polarity) => p,
            (Self::Polarity(p), ScoreReduction::Positive) => (p + 1.0) / 2.0,
            (Self::Distribution { negative, positive, .. }, ScoreReduction::Polarity) => {
                positive - negative
            }
            (Self::Distribution { positive, .. }, ScoreReduction::Positive) => positive,
        };
        value.is_finite().then_some(value)
    }
}

/// Why a scorer could not score a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScorerError {
    /// The message has no text, or only whitespace.
    #[error("empty text")]
    EmptyText,

    /// The scorer rejected the text.
    #[error("unscorable text: {0}")]
    Unscorable(String),
}

/// Scores the sentiment of a single piece of text.
///
/// Implementations must be thread-safe so messages can be scored in parallel.
///
/// # Example
///
/// ```
/// use sentcast_traits::{ScorerError, SentimentScore, SentimentScorer};
///
/// struct ExclamationScorer;
///
/// impl SentimentScorer for ExclamationScorer {
///     fn name(&self) -> &str {
///         "exclamation"
///     }
///
///     fn score(&self, text: &str) -> Result<SentimentScore, ScorerError> {
///         if text.trim().is_empty() {
///             return Err(ScorerError::EmptyText);
///         }
///         Ok(SentimentScore::Polarity(if text.ends_with('!') { 1.0 } else { 0.0 }))
///     }
/// }
///
/// assert_eq!(ExclamationScorer.score("wow!"), Ok(SentimentScore::Polarity(1.0)));
/// ```
pub trait SentimentScorer: Send + Sync {
    /// Returns the name of this scorer.
    fn name(&self) -> &str;

    /// Score one message.
    ///
    /// # Errors
    ///
    /// Returns a [`ScorerError`] for empty or otherwise unscorable text. The
    /// caller treats this as a soft, per-message failure.
    fn score(&self, text: &str) -> Result<SentimentScore, ScorerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reduce_polarity() {
        let score = SentimentScore::Polarity(-0.4);
        assert_relative_eq!(score.reduce(ScoreReduction::Polarity).unwrap(), -0.4);
        assert_relative_eq!(score.reduce(ScoreReduction::Positive).unwrap(), 0.3);
    }

    #[test]
    fn test_reduce_distribution() {
        let score = SentimentScore::Distribution {
            negative: 0.7,
            neutral: 0.2,
            positive: 0.1,
        };
        assert_relative_eq!(score.reduce(ScoreReduction::Polarity).unwrap(), -0.6);
        assert_relative_eq!(score.reduce(ScoreReduction::Positive).unwrap(), 0.1);
    }

    #[test]
    fn test_reduce_rejects_nan() {
        let score = SentimentScore::Polarity(f64::NAN);
        assert!(score.reduce(ScoreReduction::Polarity).is_none());
    }

    #[test]
    fn test_scorer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn SentimentScorer>>();
    }
}
