//! Sentiment scoring and daily aggregation for sentcast.
//!
//! Raw messages are scored one by one through a
//! [`SentimentScorer`](sentcast_traits::SentimentScorer) or any scoring
//! closure, then averaged per calendar date into a [`DailySentiment`] series.
//! Messages that cannot be scored are reported, never silently dropped.
//!
//! # Example
//!
//! ```
//! use sentcast_sentiment::{AggregatorConfig, LexiconScorer, Message, SentimentAggregator};
//! use sentcast_traits::ScoreReduction;
//!
//! let messages = vec![
//!     Message::new("2022-10-03 09:15:00+00:00", "good"),
//!     Message::new("2022-10-03 17:40:00+00:00", "bad"),
//! ];
//! let report = SentimentAggregator::new(AggregatorConfig::default()).aggregate_messages(
//!     &messages,
//!     &LexiconScorer::default(),
//!     ScoreReduction::Polarity,
//! );
//! assert_eq!(report.daily.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod aggregator;
pub mod lexicon;
pub mod message;

pub use aggregator::{
    AggregationReport, AggregatorConfig, DailySentiment, MessageFailure, ScoringFailure,
    SentimentAggregator,
};
pub use lexicon::LexiconScorer;
pub use message::Message;
