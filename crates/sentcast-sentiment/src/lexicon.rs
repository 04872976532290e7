//! Lexicon-based sentiment scorer.
//!
//! Scores text as the mean valence of the words it finds in a small
//! finance/social lexicon. A negation word flips the valence of the next
//! matched word. Text with no lexicon word scores a neutral 0.0; empty text is
//! an error so it can be reported instead of counted as neutral.

use std::collections::{HashMap, HashSet};

use sentcast_traits::{ScorerError, SentimentScore, SentimentScorer};

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("good", 1.0),
    ("great", 1.0),
    ("excellent", 1.0),
    ("love", 0.9),
    ("bullish", 0.9),
    ("moon", 0.7),
    ("surge", 0.7),
    ("surges", 0.7),
    ("soar", 0.8),
    ("soars", 0.8),
    ("rally", 0.7),
    ("rallies", 0.7),
    ("beat", 0.5),
    ("beats", 0.5),
    ("gain", 0.5),
    ("gains", 0.5),
    ("profit", 0.5),
    ("profits", 0.5),
    ("buy", 0.4),
    ("long", 0.3),
    ("up", 0.3),
    ("strong", 0.6),
    ("growth", 0.5),
    ("upgrade", 0.6),
    ("record", 0.4),
    ("win", 0.6),
    ("happy", 0.7),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bad", -1.0),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("hate", -0.9),
    ("bearish", -0.9),
    ("crash", -0.9),
    ("crashes", -0.9),
    ("plunge", -0.8),
    ("plunges", -0.8),
    ("dump", -0.7),
    ("dumps", -0.7),
    ("miss", -0.5),
    ("misses", -0.5),
    ("loss", -0.6),
    ("losses", -0.6),
    ("sell", -0.4),
    ("short", -0.3),
    ("down", -0.3),
    ("weak", -0.6),
    ("recall", -0.6),
    ("downgrade", -0.6),
    ("lawsuit", -0.6),
    ("fraud", -0.9),
    ("scam", -0.9),
    ("overvalued", -0.5),
    ("fear", -0.6),
    ("sad", -0.7),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "dont", "don't", "isnt", "isn't", "wont", "won't", "cant", "can't",
    "aint", "ain't", "without",
];

/// Scores text by averaging word valences from a lexicon.
///
/// # Example
///
/// ```
/// use sentcast_sentiment::LexiconScorer;
/// use sentcast_traits::{SentimentScore, SentimentScorer};
///
/// let scorer = LexiconScorer::default();
/// assert_eq!(scorer.score("good").unwrap(), SentimentScore::Polarity(1.0));
/// assert_eq!(scorer.score("not good").unwrap(), SentimentScore::Polarity(-1.0));
/// assert_eq!(scorer.score("the stock").unwrap(), SentimentScore::Polarity(0.0));
/// ```
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        let valences = POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS)
            .map(|(word, valence)| ((*word).to_string(), *valence))
            .collect();
        let negations = NEGATIONS.iter().map(|w| (*w).to_string()).collect();
        Self {
            valences,
            negations,
        }
    }
}

impl LexiconScorer {
    /// Scorer with an empty lexicon and the default negation words.
    pub fn empty() -> Self {
        Self {
            valences: HashMap::new(),
            ..Self::default()
        }
    }

    /// Add or replace a word; the valence is clamped to [-1, 1].
    #[must_use]
    pub fn with_word(mut self, word: &str, valence: f64) -> Self {
        self.valences
            .insert(word.to_lowercase(), valence.clamp(-1.0, 1.0));
        self
    }

    /// Valence of `word`, if it is in the lexicon.
    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(&word.to_lowercase()).copied()
    }

    /// Number of words in the lexicon.
    pub fn len(&self) -> usize {
        self.valences.len()
    }

    /// Whether the lexicon has no words.
    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut negate = false;
        let mut sum = 0.0;
        let mut matched = 0usize;

        for token in lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
        {
            if self.negations.contains(token) {
                negate = true;
                continue;
            }
            if let Some(&valence) = self.valences.get(token) {
                sum += if negate { -valence } else { valence };
                matched += 1;
                negate = false;
            }
        }

        if matched == 0 { 0.0 } else { sum / matched as f64 }
    }
}

impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn score(&self, text: &str) -> Result<SentimentScore, ScorerError> {
        if text.trim().is_empty() {
            return Err(ScorerError::EmptyText);
        }
        Ok(SentimentScore::Polarity(self.polarity(text)))
    }
}
