//! Raw social-media messages.

use sentcast_traits::{Date, parse_calendar_date};
use serde::{Deserialize, Serialize};

/// One raw message with its posting timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Timestamp as it appeared in the source, e.g. `2022-09-29 23:41:16+00:00`
    pub timestamp: String,
    /// Message body; `None` when the source field was empty or null
    pub text: Option<String>,
}

impl Message {
    /// Create a message with text.
    pub fn new(timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            text: Some(text.into()),
        }
    }

    /// Calendar date of the timestamp, time of day discarded.
    pub fn date(&self) -> Option<Date> {
        parse_calendar_date(&self.timestamp)
    }

    /// Message text, `None` when absent or blank.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}
