//! The draft: a snapshot of the composer at interception time.

use serde::{Deserialize, Serialize};

/// Plain-text content of the composer when a submission attempt was captured.
///
/// A draft is never mutated; the next attempt produces a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft(String);

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Length in characters, used for log fields instead of the text itself.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Draft {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Draft {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for Draft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
