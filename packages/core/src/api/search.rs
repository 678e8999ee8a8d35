//! Case-insensitive substring matching and match highlighting
//!
//! The query is escaped and compiled into a case-insensitive [`Regex`], so it
//! matches literally and case folding follows Unicode simple folding (final
//! sigma included). Highlighting wraps the original text of each match, so
//! the title's case is preserved.

use regex::{Regex, RegexBuilder};

/// Inserted before each highlighted match
pub const HIGHLIGHT_OPEN: &str = "<mark>";

/// Inserted after each highlighted match
pub const HIGHLIGHT_CLOSE: &str = "</mark>";

/// A compiled search query
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    pattern: Regex,
}

impl QueryMatcher {
    /// Compile `query` for literal, case-insensitive matching
    ///
    /// Returns `None` for an empty query. Fails only when the escaped query
    /// exceeds the regex size limit.
    pub fn new(query: &str) -> Result<Option<Self>, regex::Error> {
        if query.is_empty() {
            return Ok(None);
        }

        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()?;
        Ok(Some(Self { pattern }))
    }

    /// Whether `text` contains the query, ignoring case
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Wrap every occurrence in highlight markers
    ///
    /// Occurrences are found left to right and never overlap.
    pub fn highlight(&self, text: &str) -> String {
        let replacement = format!("{}$0{}", HIGHLIGHT_OPEN, HIGHLIGHT_CLOSE);
        self.pattern.replace_all(text, replacement.as_str()).into_owned()
    }
}
