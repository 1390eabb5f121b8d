//! Error types for chart construction.
//!
//! Admission itself never fails: a cell either keeps an entry or declines it.
//! Everything here is raised while *building* things (categories, factories,
//! charts) and is meant to stop a misconfigured run before parsing starts.

use thiserror::Error;

/// Errors raised while configuring or constructing chart components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    /// Category notation could not be parsed.
    #[error("invalid category '{text}': {reason}")]
    InvalidCategory { text: String, reason: String },

    /// An option value is outside its accepted range.
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// A sentence is longer than the hash table was sized for.
    #[error("sentence of {length} words exceeds the configured maximum of {max}")]
    SentenceTooLong { length: usize, max: usize },

    /// A span does not lie inside the current sentence.
    #[error("span {start}..{end} is outside a sentence of {length} words")]
    SpanOutOfRange { start: usize, end: usize, length: usize },
}
