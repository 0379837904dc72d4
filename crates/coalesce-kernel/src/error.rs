//! Error types for Coalesce kernel operations.
//!
//! Merging, path lookup, and visual detection are total and never fail; the
//! variants here cover parsing of caller-supplied metadata and text.

/// Errors arising from malformed caller input.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CoalesceError {
    /// A status string is not one of `ok`, `partial`, `error`.
    #[error("invalid status `{0}`: expected ok, partial, or error")]
    InvalidStatus(String),

    /// An error record given as text is not of the form `source=message`.
    #[error("malformed error record `{0}`: expected source=message")]
    InvalidErrorRecord(String),

    /// No extraction strategy found a JSON document in the text.
    #[error("no JSON document found in text ({strategies} strategies tried)")]
    NoJsonFound { strategies: usize },
}
