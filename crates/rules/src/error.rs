//! Error type shared by folder-set and file-set rule parsing.

use thiserror::Error;

/// Errors raised while parsing a folder-set or file-set rule string.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A folder-set rule string had more than one bare condition.
    #[error("rule has more than one condition: {0}")]
    MultipleConditions(String),
    /// A folder-set or file-set rule string had no condition at all.
    #[error("rule has no condition: {0}")]
    NoCondition(String),
    /// A file-set condition used an unrecognised key.
    #[error("unrecognised file-set condition key: {0}")]
    UnknownKey(String),
    /// A `SIZE_GT`/`SIZE_LE` value failed to parse as a byte size.
    #[error("invalid byte size: {0}")]
    InvalidSize(String),
    /// A regex condition failed to compile.
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// The underlying compile error.
        #[source]
        source: regex::Error,
    },
    /// A glob condition failed to compile.
    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        /// The underlying compile error.
        #[source]
        source: globset::Error,
    },
}
