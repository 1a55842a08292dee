//! Error types for the docweave parsing pipeline.

use thiserror::Error;

/// Result type alias for docweave operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing content.
///
/// Only structural failure rejects a parse call. Everything recoverable
/// (an unknown block type, a ragged row, a stripped statement) is reported
/// through `ParseResult::warnings` instead, so callers can render partial
/// content rather than fail outright.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Structurally invalid input that the named format cannot salvage.
    ///
    /// This is the only error class a parser may return for bad content:
    /// top-level text that is not valid JSON, a `content` field that is not
    /// an array, CSV that cannot be decoded at all.
    #[error("malformed {format} input: {message}")]
    MalformedInput {
        /// Format that rejected the input (`"json"`, `"csv"`, ...).
        format: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// No parser is registered under the requested name.
    #[error("unknown parser: {0}")]
    UnknownParser(String),
}

impl Error {
    /// Construct a [`Error::MalformedInput`] for the given format.
    pub fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            format,
            message: message.into(),
        }
    }

    /// Returns `true` for the rejecting `MalformedInput` class.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = Error::malformed("json", "expected object");
        assert_eq!(err.to_string(), "malformed json input: expected object");
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_unknown_parser_display() {
        let err = Error::UnknownParser("yaml".to_string());
        assert_eq!(err.to_string(), "unknown parser: yaml");
        assert!(!err.is_malformed_input());
    }
}
