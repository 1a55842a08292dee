//! The parser capability contract.
//!
//! [`ContentParser`] is the one trait the rest of the system depends on.
//! Four concrete implementations live in `docweave-content` (markdown, mdx,
//! json, csv); the detector ranks them, callers parse with them.
//!
//! # Async
//!
//! Parsing is pure, synchronous computation over immutable input. The
//! `parse` method is async only so callers can schedule parsing without
//! blocking their own event loop — it never suspends internally, performs
//! no I/O, and holds no shared mutable state, so concurrent calls against
//! one parser instance are safe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::result::ParseResult;

/// Capability contract satisfied by every concrete parser.
///
/// `extensions` and `can_parse` are independent signals: `can_parse` may
/// return `true` even when the filename extension does not match, because
/// content sniffing overrides naming.
#[async_trait]
pub trait ContentParser: Send + Sync {
    /// Stable parser name (`"markdown"`, `"mdx"`, `"json"`, `"csv"`).
    fn name(&self) -> &str;

    /// Filename extensions this parser conventionally owns, without dots.
    fn extensions(&self) -> &[&str];

    /// Whether this parser claims the content.
    ///
    /// Default: any positive confidence claims it.
    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool {
        self.confidence(content, filename) > 0.0
    }

    /// Heuristic fitness score in `[0.0, 1.0]`.
    ///
    /// Scores are structural-signal estimates used for ranking; only the
    /// ordering between parsers is contractual, never exact values.
    fn confidence(&self, content: &str, filename: Option<&str>) -> f32;

    /// Parse content into the normalized rendering contract.
    ///
    /// Returns `Err` only for structurally invalid input
    /// ([`Error::MalformedInput`](crate::Error::MalformedInput)); every
    /// recoverable problem degrades into `ParseResult::warnings`.
    async fn parse(&self, content: &str, options: &ParseOptions) -> Result<ParseResult>;

    /// Whether `filename` ends in one of this parser's extensions.
    fn matches_extension(&self, filename: &str) -> bool {
        let ext = match filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return false,
        };
        self.extensions().iter().any(|e| *e == ext)
    }
}

// ============================================================================
// ParseOptions
// ============================================================================

/// Caller-supplied parsing options.
///
/// All fields have serviceable defaults; `ParseOptions::default()` is the
/// common case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Filename hint for the content, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Base path joined onto relative asset URLs to form `resolved_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// CSV-specific options; ignored by other parsers.
    #[serde(default)]
    pub csv: CsvOptions,

    /// Resource-exhaustion guards.
    #[serde(default)]
    pub limits: ParseLimits,
}

/// Options for the CSV parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Field delimiter. Must be an ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Whether row 0 supplies column names.
    #[serde(default = "default_true")]
    pub has_header: bool,

    /// Render a semantic `<table>` when `true`, a labeled list otherwise.
    #[serde(default = "default_true")]
    pub render_as_table: bool,
}

/// Caller-configurable resource guards.
///
/// Exceeding a limit truncates with a warning; it never rejects the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseLimits {
    /// Maximum CSV rows rendered.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Maximum nesting depth honored while building structures.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

fn default_max_rows() -> usize {
    10_000
}

fn default_max_depth() -> usize {
    64
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_header: default_true(),
            render_as_table: default_true(),
        }
    }
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            max_depth: default_max_depth(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedParser {
        score: f32,
    }

    #[async_trait]
    impl ContentParser for FixedParser {
        fn name(&self) -> &str {
            "fixed"
        }

        fn extensions(&self) -> &[&str] {
            &["fix", "fxd"]
        }

        fn confidence(&self, _content: &str, _filename: Option<&str>) -> f32 {
            self.score
        }

        async fn parse(&self, content: &str, _options: &ParseOptions) -> Result<ParseResult> {
            Ok(ParseResult::new(content.to_string()))
        }
    }

    #[test]
    fn test_default_can_parse_follows_confidence() {
        assert!(FixedParser { score: 0.4 }.can_parse("x", None));
        assert!(!FixedParser { score: 0.0 }.can_parse("x", None));
    }

    #[test]
    fn test_matches_extension() {
        let parser = FixedParser { score: 0.0 };
        assert!(parser.matches_extension("guide.fix"));
        assert!(parser.matches_extension("GUIDE.FXD"));
        assert!(!parser.matches_extension("guide.md"));
        assert!(!parser.matches_extension("no-extension"));
    }

    #[tokio::test]
    async fn test_trait_is_object_safe() {
        let parser: Box<dyn ContentParser> = Box::new(FixedParser { score: 1.0 });
        let result = parser.parse("hello", &ParseOptions::default()).await.unwrap();
        assert_eq!(result.html, "hello");
    }

    #[test]
    fn test_options_defaults() {
        let options = ParseOptions::default();
        assert!(options.filename.is_none());
        assert_eq!(options.csv.delimiter, ',');
        assert!(options.csv.has_header);
        assert!(options.csv.render_as_table);
        assert_eq!(options.limits.max_rows, 10_000);
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: ParseOptions =
            serde_json::from_str(r#"{"csv":{"delimiter":";","has_header":false}}"#).unwrap();
        assert_eq!(options.csv.delimiter, ';');
        assert!(!options.csv.has_header);
        assert!(options.csv.render_as_table); // defaulted
        assert_eq!(options.limits.max_depth, 64);
    }

    // Compile-time check: parser trait objects must be Send + Sync
    fn _assert_send_sync<T: Send + Sync>() {}
    #[test]
    fn test_parser_send_sync() {
        _assert_send_sync::<Box<dyn ContentParser>>();
    }
}
