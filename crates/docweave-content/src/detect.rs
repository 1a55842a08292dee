//! Format detection.
//!
//! [`FormatDetector`] holds an immutable, registration-ordered list of
//! parsers and ranks them against unlabeled content. The detector never
//! parses — it only estimates fitness, so the caller parses with whichever
//! parser the ranking selects.
//!
//! Detection never fails: when no parser claims the content, the singular
//! [`detect`](FormatDetector::detect) degrades to the `unknown` sentinel.
//!
//! # Example
//!
//! ```rust
//! use docweave_content::detect::FormatDetector;
//!
//! let detector = FormatDetector::with_default_parsers();
//! let ranked = detector.detect_all("{\"content\":[]}", None);
//!
//! assert_eq!(ranked.len(), 4);
//! assert_eq!(ranked[0].format, "json");
//! assert!(ranked[0].confidence >= 0.8);
//! ```

use std::sync::Arc;

use docweave_core::{ContentParser, FormatDetection};

use crate::csv::CsvParser;
use crate::json::JsonParser;
use crate::markdown::MarkdownParser;
use crate::mdx::MdxParser;

/// Ranks registered parsers against unlabeled content.
///
/// The parser list is fixed at construction and read-only afterwards;
/// registration order breaks confidence ties (first registered wins).
pub struct FormatDetector {
    parsers: Vec<Arc<dyn ContentParser>>,
}

impl FormatDetector {
    /// Create a detector over the given parsers, in registration order.
    pub fn new(parsers: Vec<Arc<dyn ContentParser>>) -> Self {
        Self { parsers }
    }

    /// Create a detector over the four standard parsers:
    /// markdown, json, csv, mdx.
    pub fn with_default_parsers() -> Self {
        Self::new(vec![
            Arc::new(MarkdownParser::new()),
            Arc::new(JsonParser::new()),
            Arc::new(CsvParser::new()),
            Arc::new(MdxParser::new()),
        ])
    }

    /// The registered parsers, in registration order.
    pub fn parsers(&self) -> &[Arc<dyn ContentParser>] {
        &self.parsers
    }

    /// Look a parser up by its name.
    pub fn parser_named(&self, name: &str) -> Option<Arc<dyn ContentParser>> {
        self.parsers.iter().find(|p| p.name() == name).cloned()
    }

    /// Score every registered parser against the content.
    ///
    /// Returns one entry per parser, zero-confidence entries included, so
    /// callers can compare all candidates. Results are sorted non-increasing
    /// by confidence. A parser that declines `can_parse` keeps a dampened
    /// score rather than dropping out entirely.
    pub fn detect_all(&self, content: &str, filename: Option<&str>) -> Vec<FormatDetection> {
        let mut results: Vec<FormatDetection> = self
            .parsers
            .iter()
            .map(|parser| {
                let mut confidence = parser.confidence(content, filename);
                if !parser.can_parse(content, filename) {
                    confidence *= 0.25;
                }
                log::debug!(
                    "detect: parser={} confidence={confidence:.2}",
                    parser.name()
                );
                FormatDetection::scored(parser.name(), confidence)
            })
            .collect();

        // Stable sort: ties keep registration order
        results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        results
    }

    /// The top-ranked detection, or the `unknown` sentinel when every
    /// parser scores zero.
    pub fn detect(&self, content: &str, filename: Option<&str>) -> FormatDetection {
        self.detect_all(content, filename)
            .into_iter()
            .next()
            .filter(|top| top.confidence > 0.0)
            .unwrap_or_else(FormatDetection::unknown)
    }
}

impl std::fmt::Debug for FormatDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatDetector")
            .field(
                "parsers",
                &self.parsers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
