//! The normalized parse output contract.
//!
//! Every parser produces one immutable [`ParseResult`] per `parse` call:
//! an HTML fragment, the document metadata, a heading-derived table of
//! contents, the asset references encountered, and any non-fatal warnings.
//! Rendering layers consume only these types; parser internals stay private.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

// ============================================================================
// ParseResult
// ============================================================================

/// Normalized output of a single `parse` call.
///
/// Produced exactly once per call and owned by the caller. Empty collections
/// are skipped on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    /// Rendered HTML fragment for the document body.
    pub html: String,

    /// Document metadata (frontmatter fields or the JSON `metadata` object).
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,

    /// Heading-derived table of contents forest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toc: Vec<TocEntry>,

    /// Media and link assets, in first-appearance order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetReference>,

    /// Component names an MDX document requires, in first-appearance order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,

    /// Non-fatal diagnostics recorded while parsing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ParseResult {
    /// Create a result holding only an HTML fragment.
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// TocEntry
// ============================================================================

/// One entry in the table-of-contents forest.
///
/// Nesting reflects heading-level containment: a heading of level N is a
/// child of the nearest preceding heading of level < N; entries with no
/// qualifying ancestor are roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Slug derived from `text`, unique within one document.
    pub id: String,

    /// Heading text with inline formatting stripped.
    pub text: String,

    /// Heading level, 1 through 6.
    pub level: u8,

    /// Entries contained by this heading.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    /// Create a childless entry.
    pub fn leaf(id: impl Into<String>, text: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
            children: Vec::new(),
        }
    }
}

/// Build the TOC forest from flat entries in document order.
///
/// Each entry becomes a child of the nearest preceding entry with a smaller
/// level; entries with no such ancestor become roots. Input children are
/// expected to be empty.
pub fn build_toc_forest(flat: impl IntoIterator<Item = TocEntry>) -> Vec<TocEntry> {
    let mut roots: Vec<TocEntry> = Vec::new();
    for entry in flat {
        attach(&mut roots, entry);
    }
    roots
}

fn attach(siblings: &mut Vec<TocEntry>, entry: TocEntry) {
    if let Some(last) = siblings.last_mut()
        && entry.level > last.level
    {
        attach(&mut last.children, entry);
        return;
    }
    siblings.push(entry);
}

/// Flatten a forest back into document order.
///
/// The inverse walk of [`build_toc_forest`]: an in-order traversal visiting
/// each entry before its children.
pub fn flatten_toc(forest: &[TocEntry]) -> Vec<&TocEntry> {
    let mut out = Vec::new();
    for entry in forest {
        walk(entry, &mut out);
    }
    out
}

fn walk<'a>(entry: &'a TocEntry, out: &mut Vec<&'a TocEntry>) {
    out.push(entry);
    for child in &entry.children {
        walk(child, out);
    }
}

// ============================================================================
// AssetReference
// ============================================================================

/// Kind of media or link resource referenced by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Inline image.
    Image,
    /// Video file reference.
    Video,
    /// Downloadable file (archive, document).
    Download,
    /// External embed (video host, iframe source).
    Embed,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Download => write!(f, "download"),
            Self::Embed => write!(f, "embed"),
        }
    }
}

/// One media or link resource mentioned in content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    /// Resource classification.
    pub kind: AssetKind,

    /// URL exactly as written in the source.
    pub original_url: String,

    /// URL after joining a caller-supplied base path, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_url: Option<String>,

    /// Alternative text, when the source carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// Title attribute, when the source carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl AssetReference {
    /// Create a reference with no resolution, alt, or title.
    pub fn new(kind: AssetKind, original_url: impl Into<String>) -> Self {
        Self {
            kind,
            original_url: original_url.into(),
            resolved_url: None,
            alt: None,
            title: None,
        }
    }
}

// ============================================================================
// FormatDetection
// ============================================================================

/// Outcome of scoring one parser against unlabeled content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDetection {
    /// Format name (`"markdown"`, `"json"`, ...), or `"unknown"`.
    pub format: String,

    /// Confidence score in `[0.0, 1.0]`.
    pub confidence: f32,

    /// Name of the parser that produced the score; absent for the sentinel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser_name: Option<String>,
}

impl FormatDetection {
    /// Detection entry for a named parser.
    pub fn scored(name: &str, confidence: f32) -> Self {
        Self {
            format: name.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            parser_name: Some(name.to_string()),
        }
    }

    /// The sentinel returned when no parser claims the content.
    ///
    /// Not an error: detection degrades to "unknown" rather than failing.
    pub fn unknown() -> Self {
        Self {
            format: "unknown".to_string(),
            confidence: 0.0,
            parser_name: None,
        }
    }

    /// `true` for the unknown sentinel.
    pub fn is_unknown(&self) -> bool {
        self.parser_name.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
