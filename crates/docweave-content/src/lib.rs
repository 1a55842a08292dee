//! Concrete content parsers and format detection for docweave.
//!
//! This crate turns heterogeneous raw help content into the normalized
//! rendering contract defined by `docweave-core`: an HTML fragment plus
//! metadata, a table of contents, asset references, and diagnostics.
//!
//! # Modules
//!
//! - [`frontmatter`]: Fenced metadata block extraction
//! - [`markdown`]: Markdown parsing ([`MarkdownParser`])
//! - [`mdx`]: Markdown with embedded components ([`MdxParser`])
//! - [`json`]: Typed JSON content blocks ([`JsonParser`])
//! - [`csv`]: Delimited tabular content ([`CsvParser`])
//! - [`detect`]: Parser ranking over unlabeled content ([`FormatDetector`])
//!
//! # Design Philosophy
//!
//! **Degrade, don't fail.** Only structurally unusable input rejects a
//! parse. Everything else (unknown block types, ragged rows, stripped
//! statements, unparseable frontmatter lines) lands in
//! `ParseResult::warnings` and parsing continues. Parsers are stateless
//! after construction and safe to share across concurrent calls.
//!
//! # Example
//!
//! ```rust
//! use docweave_content::detect::FormatDetector;
//! use docweave_core::{ContentParser, ParseOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> docweave_core::Result<()> {
//! let detector = FormatDetector::with_default_parsers();
//! let content = "---\ntitle: Hello\n---\n# Intro";
//!
//! let top = detector.detect(content, None);
//! let parser = detector.parser_named(&top.format).unwrap();
//! let result = parser.parse(content, &ParseOptions::default()).await?;
//!
//! assert_eq!(result.metadata.get_str("title"), Some("Hello"));
//! assert_eq!(result.toc[0].text, "Intro");
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod detect;
pub mod frontmatter;
pub mod json;
pub mod markdown;
pub mod mdx;

#[cfg(test)]
mod proptests;

// Re-export the concrete parsers and detector at crate root
pub use csv::CsvParser;
pub use detect::FormatDetector;
pub use frontmatter::{FrontmatterBlock, extract as extract_frontmatter};
pub use json::JsonParser;
pub use markdown::MarkdownParser;
pub use mdx::MdxParser;
