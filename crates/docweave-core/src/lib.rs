//! docweave core — shared types, traits, and errors.
//!
//! This crate provides the foundational contract used across all docweave
//! crates. It has no internal docweave dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`metadata`]: Ordered document metadata mapping
//! - [`result`]: The normalized [`ParseResult`] output contract
//! - [`parser`]: The [`ContentParser`] capability trait and options
//! - [`util`]: Slug utilities
//!
//! # Design Philosophy
//!
//! **One output contract, many parsers.** Concrete parsers live in
//! `docweave-content`; rendering layers consume only the types defined here
//! (`ParseResult`, `TocEntry`, `AssetReference`, `FormatDetection`) and never
//! reach into parser internals.

pub mod error;
pub mod metadata;
pub mod parser;
pub mod result;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use metadata::Metadata;
pub use parser::{ContentParser, CsvOptions, ParseLimits, ParseOptions};
pub use result::{
    AssetKind, AssetReference, FormatDetection, ParseResult, TocEntry, build_toc_forest,
    flatten_toc,
};

// Convenience re-exports from util
pub use util::slug::{SlugCounter, slugify};
