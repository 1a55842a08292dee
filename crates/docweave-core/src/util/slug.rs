//! Heading slug utilities.
//!
//! Slugs anchor TOC entries to rendered headings. Within one document each
//! slug must be unique; [`SlugCounter`] deduplicates collisions by suffixing
//! `-2`, `-3`, and so on.

use std::collections::HashMap;

/// Slugify heading text to lowercase kebab-case.
///
/// Alphanumeric characters are kept and lowercased; whitespace, underscores,
/// and hyphen runs collapse to single hyphens; all other punctuation is
/// dropped. Text with no usable characters slugs to `"section"`.
///
/// # Examples
///
/// ```
/// use docweave_core::util::slug::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("What's New?"), "whats-new");
/// assert_eq!(slugify("snake_case heading"), "snake-case-heading");
/// assert_eq!(slugify("  ---  "), "section");
/// ```
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
        // other punctuation dropped
    }
    if out.is_empty() {
        out.push_str("section");
    }
    out
}

/// Assigns document-unique slugs in source order.
#[derive(Debug, Default)]
pub struct SlugCounter {
    taken: HashMap<String, usize>,
}

impl SlugCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `text` and make the result unique within this counter.
    ///
    /// The first occurrence of a slug is returned bare; later occurrences
    /// get `-2`, `-3`, ... suffixes. Suffixed forms are themselves reserved,
    /// so a literal `"intro-2"` heading never collides with a generated one.
    pub fn assign(&mut self, text: &str) -> String {
        let base = slugify(text);
        let Some(next) = self.taken.get(&base).copied() else {
            self.taken.insert(base.clone(), 2);
            return base;
        };

        let mut n = next;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.taken.contains_key(&candidate) {
                self.taken.insert(base, n + 1);
                self.taken.insert(candidate.clone(), 2);
                return candidate;
            }
            n += 1;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
