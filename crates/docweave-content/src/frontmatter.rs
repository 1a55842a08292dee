//! Frontmatter extraction.
//!
//! Frontmatter is a metadata block at the very start of a document,
//! delimited by `---` fences:
//!
//! ```markdown
//! ---
//! title: My Document
//! category: example
//! tags:
//!   - rust
//!   - markdown
//! ---
//!
//! # Document Content
//! ```
//!
//! Extraction is total: content without an opening fence at offset 0 yields
//! empty metadata and the original text as body — a normal case, not a
//! failure. Inside a block, values are scalars, flow arrays (`[a, b]`),
//! block lists (`- item` lines), or one level of nested mappings.
//! Unparseable lines are skipped and reported as warnings, never errors.
//!
//! # Usage
//!
//! ```rust
//! use docweave_content::frontmatter::extract;
//!
//! let block = extract("---\ntitle: Test\n---\n\nBody");
//! assert!(block.had_delimiters());
//! assert_eq!(block.metadata().get_str("title"), Some("Test"));
//! assert_eq!(block.body().trim(), "Body");
//! ```

use docweave_core::Metadata;
use yaml_serde::Value;

/// Result of frontmatter extraction.
///
/// Holds the parsed metadata, the body after the closing fence, the raw
/// block text (for byte-identical round-trips), and any per-line warnings.
#[derive(Debug, Clone)]
pub struct FrontmatterBlock<'a> {
    metadata: Metadata,
    raw: Option<&'a str>,
    body: &'a str,
    warnings: Vec<String>,
    had_delimiters: bool,
}

impl<'a> FrontmatterBlock<'a> {
    fn without_frontmatter(body: &'a str) -> Self {
        Self {
            metadata: Metadata::new(),
            raw: None,
            body,
            warnings: Vec::new(),
            had_delimiters: false,
        }
    }

    /// Parsed metadata fields; empty when no block was found.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Body content after the closing fence (the whole input when no block).
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// The exact text between the fences, trailing newline included.
    ///
    /// Re-wrapping this with `---` fences reproduces the original block
    /// byte-for-byte.
    pub fn raw_block(&self) -> Option<&'a str> {
        self.raw
    }

    /// Warnings for lines the parser had to skip.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Whether both fence delimiters were found.
    pub fn had_delimiters(&self) -> bool {
        self.had_delimiters
    }

    /// Consume the block, yielding metadata and warnings.
    pub fn into_parts(self) -> (Metadata, Vec<String>) {
        (self.metadata, self.warnings)
    }
}

/// Extract a frontmatter block from the start of `content`.
///
/// # Behavior
///
/// - No `---` fence at offset 0: empty metadata, full input as body.
/// - Opening fence but no closing fence: same, plus a warning.
/// - Both fences: metadata parsed line-tolerantly, body after the fence.
pub fn extract(content: &str) -> FrontmatterBlock<'_> {
    // Opening fence must be `---` alone on the first line
    if !content.starts_with("---") {
        return FrontmatterBlock::without_frontmatter(content);
    }
    let after = &content[3..];
    let Some(nl) = after.find('\n') else {
        return FrontmatterBlock::without_frontmatter(content);
    };
    if !after[..nl].trim_end_matches('\r').is_empty() {
        // "----", "--- foo": a ruler or text, not a fence
        return FrontmatterBlock::without_frontmatter(content);
    }
    let rest = &after[nl + 1..];

    let Some((raw_end, body_start)) = find_closing_fence(rest) else {
        log::warn!("frontmatter opening fence found but no closing fence");
        let mut block = FrontmatterBlock::without_frontmatter(content);
        block.warnings
            .push("frontmatter opening fence has no closing fence; treating content as body".to_string());
        return block;
    };

    let raw = &rest[..raw_end];
    let body = &rest[body_start..];
    let mut warnings = Vec::new();
    let metadata = parse_block(raw, &mut warnings);

    FrontmatterBlock {
        metadata,
        raw: Some(raw),
        body,
        warnings,
        had_delimiters: true,
    }
}

/// Locate the closing fence in the text after the opening fence line.
///
/// Returns `(raw_end, body_start)` byte offsets: the raw block is
/// `rest[..raw_end]` (trailing newline included) and the body starts at
/// `body_start`, after the fence line and its newline.
fn find_closing_fence(rest: &str) -> Option<(usize, usize)> {
    // Empty block: the closing fence is the very next line
    if rest.starts_with("---") {
        if let Some(body_start) = fence_line_end(rest, 0) {
            return Some((0, body_start));
        }
    }
    let mut search = 0;
    while let Some(pos) = rest[search..].find("\n---") {
        let fence_start = search + pos + 1;
        if let Some(body_start) = fence_line_end(rest, fence_start) {
            return Some((fence_start, body_start));
        }
        search = fence_start;
    }
    None
}

/// If a fence line `---` starts at `at`, return the offset just past its
/// line ending. Rejects lines like `----` or `--- x`.
fn fence_line_end(text: &str, at: usize) -> Option<usize> {
    let after = &text[at + 3..];
    if after.is_empty() {
        return Some(text.len());
    }
    if let Some(stripped) = after.strip_prefix("\r\n") {
        return Some(text.len() - stripped.len());
    }
    if let Some(stripped) = after.strip_prefix('\n') {
        return Some(text.len() - stripped.len());
    }
    None
}

// ============================================================================
// Block parsing
// ============================================================================

/// Parse the key/value lines between the fences, tolerantly.
fn parse_block(raw: &str, warnings: &mut Vec<String>) -> Metadata {
    let lines: Vec<&str> = raw.lines().collect();
    let mut meta = Metadata::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            i += 1;
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            skip_line(warnings, i, line, "unexpected indentation");
            i += 1;
            continue;
        }
        let Some((key, rest)) = line.split_once(':') else {
            skip_line(warnings, i, line, "not a key/value pair");
            i += 1;
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            skip_line(warnings, i, line, "empty key");
            i += 1;
            continue;
        }

        let rest = rest.trim();
        if !rest.is_empty() {
            meta.insert(key, parse_scalar(rest, i, warnings));
            i += 1;
        } else {
            let (value, next) = parse_block_value(&lines, i + 1, warnings);
            meta.insert(key, value);
            i = next;
        }
    }
    meta
}

/// Parse the value for a `key:` line with nothing after the colon:
/// a block list, a nested mapping, or null.
fn parse_block_value(lines: &[&str], start: usize, warnings: &mut Vec<String>) -> (Value, usize) {
    let Some(&first) = lines.get(start) else {
        return (Value::Null, start);
    };

    if list_item(first).is_some() {
        let mut items = Vec::new();
        let mut i = start;
        while let Some(item) = lines.get(i).and_then(|l| list_item(l)) {
            items.push(parse_scalar(item, i, warnings));
            i += 1;
        }
        return (Value::Sequence(items), i);
    }

    if is_indented_pair(first) {
        let indent = leading_whitespace(first);
        let mut nested = yaml_serde::Mapping::new();
        let mut i = start;
        while let Some(&line) = lines.get(i) {
            if line.trim().is_empty() {
                break;
            }
            if leading_whitespace(line) < indent {
                break;
            }
            let trimmed = line.trim();
            match trimmed.split_once(':') {
                Some((k, v)) if !k.trim().is_empty() => {
                    let value = if v.trim().is_empty() {
                        Value::Null
                    } else {
                        parse_scalar(v.trim(), i, warnings)
                    };
                    nested.insert(Value::String(k.trim().to_string()), value);
                }
                _ => skip_line(warnings, i, trimmed, "not a key/value pair"),
            }
            i += 1;
        }
        return (Value::Mapping(nested), i);
    }

    (Value::Null, start)
}

/// Parse one scalar or flow-array value, falling back to a plain string.
fn parse_scalar(text: &str, line_index: usize, warnings: &mut Vec<String>) -> Value {
    match yaml_serde::from_str::<Value>(text) {
        // "My doc: part 2" parses as a mapping; a scalar line is not one
        Ok(Value::Mapping(_)) if !text.starts_with('{') => Value::String(text.to_string()),
        Ok(Value::Tagged(_)) => Value::String(text.to_string()),
        Ok(value) => value,
        Err(e) => {
            skip_line(warnings, line_index, text, "value kept as plain text");
            log::debug!("frontmatter scalar fallback: {e}");
            Value::String(text.to_string())
        }
    }
}

fn list_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix("- ")
        .map(str::trim)
        .or_else(|| (trimmed == "-").then_some(""))
}

fn is_indented_pair(line: &str) -> bool {
    (line.starts_with(' ') || line.starts_with('\t')) && line.contains(':')
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn skip_line(warnings: &mut Vec<String>, index: usize, line: &str, reason: &str) {
    log::warn!("frontmatter line {}: {reason}: {line:?}", index + 1);
    warnings.push(format!("frontmatter line {}: {reason}: {line:?}", index + 1));
}

// ============================================================================
// Tests
// ============================================================================
