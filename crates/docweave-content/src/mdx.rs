//! MDX parsing.
//!
//! [`MdxParser`] is a superset of the Markdown parser. Before the body is
//! handed to the shared Markdown renderer, text outside fenced code blocks
//! is rewritten:
//!
//! - ESM `import`/`export` statement lines are stripped (reported as
//!   warnings, never failures);
//! - bare `{expression}` statement lines are stripped;
//! - each component invocation (a capitalized identifier, self-closing or
//!   paired, with `key="str"`, `key={expr}`, or bare attributes) is
//!   replaced by a placeholder element carrying `data-component` and a
//!   `data-props` JSON payload.
//!
//! Embedded markup is never executed: extraction is strictly textual. The
//! distinct component names a document requires are returned in
//! `ParseResult::components`, first-appearance order.

use async_trait::async_trait;
use docweave_core::{ContentParser, ParseLimits, ParseOptions, ParseResult, Result};
use regex::Regex;
use serde_json::{Map, Value};

use crate::frontmatter;
use crate::markdown::{MarkdownParser, render_body};

/// Parser for MDX documents (Markdown with embedded component markup).
#[derive(Debug, Default, Clone, Copy)]
pub struct MdxParser;

impl MdxParser {
    /// Create an MDX parser.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentParser for MdxParser {
    fn name(&self) -> &str {
        "mdx"
    }

    fn extensions(&self) -> &[&str] {
        &["mdx"]
    }

    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool {
        if filename.is_some_and(|f| self.matches_extension(f)) {
            return true;
        }
        has_mdx_signals(content) || MarkdownParser::new().can_parse(content, None)
    }

    fn confidence(&self, content: &str, filename: Option<&str>) -> f32 {
        if content.trim().is_empty() {
            return 0.0;
        }
        if has_mdx_signals(content) {
            let score: f32 = if filename.is_some_and(|f| self.matches_extension(f)) {
                0.95
            } else {
                0.92
            };
            return score;
        }
        let mut score = MarkdownParser::new().confidence(content, None) * 0.8;
        if filename.is_some_and(|f| self.matches_extension(f)) {
            score = score.max(0.85);
        }
        score.clamp(0.0, 1.0)
    }

    async fn parse(&self, content: &str, options: &ParseOptions) -> Result<ParseResult> {
        let block = frontmatter::extract(content);
        let body = block.body();
        let (metadata, mut warnings) = block.into_parts();

        let extraction = extract_components(body, &options.limits);
        warnings.extend(extraction.warnings);

        let rendered = render_body(&extraction.body, options);

        Ok(ParseResult {
            html: rendered.html,
            metadata,
            toc: rendered.toc,
            assets: rendered.assets,
            components: extraction.components,
            warnings,
        })
    }
}

/// Whether the body carries an import/export statement or a capitalized
/// component tag outside fenced code blocks.
fn has_mdx_signals(content: &str) -> bool {
    let block = frontmatter::extract(content);
    let statement_re =
        Regex::new(r"(?m)^\s*(import|export)\s+\S").expect("invalid mdx statement regex");
    let component_re =
        Regex::new(r"</?[A-Z][A-Za-z0-9]*(\s|/?>)").expect("invalid mdx component regex");

    split_code_fences(block.body())
        .into_iter()
        .filter(|(is_code, _)| !is_code)
        .any(|(_, segment)| statement_re.is_match(segment) || component_re.is_match(segment))
}

// ============================================================================
// Component extraction
// ============================================================================

struct Extraction {
    body: String,
    components: Vec<String>,
    warnings: Vec<String>,
}

/// Rewrite an MDX body into plain Markdown plus placeholders.
///
/// Fenced code blocks pass through verbatim; everything else gets statement
/// stripping and component replacement.
fn extract_components(body: &str, limits: &ParseLimits) -> Extraction {
    let mut out = String::with_capacity(body.len());
    let mut components = Vec::new();
    let mut warnings = Vec::new();

    for (is_code, segment) in split_code_fences(body) {
        if is_code {
            out.push_str(segment);
            continue;
        }
        let filtered = strip_statements(segment, &mut warnings);
        let replaced = replace_components(&filtered, limits, &mut components, &mut warnings);
        out.push_str(&replaced);
    }

    Extraction {
        body: out,
        components,
        warnings,
    }
}

/// Split a body into alternating text and fenced-code segments.
///
/// The fence lines themselves belong to the code segment, so reassembling
/// the segments reproduces the input byte-for-byte.
fn split_code_fences(body: &str) -> Vec<(bool, &str)> {
    let mut segments = Vec::new();
    let mut seg_start = 0;
    let mut offset = 0;
    let mut open_marker: Option<&str> = None;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };

        match (open_marker, marker) {
            (None, Some(m)) => {
                if offset > seg_start {
                    segments.push((false, &body[seg_start..offset]));
                }
                seg_start = offset;
                open_marker = Some(m);
            }
            (Some(open), Some(m)) if open == m => {
                let end = offset + line.len();
                segments.push((true, &body[seg_start..end]));
                seg_start = end;
                open_marker = None;
            }
            _ => {}
        }
        offset += line.len();
    }

    if seg_start < body.len() {
        segments.push((open_marker.is_some(), &body[seg_start..]));
    }
    segments
}

/// Strip import/export statements and bare expression lines.
fn strip_statements(segment: &str, warnings: &mut Vec<String>) -> String {
    let mut out = String::with_capacity(segment.len());
    for line in segment.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with("import ") || trimmed.starts_with("export ") {
            let keyword = if trimmed.starts_with("import ") {
                "import"
            } else {
                "export"
            };
            log::debug!("stripping mdx {keyword} statement: {trimmed}");
            warnings.push(format!("stripped {keyword} statement from rendered output"));
            continue;
        }
        if trimmed.len() >= 2 && trimmed.starts_with('{') && trimmed.ends_with('}') {
            warnings.push("stripped expression statement from rendered output".to_string());
            continue;
        }
        out.push_str(line);
    }
    out
}

/// Replace component invocations with placeholder markup.
fn replace_components(
    text: &str,
    limits: &ParseLimits,
    components: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> String {
    let open_re = Regex::new(r"<([A-Z][A-Za-z0-9]*)").expect("invalid component open regex");
    let inline_code_re = Regex::new(r"`[^`\n]+`").expect("invalid inline code regex");

    let code_spans: Vec<(usize, usize)> = inline_code_re
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    let in_code_span =
        |pos: usize| code_spans.iter().any(|&(start, end)| pos >= start && pos < end);

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(m) = open_re.find(&text[pos..]) {
        let tag_start = pos + m.start();
        if in_code_span(tag_start) {
            out.push_str(&text[pos..pos + m.end()]);
            pos += m.end();
            continue;
        }
        let name = &text[pos + m.start() + 1..pos + m.end()];

        let Some(tag) = parse_invocation(text, tag_start, name, limits, warnings) else {
            // Not a well-formed invocation: keep the text literal
            out.push_str(&text[pos..pos + m.end()]);
            pos += m.end();
            continue;
        };

        out.push_str(&text[pos..tag_start]);
        out.push_str(&placeholder(name, &tag.props));
        if !components.iter().any(|c| c == name) {
            components.push(name.to_string());
        }
        pos = tag.end;
    }
    out.push_str(&text[pos..]);
    out
}

struct Invocation {
    props: Map<String, Value>,
    end: usize,
}

/// Parse one invocation starting at `tag_start` (the `<`).
///
/// Returns `None` when the text only resembles a tag, in which case it is
/// left alone for the Markdown renderer to treat literally.
fn parse_invocation(
    text: &str,
    tag_start: usize,
    name: &str,
    limits: &ParseLimits,
    warnings: &mut Vec<String>,
) -> Option<Invocation> {
    let mut props = Map::new();
    let mut i = tag_start + 1 + name.len();
    let bytes = text.as_bytes();

    loop {
        while i < text.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if text[i..].starts_with("/>") {
            return Some(Invocation { props, end: i + 2 });
        }
        if text[i..].starts_with('>') {
            return paired_invocation(text, i + 1, name, props, limits, warnings);
        }

        // Attribute name
        let attr_start = i;
        while i < text.len()
            && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'-')
        {
            i += 1;
        }
        if i == attr_start {
            return None; // unexpected character inside the tag
        }
        let attr = &text[attr_start..i];

        if !text[i..].starts_with('=') {
            props.insert(attr.to_string(), Value::Bool(true));
            continue;
        }
        i += 1;

        let (value, next) = parse_attr_value(text, i)?;
        props.insert(attr.to_string(), value);
        i = next;
    }
}

/// Parse a quoted string or `{expression}` attribute value.
fn parse_attr_value(text: &str, at: usize) -> Option<(Value, usize)> {
    let bytes = text.as_bytes();
    match bytes.get(at)? {
        b'"' | b'\'' => {
            let quote = bytes[at] as char;
            let end = text[at + 1..].find(quote)? + at + 1;
            Some((Value::String(text[at + 1..end].to_string()), end + 1))
        }
        b'{' => {
            let end = balanced_brace_end(text, at)?;
            let expr = text[at + 1..end].trim();
            // Literal expressions keep their type; anything else rides as text
            let value = serde_json::from_str::<Value>(expr)
                .unwrap_or_else(|_| Value::String(expr.to_string()));
            Some((value, end + 1))
        }
        _ => None,
    }
}

/// Find the `}` closing the brace at `at`, honoring nesting and strings.
fn balanced_brace_end(text: &str, at: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    for (offset, c) in text[at..].char_indices() {
        match in_string {
            Some(quote) => {
                if c == quote {
                    in_string = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => in_string = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(at + offset);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

/// Handle a paired invocation: find the matching close tag and record the
/// raw children text as a `children` prop.
fn paired_invocation(
    text: &str,
    children_start: usize,
    name: &str,
    mut props: Map<String, Value>,
    limits: &ParseLimits,
    warnings: &mut Vec<String>,
) -> Option<Invocation> {
    let open_re =
        Regex::new(&format!(r"<{name}[\s/>]")).expect("invalid component nesting regex");
    let close = format!("</{name}>");

    let mut depth = 1usize;
    let mut cursor = children_start;
    while depth > 0 {
        let close_pos = text[cursor..].find(&close);
        let open_pos = open_re.find(&text[cursor..]).map(|m| m.start());
        match (close_pos, open_pos) {
            (Some(c), Some(o)) if o < c => {
                depth += 1;
                if depth > limits.max_depth {
                    warnings.push(format!(
                        "component <{name}> nesting exceeds depth limit {}; treated as unclosed",
                        limits.max_depth
                    ));
                    return Some(Invocation {
                        props,
                        end: children_start,
                    });
                }
                cursor += o + 1;
            }
            (Some(c), _) => {
                depth -= 1;
                if depth == 0 {
                    let children = text[children_start..cursor + c].trim();
                    if !children.is_empty() {
                        props.insert("children".to_string(), Value::String(children.to_string()));
                    }
                    return Some(Invocation {
                        props,
                        end: cursor + c + close.len(),
                    });
                }
                cursor += c + close.len();
            }
            (None, _) => {
                warnings.push(format!("unclosed component tag <{name}>"));
                return Some(Invocation {
                    props,
                    end: children_start,
                });
            }
        }
    }
    None
}

fn placeholder(name: &str, props: &Map<String, Value>) -> String {
    let json = Value::Object(props.clone()).to_string();
    format!(
        "<div data-component=\"{name}\" data-props=\"{}\"></div>",
        html_escape::encode_double_quoted_attribute(&json)
    )
}

// ============================================================================
// Tests
// ============================================================================
