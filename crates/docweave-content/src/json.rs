//! JSON content parsing.
//!
//! [`JsonParser`] interprets a typed content-block document: one JSON object
//! with a `content` array of blocks (`heading`, `paragraph`, `code`, `list`,
//! `image`, `blockquote`, `callout`, `html`) and an optional `metadata`
//! object merged into the result. Each block maps deterministically to one
//! HTML fragment. Block text is escaped; only `html` blocks pass through
//! raw.
//!
//! Structurally invalid input (not JSON, not an object, `content` missing
//! or not an array) rejects the call. An individually malformed or
//! unknown-type block is skipped with one warning — never an error.

use async_trait::async_trait;
use docweave_core::{
    AssetReference, ContentParser, Error, Metadata, ParseOptions, ParseResult, Result,
    SlugCounter, TocEntry, build_toc_forest,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;
use serde_json::Value;

use crate::markdown::{classify_image_url, is_relative_url, join_base_path};

/// Parser for typed JSON content-block documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

impl JsonParser {
    /// Create a JSON parser.
    pub fn new() -> Self {
        Self
    }
}

/// One typed content block on the wire.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Block {
    Heading {
        #[serde(default = "default_heading_level")]
        level: u8,
        content: String,
    },
    Paragraph {
        content: String,
    },
    Code {
        content: String,
        #[serde(default)]
        language: Option<String>,
    },
    List {
        items: Vec<String>,
    },
    Image {
        src: String,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
    Blockquote {
        content: String,
    },
    Callout {
        content: String,
        #[serde(default, rename = "calloutType")]
        callout_type: Option<String>,
    },
    Html {
        content: String,
    },
}

fn default_heading_level() -> u8 {
    2
}

#[async_trait]
impl ContentParser for JsonParser {
    fn name(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn can_parse(&self, content: &str, _filename: Option<&str>) -> bool {
        matches!(
            serde_json::from_str::<Value>(content),
            Ok(Value::Object(obj)) if matches!(obj.get("content"), Some(Value::Array(_)))
        )
    }

    fn confidence(&self, content: &str, filename: Option<&str>) -> f32 {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return 0.0;
        }
        let mut score: f32 = match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(obj)) => {
                if matches!(obj.get("content"), Some(Value::Array(_))) {
                    0.95
                } else {
                    0.5
                }
            }
            Ok(_) => 0.3,
            Err(_) if trimmed.starts_with('{') && trimmed.ends_with('}') => 0.25,
            Err(_) => 0.0,
        };
        if filename.is_some_and(|f| self.matches_extension(f)) {
            score = score.max(if score > 0.0 { 0.8 } else { 0.35 });
        }
        score.clamp(0.0, 1.0)
    }

    async fn parse(&self, content: &str, options: &ParseOptions) -> Result<ParseResult> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| Error::malformed("json", format!("invalid JSON: {e}")))?;
        let Value::Object(root) = root else {
            return Err(Error::malformed("json", "top-level value must be an object"));
        };
        let blocks = match root.get("content") {
            Some(Value::Array(blocks)) => blocks,
            Some(_) => return Err(Error::malformed("json", "`content` must be an array")),
            None => return Err(Error::malformed("json", "missing `content` array")),
        };

        let mut warnings = Vec::new();
        let metadata = match root.get("metadata") {
            None => Metadata::new(),
            Some(meta @ Value::Object(_)) => match yaml_serde::to_value(meta) {
                Ok(yaml_serde::Value::Mapping(mapping)) => Metadata::from(mapping),
                _ => Metadata::new(),
            },
            Some(_) => {
                warnings.push("`metadata` is not an object; ignored".to_string());
                Metadata::new()
            }
        };

        let mut html = String::new();
        let mut flat_toc: Vec<TocEntry> = Vec::new();
        let mut assets: Vec<AssetReference> = Vec::new();
        let mut slugs = SlugCounter::new();

        for (index, raw) in blocks.iter().enumerate() {
            match serde_json::from_value::<Block>(raw.clone()) {
                Ok(block) => render_block(
                    block,
                    options,
                    &mut html,
                    &mut flat_toc,
                    &mut assets,
                    &mut slugs,
                ),
                Err(e) => {
                    let label = raw
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("<missing>");
                    log::warn!("content block {index} (type {label:?}) skipped: {e}");
                    warnings.push(format!("content block {index} (type {label:?}) skipped: {e}"));
                }
            }
        }

        Ok(ParseResult {
            html,
            metadata,
            toc: build_toc_forest(flat_toc),
            assets,
            components: Vec::new(),
            warnings,
        })
    }
}

// ============================================================================
// Block rendering
// ============================================================================

fn render_block(
    block: Block,
    options: &ParseOptions,
    html: &mut String,
    flat_toc: &mut Vec<TocEntry>,
    assets: &mut Vec<AssetReference>,
    slugs: &mut SlugCounter,
) {
    match block {
        Block::Heading { level, content } => {
            let level = level.clamp(1, 6);
            let slug = slugs.assign(&content);
            flat_toc.push(TocEntry::leaf(slug.clone(), content.clone(), level));
            html.push_str(&format!(
                "<h{level} id=\"{slug}\">{}</h{level}>\n",
                encode_text(&content)
            ));
        }
        Block::Paragraph { content } => {
            html.push_str(&format!("<p>{}</p>\n", encode_text(&content)));
        }
        Block::Code { content, language } => {
            // Language tags pass through as a class; no highlighting here
            match language {
                Some(lang) if !lang.is_empty() => html.push_str(&format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>\n",
                    encode_double_quoted_attribute(&lang),
                    encode_text(&content)
                )),
                _ => html.push_str(&format!("<pre><code>{}</code></pre>\n", encode_text(&content))),
            }
        }
        Block::List { items } => {
            html.push_str("<ul>\n");
            for item in items {
                html.push_str(&format!("<li>{}</li>\n", encode_text(&item)));
            }
            html.push_str("</ul>\n");
        }
        Block::Image { src, alt, title } => {
            let mut asset = AssetReference::new(classify_image_url(&src), src.clone());
            asset.alt = alt.clone().filter(|a| !a.is_empty());
            asset.title = title.clone().filter(|t| !t.is_empty());
            if let Some(base) = &options.base_path
                && is_relative_url(&src)
            {
                asset.resolved_url = Some(join_base_path(base, &src));
            }
            assets.push(asset);

            html.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\"",
                encode_double_quoted_attribute(&src),
                encode_double_quoted_attribute(alt.as_deref().unwrap_or(""))
            ));
            if let Some(title) = title.filter(|t| !t.is_empty()) {
                html.push_str(&format!(" title=\"{}\"", encode_double_quoted_attribute(&title)));
            }
            html.push_str(" />\n");
        }
        Block::Blockquote { content } => {
            html.push_str(&format!(
                "<blockquote><p>{}</p></blockquote>\n",
                encode_text(&content)
            ));
        }
        Block::Callout {
            content,
            callout_type,
        } => {
            let kind = callout_type.unwrap_or_else(|| "note".to_string());
            html.push_str(&format!(
                "<div class=\"callout callout-{}\"><p>{}</p></div>\n",
                encode_double_quoted_attribute(&kind),
                encode_text(&content)
            ));
        }
        Block::Html { content } => {
            html.push_str(&content);
            if !content.ends_with('\n') {
                html.push('\n');
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
