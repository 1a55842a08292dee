//! Markdown parsing.
//!
//! [`MarkdownParser`] turns a Markdown document into the normalized
//! rendering contract: frontmatter is split off, the body renders to HTML
//! via `pulldown-cmark` (tables, strikethrough, task lists, and footnotes
//! enabled), headings become a slugged TOC forest, and link/image nodes
//! become asset references. Malformed inline syntax degrades to literal
//! text; nothing here throws on tolerable input.
//!
//! The body renderer is shared with the MDX parser, which layers component
//! extraction on top of it.

use std::collections::HashSet;

use async_trait::async_trait;
use docweave_core::{
    AssetKind, AssetReference, ContentParser, ParseOptions, ParseResult, Result, SlugCounter,
    TocEntry, build_toc_forest,
};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;

use crate::frontmatter;

/// Parser for Markdown documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownParser;

impl MarkdownParser {
    /// Create a markdown parser.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentParser for MarkdownParser {
    fn name(&self) -> &str {
        "markdown"
    }

    fn extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool {
        if filename.is_some_and(|f| self.matches_extension(f)) {
            return true;
        }
        let block = frontmatter::extract(content);
        if block.had_delimiters() {
            return true;
        }
        signal_count(block.body()) > 0 && !looks_like_json(content) && !has_component_tag(content)
    }

    fn confidence(&self, content: &str, filename: Option<&str>) -> f32 {
        if content.trim().is_empty() {
            return 0.0;
        }
        let block = frontmatter::extract(content);
        let mut score: f32 = 0.15; // any plain text renders as markdown
        if block.had_delimiters() {
            score = 0.9;
        }
        let signals = signal_count(block.body());
        if signals > 0 {
            score = score.max(0.4 + 0.1 * signals.min(3) as f32);
        }
        if filename.is_some_and(|f| self.matches_extension(f)) {
            score = score.max(0.8);
        }
        if looks_like_json(content) {
            score *= 0.2;
        }
        score.clamp(0.0, 1.0)
    }

    async fn parse(&self, content: &str, options: &ParseOptions) -> Result<ParseResult> {
        let block = frontmatter::extract(content);
        let body = block.body();
        let (metadata, warnings) = block.into_parts();
        let rendered = render_body(body, options);

        Ok(ParseResult {
            html: rendered.html,
            metadata,
            toc: rendered.toc,
            assets: rendered.assets,
            components: Vec::new(),
            warnings,
        })
    }
}

// ============================================================================
// Body rendering (shared with the MDX parser)
// ============================================================================

/// HTML, TOC, and assets produced from one Markdown body.
pub(crate) struct RenderedBody {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub assets: Vec<AssetReference>,
}

/// Render a Markdown body (frontmatter already removed).
///
/// Single event-stream pass collects headings and assets, slugs are
/// injected into the heading tags, then the stream renders to HTML.
pub(crate) fn render_body(body: &str, options: &ParseOptions) -> RenderedBody {
    let mut md_opts = Options::empty();
    md_opts.insert(Options::ENABLE_TABLES);
    md_opts.insert(Options::ENABLE_STRIKETHROUGH);
    md_opts.insert(Options::ENABLE_TASKLISTS);
    md_opts.insert(Options::ENABLE_FOOTNOTES);

    let mut events: Vec<Event<'_>> = Parser::new_ext(body, md_opts).collect();

    // Walk the stream once: heading spans and their text, asset nodes.
    let mut headings: Vec<(usize, u8, String)> = Vec::new();
    let mut assets: Vec<AssetReference> = Vec::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut heading_start: Option<(usize, u8)> = None;
    let mut heading_text = String::new();
    let mut pending_image: Option<AssetReference> = None;
    let mut image_alt = String::new();

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading_start = Some((idx, *level as u8));
                heading_text.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((start, level)) = heading_start.take() {
                    headings.push((start, level, heading_text.trim().to_string()));
                }
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let mut asset =
                    AssetReference::new(classify_image_url(dest_url), dest_url.to_string());
                if !title.is_empty() {
                    asset.title = Some(title.to_string());
                }
                pending_image = Some(asset);
                image_alt.clear();
            }
            Event::End(TagEnd::Image) => {
                if let Some(mut asset) = pending_image.take() {
                    let alt = image_alt.trim();
                    if !alt.is_empty() {
                        asset.alt = Some(alt.to_string());
                    }
                    push_asset(&mut assets, &mut seen_urls, asset, options);
                }
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => {
                if let Some(kind) = classify_link_url(dest_url) {
                    let mut asset = AssetReference::new(kind, dest_url.to_string());
                    if !title.is_empty() {
                        asset.title = Some(title.to_string());
                    }
                    push_asset(&mut assets, &mut seen_urls, asset, options);
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if heading_start.is_some() {
                    heading_text.push_str(text);
                }
                if pending_image.is_some() {
                    image_alt.push_str(text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if heading_start.is_some() {
                    heading_text.push(' ');
                }
                if pending_image.is_some() {
                    image_alt.push(' ');
                }
            }
            _ => {}
        }
    }

    // Assign document-unique slugs and inject them into the heading tags so
    // TOC ids anchor to the rendered output.
    let mut counter = SlugCounter::new();
    let mut flat = Vec::with_capacity(headings.len());
    for (idx, level, text) in headings {
        let slug = counter.assign(&text);
        flat.push(TocEntry::leaf(slug.clone(), text, level));
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[idx] {
            *id = Some(CowStr::from(slug));
        }
    }
    let toc = build_toc_forest(flat);

    let mut out = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());

    RenderedBody {
        html: out,
        toc,
        assets,
    }
}

fn push_asset(
    assets: &mut Vec<AssetReference>,
    seen: &mut HashSet<String>,
    mut asset: AssetReference,
    options: &ParseOptions,
) {
    // One entry per distinct URL, first appearance wins
    if !seen.insert(asset.original_url.clone()) {
        return;
    }
    if let Some(base) = &options.base_path
        && is_relative_url(&asset.original_url)
    {
        asset.resolved_url = Some(join_base_path(base, &asset.original_url));
    }
    assets.push(asset);
}

// ============================================================================
// URL classification
// ============================================================================

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "ogv"];
const DOWNLOAD_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "tgz", "7z", "rar", "pdf", "dmg", "pkg", "msi", "exe",
];
const EMBED_HOSTS: &[&str] = &["youtube.com", "youtu.be", "vimeo.com"];

pub(crate) fn classify_image_url(url: &str) -> AssetKind {
    match url_extension(url) {
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => AssetKind::Video,
        _ => AssetKind::Image,
    }
}

fn classify_link_url(url: &str) -> Option<AssetKind> {
    let bare = url.split(['?', '#']).next().unwrap_or(url);
    if EMBED_HOSTS.iter().any(|host| {
        bare.strip_prefix("https://")
            .or_else(|| bare.strip_prefix("http://"))
            .map(|rest| rest.trim_start_matches("www."))
            .is_some_and(|rest| rest.starts_with(host))
    }) {
        return Some(AssetKind::Embed);
    }
    match url_extension(url) {
        Some(ext) if DOWNLOAD_EXTENSIONS.contains(&ext.as_str()) => Some(AssetKind::Download),
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => Some(AssetKind::Video),
        _ => None,
    }
}

fn url_extension(url: &str) -> Option<String> {
    let bare = url.split(['?', '#']).next().unwrap_or(url);
    let (_, ext) = bare.rsplit_once('.')?;
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub(crate) fn is_relative_url(url: &str) -> bool {
    !(url.contains("://")
        || url.starts_with('/')
        || url.starts_with('#')
        || url.starts_with("data:")
        || url.starts_with("mailto:"))
}

pub(crate) fn join_base_path(base: &str, url: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches("./")
    )
}

// ============================================================================
// Detection signals
// ============================================================================

/// Count distinct Markdown block-syntax signal kinds present in the body.
pub(crate) fn signal_count(body: &str) -> usize {
    let patterns = [
        r"(?m)^#{1,6}\s+\S",          // ATX heading
        r"(?m)^(=+|-{2,})\s*$",       // setext underline / rule
        r"(?m)^\s*[-*+]\s+\S",        // unordered list
        r"(?m)^\s*\d+[.)]\s+\S",      // ordered list
        r"(?m)^(```|~~~)",            // fenced code
        r"(?m)^>\s?\S",               // blockquote
        r"!?\[[^\]]*\]\([^)]*\)",     // link or image
        r"(?m)^\|.+\|\s*$",           // pipe table row
    ];
    patterns
        .iter()
        .filter(|p| {
            Regex::new(p)
                .expect("invalid markdown signal regex")
                .is_match(body)
        })
        .count()
}

pub(crate) fn looks_like_json(content: &str) -> bool {
    let t = content.trim();
    (t.starts_with('{') && t.ends_with('}')) || (t.starts_with('[') && t.ends_with(']'))
}

pub(crate) fn has_component_tag(content: &str) -> bool {
    Regex::new(r"</?[A-Z][A-Za-z0-9]*(\s|/?>)")
        .expect("invalid component tag regex")
        .is_match(content)
}

// ============================================================================
// Tests
// ============================================================================
