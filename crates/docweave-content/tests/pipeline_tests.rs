//! End-to-end pipeline tests: detect a format, parse with the selected
//! parser, and check the normalized output contract.

use docweave_content::detect::FormatDetector;
use docweave_content::{CsvParser, JsonParser, MarkdownParser, MdxParser};
use docweave_core::{ContentParser, CsvOptions, ParseOptions, flatten_toc};

// ============================================================================
// Detect → parse flow
// ============================================================================

#[tokio::test]
async fn detected_parser_parses_markdown_document() {
    let content = "---\ntitle: X\n---\n# H1\n## H2";
    let detector = FormatDetector::with_default_parsers();

    let top = detector.detect(content, None);
    assert_eq!(top.format, "markdown");

    let parser = detector.parser_named(&top.format).unwrap();
    let result = parser.parse(content, &ParseOptions::default()).await.unwrap();

    assert_eq!(result.metadata.get_str("title"), Some("X"));
    assert_eq!(result.toc.len(), 1);
    assert_eq!(result.toc[0].text, "H1");
    assert_eq!(result.toc[0].level, 1);
    assert_eq!(result.toc[0].children.len(), 1);
    assert_eq!(result.toc[0].children[0].text, "H2");
    assert_eq!(result.toc[0].children[0].level, 2);
    assert!(result.toc[0].children[0].children.is_empty());
}

#[tokio::test]
async fn detected_parser_parses_json_document() {
    let content = r#"{"metadata": {"title": "Blocks"}, "content": [
        {"type": "heading", "level": 1, "content": "Top"},
        {"type": "paragraph", "content": "Body."}
    ]}"#;
    let detector = FormatDetector::with_default_parsers();

    let top = detector.detect(content, None);
    assert_eq!(top.format, "json");

    let parser = detector.parser_named(&top.format).unwrap();
    let result = parser.parse(content, &ParseOptions::default()).await.unwrap();

    assert_eq!(result.metadata.get_str("title"), Some("Blocks"));
    assert!(result.html.contains("<h1 id=\"top\">Top</h1>"));
    assert!(result.html.contains("<p>Body.</p>"));
}

#[tokio::test]
async fn detection_ranks_json_first_for_content_object() {
    // Registration order here mirrors the documented example:
    // [markdown, json, csv, mdx]
    let detector = FormatDetector::with_default_parsers();
    let results = detector.detect_all("{\"content\":[]}", None);

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].format, "json");
    assert!(results[0].confidence >= 0.8);
    assert!(
        results
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence)
    );
}

#[tokio::test]
async fn unknown_content_degrades_to_sentinel() {
    let detector = FormatDetector::with_default_parsers();
    let top = detector.detect("", None);

    assert!(top.is_unknown());
    assert_eq!(top.format, "unknown");
    assert_eq!(top.confidence, 0.0);
    assert!(top.parser_name.is_none());
}

// ============================================================================
// Documented contract examples
// ============================================================================

#[tokio::test]
async fn csv_header_table_example() {
    let options = ParseOptions {
        csv: CsvOptions {
            has_header: true,
            render_as_table: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = CsvParser::new().parse("A,B\n1,2\n3,4", &options).await.unwrap();

    assert!(result.html.contains("<th>A</th><th>B</th>"));
    // Two data rows: input rows minus the header
    assert_eq!(result.html.matches("<tr>").count() - 1, 2);
}

#[tokio::test]
async fn csv_data_row_count_independent_of_render_mode() {
    let content = "A,B\n1,2\n3,4\n5,6\n7,8";
    for render_as_table in [true, false] {
        let options = ParseOptions {
            csv: CsvOptions {
                render_as_table,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = CsvParser::new().parse(content, &options).await.unwrap();
        let data_rows = if render_as_table {
            result.html.matches("<tr>").count() - 1
        } else {
            result.html.matches("<li>").count()
        };
        assert_eq!(data_rows, 4);
    }
}

#[tokio::test]
async fn json_unknown_blocks_warn_without_output() {
    let content = r#"{"content": [
        {"type": "hologram", "content": "x"},
        {"type": "paragraph", "content": "real"}
    ]}"#;
    let result = JsonParser::new()
        .parse(content, &ParseOptions::default())
        .await
        .unwrap();

    assert_eq!(result.warnings.len(), 1);
    assert!(!result.html.contains("hologram"));
    assert!(result.html.contains("<p>real</p>"));
}

#[tokio::test]
async fn toc_ids_stay_unique_across_duplicate_headings() {
    let result = MarkdownParser::new()
        .parse("# FAQ\n## FAQ\n## FAQ", &ParseOptions::default())
        .await
        .unwrap();

    let ids: Vec<&str> = flatten_toc(&result.toc).iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["faq", "faq-2", "faq-3"]);
}

#[tokio::test]
async fn mdx_pipeline_emits_placeholders_and_component_list() {
    let content = "---\ntitle: Widgets\n---\nimport W from './w'\n\n# Guide\n\n<Widget size={2} />";
    let detector = FormatDetector::with_default_parsers();

    let top = detector.detect(content, None);
    assert_eq!(top.format, "mdx");

    let result = MdxParser::new()
        .parse(content, &ParseOptions::default())
        .await
        .unwrap();

    assert_eq!(result.metadata.get_str("title"), Some("Widgets"));
    assert_eq!(result.components, vec!["Widget"]);
    assert!(result.html.contains("data-component=\"Widget\""));
    assert!(result.html.contains("<h1 id=\"guide\">Guide</h1>"));
    assert!(result.warnings.iter().any(|w| w.contains("import")));
}

// ============================================================================
// Concurrency contract
// ============================================================================

#[tokio::test]
async fn concurrent_parses_share_one_parser_instance() {
    let parser = std::sync::Arc::new(MarkdownParser::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let parser = parser.clone();
            tokio::spawn(async move {
                let content = format!("# Doc {i}\n\nbody {i}");
                parser.parse(&content, &ParseOptions::default()).await.unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        assert_eq!(result.toc[0].text, format!("Doc {i}"));
    }
}
