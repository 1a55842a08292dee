//! Property-based tests for the parsing pipeline.

#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use docweave_core::{SlugCounter, TocEntry, build_toc_forest, flatten_toc};
    use proptest::prelude::*;

    use crate::detect::FormatDetector;
    use crate::frontmatter;

    proptest! {
        // Frontmatter extraction is total: it never panics, and the body is
        // always a suffix of the input.
        #[test]
        fn prop_frontmatter_total(content in any::<String>()) {
            let block = frontmatter::extract(&content);
            prop_assert!(content.ends_with(block.body()));
        }

        // Without an opening fence the input passes through untouched.
        #[test]
        fn prop_no_fence_is_identity(content in "[^-].*") {
            let block = frontmatter::extract(&content);
            prop_assert!(!block.had_delimiters());
            prop_assert_eq!(block.body(), content.as_str());
            prop_assert!(block.metadata().is_empty());
        }

        // Slugs stay unique no matter how headings collide.
        #[test]
        fn prop_slugs_unique(texts in proptest::collection::vec("[ -~]{0,20}", 0..30)) {
            let mut counter = SlugCounter::new();
            let ids: Vec<String> = texts.iter().map(|t| counter.assign(t)).collect();
            let distinct: HashSet<&String> = ids.iter().collect();
            prop_assert_eq!(distinct.len(), ids.len());
        }

        // Building the TOC forest and flattening it back preserves document
        // order and levels exactly.
        #[test]
        fn prop_toc_forest_roundtrip(levels in proptest::collection::vec(1u8..=6, 0..40)) {
            let flat: Vec<TocEntry> = levels
                .iter()
                .enumerate()
                .map(|(i, &level)| TocEntry::leaf(format!("h{i}"), format!("H{i}"), level))
                .collect();
            let expected: Vec<(String, u8)> =
                flat.iter().map(|e| (e.id.clone(), e.level)).collect();

            let forest = build_toc_forest(flat);
            let order: Vec<(String, u8)> = flatten_toc(&forest)
                .iter()
                .map(|e| (e.id.clone(), e.level))
                .collect();
            prop_assert_eq!(order, expected);
        }

        // Detection always yields one bounded score per registered parser,
        // sorted non-increasing, and the singular form never panics.
        #[test]
        fn prop_detection_bounds(content in any::<String>()) {
            let detector = FormatDetector::with_default_parsers();
            let results = detector.detect_all(&content, None);

            prop_assert_eq!(results.len(), detector.parsers().len());
            for result in &results {
                prop_assert!((0.0..=1.0).contains(&result.confidence));
            }
            prop_assert!(
                results.windows(2).all(|w| w[0].confidence >= w[1].confidence)
            );

            let top = detector.detect(&content, None);
            prop_assert!((0.0..=1.0).contains(&top.confidence));
        }
    }
}
