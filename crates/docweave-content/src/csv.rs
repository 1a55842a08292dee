//! CSV content parsing.
//!
//! [`CsvParser`] interprets delimited tabular text as either a semantic
//! HTML table or a labeled list. Decoding uses the `csv` crate: RFC-4180
//! quoting, embedded delimiters and newlines inside double quotes, doubled
//! quotes as escape, and a configurable delimiter (comma by default).
//!
//! Ragged rows are padded or truncated to the header width with one warning
//! each; row counts above the caller's limit truncate with a warning.
//! Neither is ever fatal. CSV produces no TOC and no assets.

use async_trait::async_trait;
use docweave_core::{ContentParser, Error, ParseOptions, ParseResult, Result};
use html_escape::encode_text;

/// Parser for delimited tabular content.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvParser;

impl CsvParser {
    /// Create a CSV parser.
    pub fn new() -> Self {
        Self
    }
}

/// Delimiters tried by content sniffing, in preference order.
const SNIFF_DELIMITERS: &[char] = &[',', '\t', ';'];

#[async_trait]
impl ContentParser for CsvParser {
    fn name(&self) -> &str {
        "csv"
    }

    fn extensions(&self) -> &[&str] {
        &["csv", "tsv"]
    }

    fn can_parse(&self, content: &str, filename: Option<&str>) -> bool {
        if filename.is_some_and(|f| self.matches_extension(f)) {
            return true;
        }
        SNIFF_DELIMITERS
            .iter()
            .any(|&d| regularity(content, d) >= Regularity::Consistent)
    }

    fn confidence(&self, content: &str, filename: Option<&str>) -> f32 {
        if content.trim().is_empty() {
            return 0.0;
        }
        let line_count = content.lines().filter(|l| !l.trim().is_empty()).count();
        let best = SNIFF_DELIMITERS
            .iter()
            .map(|&d| regularity(content, d))
            .max()
            .unwrap_or(Regularity::None);

        let mut score = match best {
            Regularity::Consistent => (0.55 + 0.05 * line_count.min(6) as f32).min(0.85),
            Regularity::Ragged => 0.4,
            Regularity::SingleLine => 0.3,
            Regularity::None => 0.0,
        };
        if filename.is_some_and(|f| self.matches_extension(f)) {
            score = score.max(if score > 0.0 { 0.8 } else { 0.35 });
        }
        score.clamp(0.0, 1.0)
    }

    async fn parse(&self, content: &str, options: &ParseOptions) -> Result<ParseResult> {
        let csv_opts = &options.csv;
        let delimiter = u8::try_from(csv_opts.delimiter).unwrap_or(b',');

        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut warnings = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| Error::malformed("csv", format!("cannot decode input: {e}")))?;
            if rows.len() >= options.limits.max_rows {
                warnings.push(format!(
                    "input exceeds {} rows; extra rows dropped",
                    options.limits.max_rows
                ));
                log::warn!("csv row limit reached at {} rows", options.limits.max_rows);
                break;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            return Ok(ParseResult {
                warnings,
                ..ParseResult::default()
            });
        }

        let width = rows[0].len();
        let (headers, data) = if csv_opts.has_header {
            let mut iter = rows.into_iter();
            let headers = iter.next().unwrap_or_default();
            (Some(headers), iter.collect::<Vec<_>>())
        } else {
            (None, rows)
        };

        let data = normalize_rows(data, width, csv_opts.has_header, &mut warnings);

        let html = if csv_opts.render_as_table {
            render_table(headers.as_deref(), &data)
        } else {
            render_list(headers.as_deref(), &data, width)
        };

        Ok(ParseResult {
            html,
            warnings,
            ..ParseResult::default()
        })
    }
}

/// Pad or truncate ragged rows to `width`, one warning per adjusted row.
fn normalize_rows(
    rows: Vec<Vec<String>>,
    width: usize,
    has_header: bool,
    warnings: &mut Vec<String>,
) -> Vec<Vec<String>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, mut row)| {
            if row.len() != width {
                // Row numbers reported as they appear in the source
                let line = index + 1 + usize::from(has_header);
                warnings.push(format!(
                    "row {line} has {} fields, expected {width}; {}",
                    row.len(),
                    if row.len() < width { "padded" } else { "truncated" }
                ));
                row.resize(width, String::new());
            }
            row
        })
        .collect()
}

// ============================================================================
// Rendering
// ============================================================================

fn render_table(headers: Option<&[String]>, data: &[Vec<String>]) -> String {
    let mut html = String::from("<table>\n");
    if let Some(headers) = headers {
        html.push_str("<thead>\n<tr>");
        for cell in headers {
            html.push_str(&format!("<th>{}</th>", encode_text(cell)));
        }
        html.push_str("</tr>\n</thead>\n");
    }
    html.push_str("<tbody>\n");
    for row in data {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", encode_text(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn render_list(headers: Option<&[String]>, data: &[Vec<String>], width: usize) -> String {
    let labels: Vec<String> = match headers {
        Some(headers) => headers.iter().map(|h| h.to_string()).collect(),
        None => (1..=width).map(|i| format!("Column {i}")).collect(),
    };

    let mut html = String::from("<ul class=\"csv-rows\">\n");
    for row in data {
        html.push_str("<li><dl>");
        for (label, cell) in labels.iter().zip(row) {
            html.push_str(&format!(
                "<dt>{}</dt><dd>{}</dd>",
                encode_text(label),
                encode_text(cell)
            ));
        }
        html.push_str("</dl></li>\n");
    }
    html.push_str("</ul>\n");
    html
}

// ============================================================================
// Detection signals
// ============================================================================

/// How regular the delimiter structure looks for one candidate delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Regularity {
    None,
    SingleLine,
    Ragged,
    Consistent,
}

/// Judge delimiter regularity over the first lines of the content.
///
/// Quoted fields are not honored here: this is a ranking signal, not a
/// decode, and delimiter counts inside quotes rarely flip the verdict.
fn regularity(content: &str, delimiter: char) -> Regularity {
    let counts: Vec<usize> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(50)
        .map(|l| l.matches(delimiter).count())
        .collect();

    let Some(&first) = counts.first() else {
        return Regularity::None;
    };
    if first == 0 {
        return Regularity::None;
    }
    if counts.len() == 1 {
        return Regularity::SingleLine;
    }
    if counts.iter().all(|&c| c == first) {
        Regularity::Consistent
    } else if counts.iter().all(|&c| c > 0) {
        Regularity::Ragged
    } else {
        Regularity::None
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_core::CsvOptions;

    async fn parse(content: &str, csv: CsvOptions) -> ParseResult {
        let options = ParseOptions {
            csv,
            ..Default::default()
        };
        CsvParser::new().parse(content, &options).await.unwrap()
    }

    fn table_options() -> CsvOptions {
        CsvOptions::default()
    }

    fn list_options() -> CsvOptions {
        CsvOptions {
            render_as_table: false,
            ..Default::default()
        }
    }

    // ------------------------------------------------------------------------
    // Table rendering tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_header_table() {
        let result = parse("A,B\n1,2\n3,4", table_options()).await;

        assert!(result.html.contains("<th>A</th><th>B</th>"));
        assert_eq!(result.html.matches("<td>").count(), 4);
        assert_eq!(result.html.matches("<tr>").count(), 3);
        assert!(result.warnings.is_empty());
        assert!(result.toc.is_empty());
        assert!(result.assets.is_empty());
    }

    #[tokio::test]
    async fn test_no_header_table() {
        let options = CsvOptions {
            has_header: false,
            ..Default::default()
        };
        let result = parse("1,2\n3,4", options).await;

        assert!(!result.html.contains("<thead>"));
        assert_eq!(result.html.matches("<tr>").count(), 2);
    }

    #[tokio::test]
    async fn test_data_row_count_matches_both_modes() {
        for csv in [table_options(), list_options()] {
            let render_as_table = csv.render_as_table;
            let result = parse("A,B\n1,2\n3,4\n5,6", csv).await;
            let rows = if render_as_table {
                result.html.matches("<tr>").count() - 1 // minus header row
            } else {
                result.html.matches("<li>").count()
            };
            assert_eq!(rows, 3);
        }
    }

    // ------------------------------------------------------------------------
    // List rendering tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_labeled_list() {
        let result = parse("Name,Role\nAda,Engineer", list_options()).await;

        assert!(result.html.contains("<ul class=\"csv-rows\">"));
        assert!(result.html.contains("<dt>Name</dt><dd>Ada</dd>"));
        assert!(result.html.contains("<dt>Role</dt><dd>Engineer</dd>"));
    }

    #[tokio::test]
    async fn test_list_without_header_uses_column_labels() {
        let options = CsvOptions {
            has_header: false,
            render_as_table: false,
            ..Default::default()
        };
        let result = parse("Ada,Engineer", options).await;
        assert!(result.html.contains("<dt>Column 1</dt><dd>Ada</dd>"));
    }

    // ------------------------------------------------------------------------
    // Quoting and delimiter tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_quoted_fields() {
        let result = parse("A,B\n\"x, y\",\"line\nbreak\"", table_options()).await;
        assert!(result.html.contains("<td>x, y</td>"));
        assert!(result.html.contains("line\nbreak"));
    }

    #[tokio::test]
    async fn test_doubled_quote_escape() {
        let result = parse("A\n\"say \"\"hi\"\"\"", table_options()).await;
        assert!(result.html.contains("say &quot;hi&quot;")
            || result.html.contains("say \"hi\""));
    }

    #[tokio::test]
    async fn test_custom_delimiter() {
        let options = CsvOptions {
            delimiter: ';',
            ..Default::default()
        };
        let result = parse("A;B\n1;2", options).await;
        assert!(result.html.contains("<th>A</th><th>B</th>"));
        assert!(result.html.contains("<td>1</td><td>2</td>"));
    }

    #[tokio::test]
    async fn test_cells_escaped() {
        let result = parse("A\n<script>", table_options()).await;
        assert!(result.html.contains("&lt;script&gt;"));
    }

    // ------------------------------------------------------------------------
    // Degradation tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_ragged_rows_padded_and_truncated() {
        let result = parse("A,B,C\n1,2\n1,2,3,4\n1,2,3", table_options()).await;

        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("row 2"));
        assert!(result.warnings[0].contains("padded"));
        assert!(result.warnings[1].contains("row 3"));
        assert!(result.warnings[1].contains("truncated"));
        // Every rendered row has exactly the header width
        for row_html in result.html.split("<tr>").skip(2) {
            assert_eq!(row_html.matches("<td>").count(), 3);
        }
    }

    #[tokio::test]
    async fn test_row_limit_truncates_with_warning() {
        let options = ParseOptions {
            limits: docweave_core::ParseLimits {
                max_rows: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let content = "A\n1\n2\n3\n4\n5";
        let result = CsvParser::new().parse(content, &options).await.unwrap();

        // Header plus two data rows survive the limit
        assert_eq!(result.html.matches("<tr>").count(), 3);
        assert!(result.warnings.iter().any(|w| w.contains("dropped")));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let result = parse("", table_options()).await;
        assert!(result.html.is_empty());
        assert!(result.warnings.is_empty());
    }

    // ------------------------------------------------------------------------
    // Detection tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_can_parse_consistent_delimiters() {
        let parser = CsvParser::new();
        assert!(parser.can_parse("a,b,c\n1,2,3", None));
        assert!(parser.can_parse("a\tb\n1\t2", None));
        assert!(!parser.can_parse("plain text\nwithout delimiters", None));
        assert!(!parser.can_parse("{\"content\":[]}", None));
    }

    #[test]
    fn test_confidence_scales_with_consistency() {
        let parser = CsvParser::new();
        let consistent = parser.confidence("a,b\n1,2\n3,4\n5,6", None);
        let ragged = parser.confidence("a,b\n1,2,3\n4,5", None);
        let single = parser.confidence("a,b,c", None);
        let none = parser.confidence("no delimiters here", None);

        assert!(consistent > ragged);
        assert!(ragged > single);
        assert!(single > none);
        assert_eq!(none, 0.0);
    }

    #[test]
    fn test_confidence_extension_hint() {
        let parser = CsvParser::new();
        assert!(parser.confidence("a,b\n1,2", Some("data.csv")) >= 0.8);
        assert!(parser.can_parse("anything", Some("data.tsv")));
    }
}
