//! HTML classification and simplification

use htmd::options::{HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Cursor;
use tracing::{debug, warn};
use url::Url;

/// Marker returned in place of markdown when simplification fails
pub const SIMPLIFY_FAILED_MARKER: &str = "<error>Page failed to be simplified from HTML</error>";

/// Number of leading body characters inspected when no Content-Type is sent
const SNIFF_CHARS: usize = 100;

/// Check if content is HTML based on content type and body
///
/// A declared Content-Type always wins. The body is only sniffed when the
/// header is absent.
pub fn is_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        return ct.to_lowercase().contains("text/html");
    }

    let head: String = body.chars().take(SNIFF_CHARS).collect();
    head.to_lowercase().contains("<html")
}

/// Reduce an HTML page to its main content, rendered as markdown
///
/// Never fails: if no readable content is found the
/// [`SIMPLIFY_FAILED_MARKER`] is returned instead.
pub fn simplify_html(html: &str, base: &Url) -> String {
    let mut cursor = Cursor::new(html.as_bytes());
    let product = match readability::extractor::extract(&mut cursor, base) {
        Ok(product) => product,
        Err(e) => {
            warn!(url = %base, error = %e, "Readability extraction failed");
            return SIMPLIFY_FAILED_MARKER.to_string();
        }
    };

    if product.content.trim().is_empty() {
        warn!(url = %base, "Readability extraction produced no content");
        return SIMPLIFY_FAILED_MARKER.to_string();
    }

    match html_to_markdown(&product.content) {
        Some(markdown) => {
            debug!(url = %base, title = %product.title, "Simplified HTML");
            markdown
        }
        None => {
            warn!(url = %base, "Markdown conversion produced no content");
            SIMPLIFY_FAILED_MARKER.to_string()
        }
    }
}

/// Convert an HTML fragment to markdown with ATX headings
///
/// Returns `None` when the conversion fails or yields only whitespace.
pub fn html_to_markdown(html: &str) -> Option<String> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .options(Options {
            heading_style: HeadingStyle::Atx,
            ..Default::default()
        })
        .build();

    let markdown = converter.convert(html).ok()?;
    let markdown = filter_excessive_newlines(markdown.trim());
    if markdown.is_empty() {
        None
    } else {
        Some(markdown)
    }
}

static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Collapse runs of blank lines to a single paragraph break
pub fn filter_excessive_newlines(s: &str) -> String {
    BLANK_RUNS.replace_all(s, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/article").unwrap()
    }

    #[test]
    fn test_is_html_by_content_type() {
        assert!(is_html(Some("text/html"), ""));
        assert!(is_html(Some("text/html; charset=utf-8"), "{}"));
        assert!(is_html(Some("TEXT/HTML"), ""));
        assert!(!is_html(Some("text/plain"), ""));
        assert!(!is_html(Some("application/json"), ""));
    }

    #[test]
    fn test_declared_type_beats_body() {
        assert!(!is_html(Some("application/json"), "<html><body>hi</body></html>"));
        assert!(is_html(Some("text/html"), "not markup at all"));
    }

    #[test]
    fn test_is_html_by_body() {
        assert!(is_html(None, "<html><body>"));
        assert!(is_html(None, "<!DOCTYPE html>\n<HTML lang=\"en\">"));
        assert!(!is_html(None, "Hello world"));
        assert!(!is_html(None, "{\"json\": true}"));
    }

    #[test]
    fn test_sniff_limited_to_first_100_chars() {
        let late = format!("{}<html>", " ".repeat(100));
        assert!(!is_html(None, &late));
        let early = format!("{}<html>", " ".repeat(90));
        assert!(is_html(None, &early));
    }

    #[test]
    fn test_html_to_markdown_headings_are_atx() {
        let md = html_to_markdown("<h1>Title</h1><h2>Subtitle</h2><p>Body</p>").unwrap();
        assert!(md.contains("# Title"));
        assert!(md.contains("## Subtitle"));
        assert!(!md.contains("====="));
    }

    #[test]
    fn test_html_to_markdown_skip_script() {
        let md = html_to_markdown("<p>Before</p><script>alert('bad');</script><p>After</p>")
            .unwrap();
        assert!(md.contains("Before"));
        assert!(md.contains("After"));
        assert!(!md.contains("alert"));
    }

    #[test]
    fn test_html_to_markdown_empty() {
        assert!(html_to_markdown("<div>   </div>").is_none());
    }

    #[test]
    fn test_simplify_article() {
        let html = r#"<!DOCTYPE html>
<html>
<head><title>Test article</title></head>
<body>
  <nav><a href="/">Home</a> | <a href="/about">About</a></nav>
  <article>
    <h1>Main Heading</h1>
    <p>This is the first paragraph of the article, long enough to be
    considered real readable content by the extraction heuristics, with
    several commas, clauses, and sentences.</p>
    <p>This is the second paragraph, which also carries a good amount of
    text so that the scorer prefers this container over the navigation,
    the footer, and any other boilerplate on the page.</p>
  </article>
</body>
</html>"#;
        let md = simplify_html(html, &base());
        assert_ne!(md, SIMPLIFY_FAILED_MARKER);
        assert!(md.contains("first paragraph"));
        assert!(md.contains("second paragraph"));
    }

    #[test]
    fn test_simplify_empty_page_returns_marker() {
        let md = simplify_html("<html><body></body></html>", &base());
        assert_eq!(md, SIMPLIFY_FAILED_MARKER);
    }

    #[test]
    fn test_filter_excessive_newlines() {
        let input = "line1\n\n\n\n\nline2";
        let output = filter_excessive_newlines(input);
        assert_eq!(output, "line1\n\nline2");
    }
}
