use std::sync::LazyLock;

use htmd::HtmlToMarkdown;
use regex::Regex;
use scraper::Html;

use crate::models::DescriptionFormat;

static CONVERTER: LazyLock<HtmlToMarkdown> = LazyLock::new(|| {
    HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript", "iframe", "svg"])
        .build()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Convert an HTML description to Markdown.
///
/// Falls back to the trimmed input if conversion fails.
pub fn to_markdown(html: &str) -> String {
    match CONVERTER.convert(html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "Markdown conversion failed; keeping raw description");
            html.trim().to_string()
        }
    }
}

/// Strip markup from an HTML description and collapse whitespace.
pub fn to_plain(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Render an upstream HTML description in the requested format.
pub fn render_description(html: &str, format: DescriptionFormat) -> String {
    match format {
        DescriptionFormat::Markdown => to_markdown(html),
        DescriptionFormat::Plain => to_plain(html),
        DescriptionFormat::Html => html.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_keeps_content() {
        let md = to_markdown("<h1>Hello</h1><p>World</p>");
        assert!(md.contains("Hello"));
        assert!(md.contains("World"));
        assert!(!md.contains("<p>"));
    }

    #[test]
    fn markdown_strips_script_tags() {
        let md = to_markdown("<p>Content</p><script>alert('xss')</script>");
        assert!(md.contains("Content"));
        assert!(!md.contains("alert"));
    }

    #[test]
    fn plain_collapses_whitespace() {
        let text =
            to_plain("<div><p>Senior   Engineer</p>\n\n<ul><li>Rust</li><li>Go</li></ul></div>");
        assert_eq!(text, "Senior Engineer Rust Go");
    }

    #[test]
    fn html_format_is_passthrough() {
        let html = "<p>raw</p>";
        assert_eq!(render_description(html, DescriptionFormat::Html), html);
    }
}
