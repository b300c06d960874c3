//! Markup parsing and readable-text extraction

use scraper::{Html, Selector};
use url::Url;

/// A link extracted from a fetched page, resolved against the page URL
#[derive(Debug, Clone)]
pub struct ExtractedLink {
    pub url: String,
    pub is_internal: bool,
}

/// A page reduced to retrievable text plus its outgoing links
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub text: String,
    pub links: Vec<ExtractedLink>,
}

/// Whether a response body looks like HTML (vs already-readable text such as
/// a raw markdown file).
pub fn looks_like_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        if ct.contains("text/html") || ct.contains("application/xhtml") {
            return true;
        }
        if ct.contains("text/plain") || ct.contains("text/markdown") {
            return false;
        }
    }
    let head = body.trim_start();
    head.starts_with("<!DOCTYPE") || head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Extract readable text and links from a fetched page.
///
/// Non-HTML bodies pass through with only whitespace normalization.
pub fn extract_page(body: &str, content_type: Option<&str>, base_url: &str) -> ExtractedPage {
    if !looks_like_html(content_type, body) {
        return ExtractedPage {
            text: normalize_whitespace(body),
            links: Vec::new(),
        };
    }

    let document = Html::parse_document(body);

    let root = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
        .map(|e| e.html())
        .unwrap_or_else(|| body.to_string());

    let text = html2text::from_read(root.as_bytes(), 80).unwrap_or_else(|_| root.clone());
    let text = normalize_whitespace(&text);

    let mut links = Vec::new();
    if let Ok(selector) = Selector::parse("a[href]") {
        let base = Url::parse(base_url).ok();

        for elem in document.select(&selector) {
            if let Some(href) = elem.value().attr("href") {
                // Resolve relative URLs
                let url = if let Some(ref base) = base {
                    base.join(href)
                        .map(|u| u.to_string())
                        .unwrap_or_else(|_| href.to_string())
                } else {
                    href.to_string()
                };

                let is_internal = if let Some(ref base) = base {
                    Url::parse(&url)
                        .map(|u| u.host() == base.host())
                        .unwrap_or(false)
                } else {
                    !href.contains("://")
                };

                links.push(ExtractedLink { url, is_internal });
            }
        }
    }

    ExtractedPage { text, links }
}

/// Collapse runs of blank lines and trailing whitespace
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(trimmed);
        out.push('\n');
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_page_basic() {
        let html = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Test Page</title></head>
        <body>
            <h1>Main Heading</h1>
            <p>Some paragraph text here.</p>
            <a href="/other">Link</a>
            <a href="https://external.com/page">External</a>
        </body>
        </html>
        "#;

        let page = extract_page(html, Some("text/html"), "https://example.com/docs");

        assert!(page.text.contains("Main Heading"));
        assert!(page.text.contains("paragraph text"));
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].url, "https://example.com/other");
        assert!(page.links[0].is_internal);
        assert!(!page.links[1].is_internal);
    }

    #[test]
    fn test_plain_text_passthrough() {
        let body = "# pgvector\n\nOpen-source vector similarity search for Postgres.";
        let page = extract_page(body, Some("text/plain"), "https://example.com/README.md");
        assert!(page.text.contains("pgvector"));
        assert!(page.links.is_empty());
    }

    #[test]
    fn test_looks_like_html_sniffs_body() {
        assert!(looks_like_html(None, "<!DOCTYPE html><html></html>"));
        assert!(!looks_like_html(None, "plain markdown text"));
        assert!(!looks_like_html(Some("text/markdown"), "<html>escaped example</html>"));
    }

    #[test]
    fn test_normalize_whitespace() {
        let text = "line one   \n\n\n\nline two\t\n";
        assert_eq!(normalize_whitespace(text), "line one\n\nline two");
    }
}
