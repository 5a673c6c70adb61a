//! HTML link extraction
//!
//! Pulls followable links out of a downloaded page:
//! - `<a href>` targets, resolved against the page URL
//! - the page title, for logging

use crate::record::Parseable;
use crate::url::canonicalize_link;
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Absolute http(s) links in document order, fragments removed
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts links and the title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that is not http(s) after resolution
///
/// Duplicates are kept; the filter removes them.
///
/// # Example
///
/// ```
/// use shoal::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page#top">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_anchor_links(&document, base_url),
    }
}

/// Extracts the links from a downloaded record
///
/// Records without a page produce nothing. The body is decoded lossily, so
/// pages in other encodings still yield their ASCII links.
pub fn extract_links<P>(page: &P) -> impl Iterator<Item = Url>
where
    P: Parseable + ?Sized,
{
    let body = page.body();
    let links = if body.is_empty() {
        Vec::new()
    } else {
        parse_html(&String::from_utf8_lossy(body), page.base_url()).links
    };
    links.into_iter()
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_anchor_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves an href to an absolute, fragment-free http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    canonicalize_link(absolute.as_str()).ok()
}
