//! HTML parser for extracting a page descriptor and its links
//!
//! The descriptor falls back through, in order:
//! the `<title>`, the `<meta name="description">` content, the first
//! non-empty paragraph (truncated), and finally a fixed placeholder.

use crate::fetcher::descriptor::NO_TITLE;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Longest paragraph excerpt used as a descriptor
pub const PARAGRAPH_EXCERPT_CHARS: usize = 100;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Title, or the best available fallback
    pub descriptor: String,

    /// Absolute http(s) links from anchor elements, fragment-free, deduplicated
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the descriptor and links
///
/// # Link Extraction Rules
///
/// **Include:** every `<a href="...">`, resolved against `base_url`.
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
/// - fragment-only hrefs (same-page anchors)
/// - anything that does not resolve to http or https
///
/// Fragments are stripped, so `/a#top` and `/a#bottom` are one link.
///
/// # Example
///
/// ```
/// use tidecrawl::fetcher::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.descriptor, "Test");
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let descriptor = extract_title(&document)
        .or_else(|| extract_meta_description(&document))
        .or_else(|| extract_first_paragraph(&document))
        .unwrap_or_else(|| NO_TITLE.to_string());

    let links = extract_links(&document, base_url);

    ParsedPage { descriptor, links }
}

/// Collapses runs of whitespace and trims; `None` if nothing is left
fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| clean_text(&element.text().collect::<String>()))
}

fn extract_meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"][content]"#).ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .find_map(clean_text)
}

fn extract_first_paragraph(document: &Html) -> Option<String> {
    let selector = Selector::parse("p").ok()?;

    let text = document
        .select(&selector)
        .find_map(|element| clean_text(&element.text().collect::<String>()))?;

    if text.chars().count() > PARAGRAPH_EXCERPT_CHARS {
        let excerpt: String = text.chars().take(PARAGRAPH_EXCERPT_CHARS).collect();
        Some(format!("{}...", excerpt.trim_end()))
    } else {
        Some(text)
    }
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(href, base_url) {
                if seen.insert(absolute_url.clone()) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
