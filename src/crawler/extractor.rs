//! HTML extractor
//!
//! Pulls from a document:
//! - the `<title>` text
//! - the visible body text, with script/style/noscript content dropped
//! - outbound links from `<a href>` and `<link rel="canonical">`

use crate::crawler::collaborator::{Extracted, Extractor};
use crate::ExtractionError;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Default extractor built on `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for HtmlExtractor {
    /// Extracts text, title and links
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:**
    /// - `<a href="...">` anywhere in the document
    /// - `<link rel="canonical" href="...">`
    ///
    /// **Exclude:**
    /// - `<a href="..." download>`
    /// - `javascript:`, `mailto:`, `tel:` and `data:` links
    /// - fragment-only links
    /// - anything that does not resolve to http(s)
    ///
    /// # Example
    ///
    /// ```
    /// use topic_harvester::crawler::{Extractor, HtmlExtractor};
    ///
    /// let html = r#"<html><head><title>MSc AI</title></head>
    /// <body><p>Apply now</p><a href="apply">Apply</a></body></html>"#;
    /// let page = HtmlExtractor::new()
    ///     .extract(html, "https://example.edu/msc-ai/")
    ///     .unwrap();
    /// assert_eq!(page.title.as_deref(), Some("MSc AI"));
    /// assert_eq!(page.links, vec!["https://example.edu/msc-ai/apply"]);
    /// ```
    fn extract(&self, markup: &str, base_url: &str) -> Result<Extracted, ExtractionError> {
        if markup.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }
        let base = Url::parse(base_url)
            .map_err(|_| ExtractionError::InvalidBaseUrl(base_url.to_string()))?;

        let document = Html::parse_document(markup);

        Ok(Extracted {
            text: extract_text(&document),
            title: extract_title(&document),
            links: extract_links(&document, &base),
        })
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = selector("title")?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Visible text, one non-blank line per text run
fn extract_text(document: &Html) -> String {
    let root = selector("body")
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    collect_text(root, &mut raw);

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
            }
            Node::Element(el) => {
                if SKIPPED_ELEMENTS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                    if is_block(el.name()) {
                        out.push('\n');
                    }
                }
            }
            _ => {}
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "br"
            | "li"
            | "tr"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "nav"
            | "table"
            | "ul"
            | "ol"
    )
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts all valid links, deduplicated in document order
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut push = |href: &str| {
        if let Some(absolute) = resolve_link(href, base_url) {
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    };

    if let Some(a_selector) = selector("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
    }

    if let Some(canonical_selector) = selector("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
    }

    links
}

/// Resolves an href against the page URL
///
/// Returns None for special schemes, fragment-only links, unparseable
/// values and anything that is not http(s) after resolution.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
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

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute.to_string())
}
