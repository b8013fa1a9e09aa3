//! Sitemap document parsing
//!
//! Only the parts of the sitemap protocol the harvester needs are read: the
//! root element (`urlset` or `sitemapindex`) and the `loc` of each `url` or
//! `sitemap` entry. A prefixed sitemap namespace such as `<ns:loc>` is
//! accepted; `loc` elements of extensions (images, video) are skipped.

use thiserror::Error;
use url::Url;

/// Kind of sitemap document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// A `<urlset>` listing page URLs
    UrlSet,
    /// A `<sitemapindex>` listing further sitemaps
    Index,
}

/// A parsed sitemap: its kind and the `loc` values in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sitemap {
    pub kind: SitemapKind,
    pub locations: Vec<String>,
}

/// Reasons a sitemap document is rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SitemapError {
    #[error("document is empty")]
    Empty,

    #[error("no <urlset> or <sitemapindex> root element")]
    MissingRoot,

    #[error("unterminated tag")]
    UnterminatedTag,

    #[error("unclosed <{0}> element")]
    Unclosed(String),

    #[error("location is not an absolute URL: {0}")]
    InvalidLocation(String),
}

/// Parses a sitemap document
///
/// # Examples
///
/// ```
/// use topic_harvester::seeds::{parse_sitemap, SitemapKind};
///
/// let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
/// <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://www.ox.ac.uk/admissions/graduate</loc></url>
/// </urlset>"#;
/// let sitemap = parse_sitemap(xml).unwrap();
/// assert_eq!(sitemap.kind, SitemapKind::UrlSet);
/// assert_eq!(sitemap.locations, vec!["https://www.ox.ac.uk/admissions/graduate"]);
/// ```
pub fn parse_sitemap(xml: &str) -> Result<Sitemap, SitemapError> {
    let document = xml.trim();
    if document.is_empty() {
        return Err(SitemapError::Empty);
    }

    let mut kind = None;
    let mut locations = Vec::new();
    let mut open: Vec<&str> = Vec::new();
    let mut rest = document;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let close = after.find('>').ok_or(SitemapError::UnterminatedTag)?;
        let tag = &after[..close];
        rest = &after[close + 1..];

        if let Some(closed) = tag.strip_prefix('/') {
            if open.last() == Some(&closed.trim()) {
                open.pop();
            }
            continue;
        }
        if tag.starts_with('?') || tag.starts_with('!') {
            continue;
        }

        let self_closing = tag.ends_with('/');
        let name = tag
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_end_matches('/');
        let local = local_name(name);

        let current = match kind {
            Some(current) => current,
            None => {
                kind = Some(match local {
                    "urlset" => SitemapKind::UrlSet,
                    "sitemapindex" => SitemapKind::Index,
                    _ => return Err(SitemapError::MissingRoot),
                });
                open.push(name);
                continue;
            }
        };

        if local != "loc" {
            if !self_closing {
                open.push(name);
            }
            continue;
        }
        // Extension elements such as <image:loc> sit under their own parents
        if self_closing || !is_entry_location(current, name, open.last().copied()) {
            continue;
        }

        let closing = format!("</{}>", name);
        let end = rest
            .find(&closing)
            .ok_or_else(|| SitemapError::Unclosed(name.to_string()))?;
        let value = decode_entities(strip_cdata(rest[..end].trim()).trim());
        rest = &rest[end + closing.len()..];

        if value.is_empty() {
            continue;
        }
        if Url::parse(&value).is_err() {
            return Err(SitemapError::InvalidLocation(value));
        }
        locations.push(value);
    }

    let kind = kind.ok_or(SitemapError::MissingRoot)?;
    Ok(Sitemap { kind, locations })
}

/// Strips a namespace prefix: `ns:loc` → `loc`
fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn prefix(name: &str) -> Option<&str> {
    name.rsplit_once(':').map(|(prefix, _)| prefix)
}

/// A `loc` names an entry only as a child of `<url>` or `<sitemap>` with the
/// same namespace prefix
fn is_entry_location(kind: SitemapKind, loc: &str, parent: Option<&str>) -> bool {
    let Some(parent) = parent else {
        return false;
    };
    let expected = match kind {
        SitemapKind::UrlSet => "url",
        SitemapKind::Index => "sitemap",
    };
    local_name(parent) == expected && prefix(parent) == prefix(loc)
}

fn strip_cdata(value: &str) -> &str {
    value
        .strip_prefix("<![CDATA[")
        .and_then(|v| v.strip_suffix("]]>"))
        .unwrap_or(value)
}

/// Decodes the five predefined XML entities
fn decode_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
