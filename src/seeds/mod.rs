//! Seed discovery
//!
//! Seeds come from a sitemap (fetched over HTTP or read from disk), a
//! line-delimited URL file, or a list given inline in the configuration.
//! Any failure to obtain or parse the source is fatal for the run: no partial
//! seed list is ever returned.

mod sitemap;
mod url_list;

pub use sitemap::{parse_sitemap, Sitemap, SitemapError, SitemapKind};
pub use url_list::{parse_url_list, read_url_list, write_url_list};

use crate::config::Config;
use crate::crawler::build_http_client;
use crate::url::upgrade_to_https;
use crate::HarvestError;
use reqwest::Client;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where a run's seed URLs come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// Sitemap URL (http/https) or path to a sitemap file
    Sitemap(String),
    /// Line-delimited URL file
    UrlFile(PathBuf),
    /// URLs given directly
    Inline(Vec<String>),
}

impl fmt::Display for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sitemap(location) => write!(f, "sitemap {}", location),
            Self::UrlFile(path) => write!(f, "url file {}", path.display()),
            Self::Inline(urls) => write!(f, "{} inline URLs", urls.len()),
        }
    }
}

/// Post-processing applied to discovered seeds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedOptions {
    /// Keep only URLs containing this substring
    pub path_filter: Option<String>,
    /// Rewrite http:// to https://
    pub force_https: bool,
}

impl SeedOptions {
    /// Filters, upgrades and deduplicates seeds, keeping first-seen order
    ///
    /// # Examples
    ///
    /// ```
    /// use topic_harvester::seeds::SeedOptions;
    ///
    /// let options = SeedOptions {
    ///     path_filter: Some("/admissions/graduate".to_string()),
    ///     force_https: true,
    /// };
    /// let seeds = options.apply(vec![
    ///     "http://www.ox.ac.uk/admissions/graduate".to_string(),
    ///     "https://www.ox.ac.uk/admissions/graduate".to_string(),
    ///     "https://www.ox.ac.uk/about".to_string(),
    /// ]);
    /// assert_eq!(seeds, vec!["https://www.ox.ac.uk/admissions/graduate"]);
    /// ```
    pub fn apply(&self, urls: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        urls.into_iter()
            .filter(|url| match &self.path_filter {
                Some(filter) => url.contains(filter.as_str()),
                None => true,
            })
            .map(|url| {
                if self.force_https {
                    upgrade_to_https(&url)
                } else {
                    url
                }
            })
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }
}

/// Resolves a [`SeedSource`] into a list of seed URLs
pub struct SeedLoader {
    client: Client,
    timeout: Duration,
}

impl SeedLoader {
    /// Creates a loader using the given HTTP client for remote sitemaps
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Creates a standalone loader with the configured user agent
    ///
    /// Nothing but the HTTP client is built, so no output is opened.
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.user_agent)
            .map_err(|e| HarvestError::CollaboratorUnavailable(e.to_string()))?;
        Ok(Self::new(client, config.crawler.fetch_timeout()))
    }

    /// Loads seeds from the source and applies the options
    pub async fn load(
        &self,
        source: &SeedSource,
        options: &SeedOptions,
    ) -> Result<Vec<String>, HarvestError> {
        let raw = match source {
            SeedSource::Sitemap(location) => self.load_sitemap(location).await?,
            SeedSource::UrlFile(path) => read_url_list(path)?,
            SeedSource::Inline(urls) => urls.clone(),
        };

        let total = raw.len();
        let seeds = options.apply(raw);
        tracing::info!(
            "Discovered {} seed URLs from {} ({} before filtering)",
            seeds.len(),
            source,
            total
        );
        if seeds.is_empty() {
            tracing::warn!("Seed source {} produced no usable URLs", source);
        }

        Ok(seeds)
    }

    /// Loads a sitemap, following one level of sitemap index
    async fn load_sitemap(&self, location: &str) -> Result<Vec<String>, HarvestError> {
        let document = self.read_document(location).await?;
        let sitemap =
            parse_sitemap(&document).map_err(|e| HarvestError::seed_discovery(location, e))?;

        match sitemap.kind {
            SitemapKind::UrlSet => Ok(sitemap.locations),
            SitemapKind::Index => {
                tracing::debug!(
                    "{} is a sitemap index with {} children",
                    location,
                    sitemap.locations.len()
                );
                let mut urls = Vec::new();
                for child in &sitemap.locations {
                    let document = self.read_document(child).await?;
                    let child_map = parse_sitemap(&document)
                        .map_err(|e| HarvestError::seed_discovery(child.as_str(), e))?;
                    if child_map.kind == SitemapKind::Index {
                        tracing::warn!("Skipping nested sitemap index {}", child);
                        continue;
                    }
                    urls.extend(child_map.locations);
                }
                Ok(urls)
            }
        }
    }

    /// Reads a sitemap document from a URL or a local path
    async fn read_document(&self, location: &str) -> Result<String, HarvestError> {
        if !(location.starts_with("http://") || location.starts_with("https://")) {
            return tokio::fs::read_to_string(location)
                .await
                .map_err(|e| HarvestError::seed_discovery(location, e));
        }

        let response = self
            .client
            .get(location)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| HarvestError::seed_discovery(location, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::seed_discovery(
                location,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| HarvestError::seed_discovery(location, e))
    }
}
