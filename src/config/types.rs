use crate::seeds::{SeedOptions, SeedSource};
use crate::url::AdmissionFilter;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: f64 = 10.0;

/// Default recrawl interval: two days
pub const DEFAULT_RECRAWL_INTERVAL_SECONDS: f64 = 172_800.0;

/// Main configuration structure for Topic-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub filter: FilterConfig,
    pub seeds: SeedsConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of link hops from a seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of pages fetched concurrently within one batch
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: u32,

    /// Timeout for a single fetch
    #[serde(rename = "fetch-timeout-seconds", default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: f64,

    /// Whether the HTTP fetcher consults robots.txt
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,

    /// Fixed wait after each fetch for pages that render late (milliseconds)
    #[serde(rename = "settle-delay-ms", default)]
    pub settle_delay_ms: u64,
}

/// Keyword/domain admission filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Substrings of which at least one must appear in a followed link
    pub keywords: Vec<String>,

    /// Substring every followed link must contain
    #[serde(rename = "required-domain-substring")]
    pub required_domain_substring: String,
}

/// Where the initial seed URLs come from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedsConfig {
    /// Sitemap URL or local sitemap file
    pub sitemap: Option<String>,

    /// Line-delimited file of seed URLs
    #[serde(rename = "url-file")]
    pub url_file: Option<String>,

    /// Seed URLs listed inline
    #[serde(default)]
    pub urls: Vec<String>,

    /// Keep only seeds containing this substring (e.g. "/admissions/graduate")
    #[serde(rename = "path-filter")]
    pub path_filter: Option<String>,

    /// Rewrite http:// seeds to https://
    #[serde(rename = "force-https", default)]
    pub force_https: bool,
}

/// Recrawl scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Wait between the end of one run and the start of the next
    #[serde(
        rename = "recrawl-interval-seconds",
        default = "default_recrawl_interval"
    )]
    pub recrawl_interval_seconds: f64,

    /// Number of runs before the job is dropped (0 = unlimited)
    #[serde(rename = "max-runs", default)]
    pub max_runs: u32,

    /// Fixed URL list to re-harvest; defaults to the seed source
    #[serde(rename = "url-file")]
    pub url_file: Option<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory receiving one text file per harvested page
    #[serde(rename = "text-directory")]
    pub text_directory: Option<String>,

    /// File receiving every harvested page as one JSON array
    #[serde(rename = "json-path")]
    pub json_path: Option<String>,
}

fn default_fetch_timeout() -> f64 {
    DEFAULT_FETCH_TIMEOUT_SECONDS
}

fn default_recrawl_interval() -> f64 {
    DEFAULT_RECRAWL_INTERVAL_SECONDS
}

fn default_true() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            recrawl_interval_seconds: DEFAULT_RECRAWL_INTERVAL_SECONDS,
            max_runs: 0,
            url_file: None,
        }
    }
}

impl CrawlerConfig {
    /// Per-fetch timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.fetch_timeout_seconds)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_FETCH_TIMEOUT_SECONDS))
    }

    /// Post-fetch settle delay as a `Duration`
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl FilterConfig {
    /// Builds the admission filter for a run
    pub fn admission_filter(&self) -> AdmissionFilter {
        AdmissionFilter::new(self.keywords.iter(), &self.required_domain_substring)
    }
}

impl SeedsConfig {
    /// Resolves the configured seed source
    ///
    /// Validation guarantees exactly one source is set; inline URLs win if it
    /// was somehow bypassed.
    pub fn source(&self) -> Option<SeedSource> {
        if !self.urls.is_empty() {
            Some(SeedSource::Inline(self.urls.clone()))
        } else if let Some(sitemap) = &self.sitemap {
            Some(SeedSource::Sitemap(sitemap.clone()))
        } else {
            self.url_file
                .as_ref()
                .map(|path| SeedSource::UrlFile(PathBuf::from(path)))
        }
    }

    /// Post-processing options applied to discovered seeds
    pub fn options(&self) -> SeedOptions {
        SeedOptions {
            path_filter: self.path_filter.clone(),
            force_https: self.force_https,
        }
    }
}

impl ScheduleConfig {
    /// Recrawl interval as a `Duration`
    pub fn recrawl_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.recrawl_interval_seconds).unwrap_or(Duration::ZERO)
    }

    /// Run limit, `None` meaning unlimited
    pub fn run_limit(&self) -> Option<u32> {
        (self.max_runs > 0).then_some(self.max_runs)
    }
}

impl UserAgentConfig {
    /// Formats the user agent header value
    ///
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}
