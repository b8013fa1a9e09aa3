//! HTTP fetcher implementation
//!
//! This module provides the production [`Fetcher`]:
//! - builds the HTTP client with the configured user agent
//! - optionally checks robots.txt per origin before each request
//! - maps transport and status failures onto [`FetchError`]
//! - applies the configured settle delay after each page

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::collaborator::Fetcher;
use crate::crawler::timing::{wait_named, StopSignal, WaitOutcome};
use crate::robots::{fetch_robots, origin_of, RobotsCache};
use crate::{FetchError, HarvestError};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use topic_harvester::config::UserAgentConfig;
/// use topic_harvester::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "TopicHarvester".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP
pub struct HttpFetcher {
    client: Client,
    agent_token: String,
    robots: Option<RobotsCache>,
    settle_delay: Duration,
    stop: StopSignal,
}

impl HttpFetcher {
    /// Creates a fetcher from configuration
    ///
    /// Failing to build the client means no page can ever be fetched, so it is
    /// reported as the collaborator being unavailable.
    pub fn new(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, HarvestError> {
        let client = build_http_client(user_agent)
            .map_err(|e| HarvestError::CollaboratorUnavailable(e.to_string()))?;
        Ok(Self::with_client(client, user_agent, crawler))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, user_agent: &UserAgentConfig, crawler: &CrawlerConfig) -> Self {
        Self {
            client,
            agent_token: user_agent.crawler_name.clone(),
            robots: crawler.respect_robots.then(RobotsCache::new),
            settle_delay: crawler.settle_delay(),
            stop: StopSignal::never(),
        }
    }

    /// Lets a stop request cut the settle delay short
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// The underlying client, shared with seed discovery
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn check_robots(&self, url: &Url, timeout: Duration) -> Result<(), FetchError> {
        let Some(cache) = &self.robots else {
            return Ok(());
        };
        let Some(origin) = origin_of(url) else {
            return Ok(());
        };

        let policy = match cache.get(&origin) {
            Some(policy) => policy,
            None => {
                let policy = fetch_robots(&self.client, &origin, timeout).await;
                cache.insert(&origin, policy.clone());
                policy
            }
        };

        if policy.is_allowed(url.as_str(), &self.agent_token) {
            Ok(())
        } else {
            tracing::debug!("URL {} disallowed by robots.txt", url);
            Err(FetchError::RobotsDenied)
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::Network(e.to_string()))?;
        self.check_robots(&parsed, timeout).await?;

        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(content_type) = content_type {
            if !content_type.to_ascii_lowercase().contains("html") {
                return Err(FetchError::NotHtml(content_type));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let mut stop = self.stop.clone();
        if wait_named("render settle", self.settle_delay, &mut stop).await == WaitOutcome::Cancelled {
            tracing::debug!("Settle delay for {} cut short by stop request", url);
        }

        Ok(body)
    }

    fn render_delay(&self) -> Duration {
        self.settle_delay
    }
}

/// Maps a reqwest error onto the fetch failure taxonomy
fn classify_error(error: reqwest::Error, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(timeout)
    } else if error.is_connect() {
        FetchError::Network(format!("connection failed: {}", error))
    } else if error.is_redirect() {
        FetchError::Network(format!("redirect error: {}", error))
    } else {
        FetchError::Network(error.to_string())
    }
}
