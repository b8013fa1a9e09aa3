//! Robots.txt handling module
//!
//! Consulted by the HTTP fetcher only when `respect-robots` is on. A robots.txt
//! that cannot be fetched, or answers with an error status, allows everything.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::RobotsPolicy;

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Returns `scheme://host[:port]` for a URL, the key robots.txt applies to
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Fetches and parses robots.txt for an origin
pub async fn fetch_robots(client: &Client, origin: &str, timeout: Duration) -> RobotsPolicy {
    let robots_url = format!("{}/robots.txt", origin);
    tracing::debug!("Fetching {}", robots_url);

    let response = match client.get(&robots_url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unavailable for {}: {}", origin, e);
            return RobotsPolicy::AllowAll;
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "robots.txt for {} returned HTTP {}",
            origin,
            response.status().as_u16()
        );
        return RobotsPolicy::AllowAll;
    }

    match response.text().await {
        Ok(body) => RobotsPolicy::from_content(&body),
        Err(_) => RobotsPolicy::AllowAll,
    }
}
