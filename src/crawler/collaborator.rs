//! Capability interfaces for the fetch and extraction collaborators
//!
//! The orchestration core only ever talks to these traits, so it can be
//! driven by the HTTP implementations in production and by in-memory fakes
//! in tests.

use crate::{ExtractionError, FetchError};
use async_trait::async_trait;
use std::time::Duration;

/// Retrieves raw markup for a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Brings the fetch mechanism up before a run
    ///
    /// An error here means nothing can be fetched at all and aborts the run.
    async fn prepare(&self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Fetches one URL, giving up after `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;

    /// Fixed wait the fetcher adds after each page; the executor extends its
    /// own deadline by this much
    fn render_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Text, title and outbound links pulled from one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub title: Option<String>,
    /// Absolute http(s) URLs in document order, without duplicates
    pub links: Vec<String>,
}

/// Turns markup into cleaned text and links
pub trait Extractor: Send + Sync {
    fn extract(&self, markup: &str, base_url: &str) -> Result<Extracted, ExtractionError>;
}
