//! Topic-Harvester: a keyword-scoped page harvester
//!
//! This crate discovers pages under a target domain, restricted to URLs that
//! contain topical keywords, and persists cleaned page content. The crawl core
//! is a breadth-first frontier feeding a bounded-concurrency batch executor,
//! with an optional recrawl scheduler that re-harvests a fixed URL list.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod seeds;
pub mod storage;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Maximum length of error messages written to logs and failure records
pub const MESSAGE_LIMIT: usize = 100;

/// Run-level error type for Topic-Harvester operations
///
/// Per-page problems never surface here; they are reported as [`PageFailure`]
/// and counted by the batch executor.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed discovery failed for {origin}: {message}")]
    SeedDiscovery { origin: String, message: String },

    #[error("Fetch collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Builds a seed discovery error for the given source
    pub fn seed_discovery(origin: impl Into<String>, message: impl ToString) -> Self {
        Self::SeedDiscovery {
            origin: origin.into(),
            message: truncate_message(&message.to_string(), MESSAGE_LIMIT),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Failure of the fetch collaborator for a single URL
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("expected HTML, got {0}")]
    NotHtml(String),

    #[error("disallowed by robots.txt")]
    RobotsDenied,

    #[error("network error: {0}")]
    Network(String),

    /// The fetch mechanism itself is unusable; fatal for the whole run
    #[error("fetch mechanism unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the extractor for a single page
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("invalid base URL {0}")]
    InvalidBaseUrl(String),
}

/// Failure of the sink for a single record
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Sink rejected record: {0}")]
    Rejected(String),
}

/// Why a single URL did not produce a saved page
#[derive(Debug, Error)]
pub enum PageFailure {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("save failed: {0}")]
    Sink(#[from] SinkError),
}

impl PageFailure {
    /// Short stage name used in logs and failure records
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(FetchError::Timeout(_)) => "timeout",
            Self::Fetch(_) => "fetch",
            Self::Extraction(_) => "extraction",
            Self::Sink(_) => "sink",
        }
    }

    /// Returns true if the failure means the fetch mechanism is gone
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fetch(FetchError::Unavailable(_)))
    }
}

/// Truncates a message to at most `limit` characters, marking the cut
pub fn truncate_message(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(limit).collect();
    truncated.push('…');
    truncated
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchResult, FrontierEntry, PageRecord};
pub use url::{normalize_url, AdmissionFilter};
