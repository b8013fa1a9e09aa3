//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::PageRecord;
use crate::output::BatchSummary;
use crate::storage::{BatchRecord, StoredPage};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
pub trait Storage {
    // ===== Writes =====

    /// Inserts a harvested page and returns its row ID
    fn insert_page(&mut self, record: &PageRecord) -> StorageResult<i64>;

    /// Records a per-URL failure
    ///
    /// # Arguments
    ///
    /// * `url` - The URL that failed
    /// * `kind` - Failure stage (`timeout`, `fetch`, `extraction`, `sink`)
    /// * `message` - Truncated error message
    fn record_failure(&mut self, url: &str, kind: &str, message: &str) -> StorageResult<i64>;

    /// Records the summary of one executor invocation
    fn record_batch(&mut self, summary: &BatchSummary, config_hash: &str) -> StorageResult<i64>;

    // ===== Reads =====

    /// Most recently saved copy of a URL
    fn get_latest_page(&self, url: &str) -> StorageResult<Option<StoredPage>>;

    fn count_pages(&self) -> StorageResult<u64>;

    fn count_unique_urls(&self) -> StorageResult<u64>;

    fn count_failures(&self) -> StorageResult<u64>;

    /// Failure counts per kind
    fn failure_summary(&self) -> StorageResult<BTreeMap<String, u64>>;

    /// Saved page counts per depth
    fn depth_breakdown(&self) -> StorageResult<BTreeMap<u32, u64>>;

    /// Latest batch summaries, newest first
    fn recent_batches(&self, limit: usize) -> StorageResult<Vec<BatchRecord>>;
}
