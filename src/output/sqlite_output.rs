//! SQLite-backed sink
//!
//! This module provides a sink that records pages, failures and batch
//! summaries directly to the SQLite storage backend.

use crate::crawler::PageRecord;
use crate::output::traits::{BatchSummary, Sink, SinkResult};
use crate::storage::{SqliteStorage, Storage, StorageError};
use std::sync::{Mutex, MutexGuard};

/// SQLite-based sink
///
/// The connection sits behind a mutex; concurrent saves from one batch are
/// serialized here.
pub struct SqliteSink {
    storage: Mutex<SqliteStorage>,
    config_hash: String,
}

impl SqliteSink {
    /// Creates a new SQLite sink
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to write to
    /// * `config_hash` - Hash recorded with every batch summary
    pub fn new(storage: SqliteStorage, config_hash: impl Into<String>) -> Self {
        Self {
            storage: Mutex::new(storage),
            config_hash: config_hash.into(),
        }
    }

    /// Runs a read-only closure against the underlying storage
    pub fn with_storage<T>(
        &self,
        f: impl FnOnce(&SqliteStorage) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let storage = self.lock()?;
        f(&*storage)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SqliteStorage>, StorageError> {
        self.storage.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl Sink for SqliteSink {
    fn save(&self, record: PageRecord) -> SinkResult<()> {
        self.lock()?.insert_page(&record)?;
        Ok(())
    }

    fn record_failure(&self, url: &str, kind: &str, message: &str) -> SinkResult<()> {
        self.lock()?.record_failure(url, kind, message)?;
        Ok(())
    }

    fn record_summary(&self, summary: &BatchSummary) -> SinkResult<()> {
        self.lock()?.record_batch(summary, &self.config_hash)?;
        Ok(())
    }
}
