//! Storage module for persisting harvest results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Harvested page persistence
//! - Per-URL failure records
//! - Batch summaries with the configuration hash they ran under

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Opens or creates a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A page as stored in the database
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPage {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub content: String,
    pub depth: u32,
    pub fetched_at: String,
}

/// A batch summary row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    pub id: i64,
    pub batch_id: String,
    pub finished_at: String,
    pub config_hash: String,
    pub success_count: u64,
    pub failure_count: u64,
    pub peak_memory_bytes: u64,
    pub batches: u64,
}
