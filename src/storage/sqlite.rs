//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::PageRecord;
use crate::output::BatchSummary;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{BatchRecord, StoredPage};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// Parent directories are created as needed.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl Storage for SqliteStorage {
    // ===== Writes =====

    fn insert_page(&mut self, record: &PageRecord) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO pages (url, title, content, depth, fetched_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.url,
                record.title,
                record.content,
                record.depth,
                record.fetched_at.to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn record_failure(&mut self, url: &str, kind: &str, message: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO failures (url, kind, message, recorded_at) VALUES (?1, ?2, ?3, ?4)",
            params![url, kind, message, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn record_batch(&mut self, summary: &BatchSummary, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let result = &summary.result;
        self.conn.execute(
            "INSERT INTO batches (batch_id, finished_at, config_hash, success_count, failure_count, peak_memory_bytes, batches)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                summary.batch_id,
                now,
                config_hash,
                result.success_count as i64,
                result.failure_count as i64,
                result.peak_memory_bytes as i64,
                result.batches as i64
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ===== Reads =====

    fn get_latest_page(&self, url: &str) -> StorageResult<Option<StoredPage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, content, depth, fetched_at
             FROM pages WHERE url = ?1 ORDER BY id DESC LIMIT 1",
        )?;

        let page = stmt
            .query_row(params![url], |row| {
                Ok(StoredPage {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    depth: row.get(4)?,
                    fetched_at: row.get(5)?,
                })
            })
            .optional()?;

        Ok(page)
    }

    fn count_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages")
    }

    fn count_unique_urls(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(DISTINCT url) FROM pages")
    }

    fn count_failures(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM failures")
    }

    fn failure_summary(&self) -> StorageResult<BTreeMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM failures GROUP BY kind")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut summary = BTreeMap::new();
        for row in rows {
            let (kind, count) = row?;
            summary.insert(kind, count.max(0) as u64);
        }
        Ok(summary)
    }

    fn depth_breakdown(&self) -> StorageResult<BTreeMap<u32, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT depth, COUNT(*) FROM pages GROUP BY depth")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut breakdown = BTreeMap::new();
        for row in rows {
            let (depth, count) = row?;
            breakdown.insert(depth, count.max(0) as u64);
        }
        Ok(breakdown)
    }

    fn recent_batches(&self, limit: usize) -> StorageResult<Vec<BatchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, batch_id, finished_at, config_hash, success_count, failure_count, peak_memory_bytes, batches
             FROM batches ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(BatchRecord {
                id: row.get(0)?,
                batch_id: row.get(1)?,
                finished_at: row.get(2)?,
                config_hash: row.get(3)?,
                success_count: row.get::<_, i64>(4)?.max(0) as u64,
                failure_count: row.get::<_, i64>(5)?.max(0) as u64,
                peak_memory_bytes: row.get::<_, i64>(6)?.max(0) as u64,
                batches: row.get::<_, i64>(7)?.max(0) as u64,
            })
        })?;

        let mut batches = Vec::new();
        for row in rows {
            batches.push(row?);
        }
        Ok(batches)
    }
}
