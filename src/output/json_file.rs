//! JSON array export
//!
//! Keeps every saved page in memory and rewrites one JSON array file after
//! each save. A page without a title is written with the title `N/A`.
//! Records already in the file when the sink opens are kept.

use crate::crawler::PageRecord;
use crate::output::traits::{Sink, SinkResult};
use crate::SinkError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const MISSING_TITLE: &str = "N/A";

/// One entry of the exported array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    pub depth: u32,
    pub fetched_at: DateTime<Utc>,
}

impl From<&PageRecord> for JsonRecord {
    fn from(record: &PageRecord) -> Self {
        Self {
            url: record.url.clone(),
            title: record
                .title
                .clone()
                .unwrap_or_else(|| MISSING_TITLE.to_string()),
            content: record.content.clone(),
            depth: record.depth,
            fetched_at: record.fetched_at,
        }
    }
}

/// Sink that mirrors saved pages into a JSON file
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    records: Mutex<Vec<JsonRecord>>,
}

impl JsonFileSink {
    /// Opens the sink, loading any array already stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let records = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        tracing::debug!("JSON export {} holds {} records", path.display(), records.len());

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> SinkResult<MutexGuard<'_, Vec<JsonRecord>>> {
        self.records
            .lock()
            .map_err(|_| SinkError::Rejected("JSON export lock poisoned".to_string()))
    }

    /// Writes the array next to the target, then renames it into place
    fn flush(&self, records: &[JsonRecord]) -> io::Result<()> {
        let staging = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&staging)?);
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.flush()?;
        }
        fs::rename(&staging, &self.path)
    }
}

impl Sink for JsonFileSink {
    fn save(&self, record: PageRecord) -> SinkResult<()> {
        let mut records = self.lock()?;
        records.push(JsonRecord::from(&record));
        if let Err(e) = self.flush(&records) {
            records.pop();
            return Err(e.into());
        }
        Ok(())
    }

    fn discard(&self, record: &PageRecord) -> SinkResult<()> {
        let mut records = self.lock()?;
        let position = records
            .iter()
            .rposition(|r| r.url == record.url && r.fetched_at == record.fetched_at);
        if let Some(index) = position {
            records.remove(index);
            self.flush(&records)?;
        }
        Ok(())
    }
}
