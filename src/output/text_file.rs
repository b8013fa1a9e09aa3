//! Plain-text page dump
//!
//! Writes one `.txt` file per saved page. The file name is the URL with the
//! scheme stripped and `/` replaced by `_`, cut to a safe length, then a short
//! hash of the full URL and the local fetch time down to the nanosecond, so
//! rescrapes of the same URL land in separate files.

use crate::crawler::PageRecord;
use crate::output::traits::{Sink, SinkResult};
use chrono::Local;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Longest stem in bytes; leaves room for hash and timestamp under 255
const MAX_STEM_BYTES: usize = 150;

/// Sink that writes page text into a directory
#[derive(Debug, Clone)]
pub struct TextFileSink {
    directory: PathBuf,
}

impl TextFileSink {
    /// Creates the sink, creating `directory` if it does not exist
    pub fn new(directory: impl Into<PathBuf>) -> io::Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Where `record` is written
    pub fn path_for(&self, record: &PageRecord) -> PathBuf {
        let digest = Sha256::digest(record.url.as_bytes());
        let stamp = record
            .fetched_at
            .with_timezone(&Local)
            .format("%Y%m%d_%H%M%S_%9f");
        self.directory.join(format!(
            "{}_{}_{}.txt",
            file_stem_for(&record.url),
            hex::encode(&digest[..4]),
            stamp
        ))
    }
}

/// File stem for a URL: scheme stripped, path separators flattened
///
/// Characters that are not safe in file names on common platforms are
/// replaced as well. The stem is cut at a character boundary.
pub fn file_stem_for(url: &str) -> String {
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);

    let mut stem = String::new();
    for c in without_scheme.trim_end_matches('/').chars() {
        let c = match c {
            '/' => '_',
            '?' | '*' | ':' | '"' | '<' | '>' | '|' | '\\' => '-',
            c => c,
        };
        if stem.len() + c.len_utf8() > MAX_STEM_BYTES {
            break;
        }
        stem.push(c);
    }
    stem
}

impl Sink for TextFileSink {
    fn save(&self, record: PageRecord) -> SinkResult<()> {
        let path = self.path_for(&record);

        let mut body = String::new();
        if let Some(title) = &record.title {
            body.push_str(title);
            body.push_str("\n\n");
        }
        body.push_str(&record.content);

        fs::write(&path, body)?;
        tracing::trace!("Wrote {}", path.display());
        Ok(())
    }

    fn discard(&self, record: &PageRecord) -> SinkResult<()> {
        let path = self.path_for(record);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
