//! Sink trait and batch summary types
//!
//! A sink takes ownership of each finished [`PageRecord`]. Failures and batch
//! summaries are offered to it as well; sinks that have nowhere to put them
//! keep the default no-op implementations.

use crate::crawler::{BatchResult, PageRecord};
use crate::SinkError;
use std::fmt;
use std::sync::Arc;

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// One line of run output: which batch run, and how it went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Label of the executor invocation (`initial`, `rescheduled-3`, ...)
    pub batch_id: String,
    pub result: BatchResult,
}

impl BatchSummary {
    pub fn new(batch_id: impl Into<String>, result: BatchResult) -> Self {
        Self {
            batch_id: batch_id.into(),
            result,
        }
    }
}

impl fmt::Display for BatchSummary {
    /// Renders `batch_id=... success_count=... failure_count=... peak_memory_bytes=...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch_id={} success_count={} failure_count={} peak_memory_bytes={}",
            self.batch_id,
            self.result.success_count,
            self.result.failure_count,
            self.result.peak_memory_bytes
        )
    }
}

/// Persistence collaborator for harvested pages
///
/// Implementations must be thread-safe: several pages of one batch are
/// saved concurrently.
pub trait Sink: Send + Sync {
    /// Persists one page; the page only counts as harvested if this succeeds
    fn save(&self, record: PageRecord) -> SinkResult<()>;

    /// Records a per-URL failure
    ///
    /// # Arguments
    ///
    /// * `url` - The URL that failed
    /// * `kind` - Stage that failed (`timeout`, `fetch`, `extraction`, `sink`)
    /// * `message` - Truncated error message
    fn record_failure(&self, url: &str, kind: &str, message: &str) -> SinkResult<()> {
        let _ = (url, kind, message);
        Ok(())
    }

    /// Records the summary of one executor invocation
    fn record_summary(&self, summary: &BatchSummary) -> SinkResult<()> {
        let _ = summary;
        Ok(())
    }

    /// Undoes a successful [`Sink::save`] of `record`
    ///
    /// Called when another sink in the same fan-out rejected the page.
    fn discard(&self, record: &PageRecord) -> SinkResult<()> {
        let _ = record;
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn save(&self, record: PageRecord) -> SinkResult<()> {
        (**self).save(record)
    }

    fn record_failure(&self, url: &str, kind: &str, message: &str) -> SinkResult<()> {
        (**self).record_failure(url, kind, message)
    }

    fn record_summary(&self, summary: &BatchSummary) -> SinkResult<()> {
        (**self).record_summary(summary)
    }

    fn discard(&self, record: &PageRecord) -> SinkResult<()> {
        (**self).discard(record)
    }
}

/// Fans every call out to several sinks
///
/// A page counts as saved only if every sink accepted it. When one sink
/// rejects a page, the sinks that already took it are asked to discard it,
/// newest first.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn Sink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl Sink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Sink for MultiSink {
    fn save(&self, record: PageRecord) -> SinkResult<()> {
        for (index, sink) in self.sinks.iter().enumerate() {
            if let Err(e) = sink.save(record.clone()) {
                for saved in self.sinks[..index].iter().rev() {
                    if let Err(undo) = saved.discard(&record) {
                        tracing::warn!(
                            "Could not discard {} after failed save: {}",
                            record.url,
                            undo
                        );
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn discard(&self, record: &PageRecord) -> SinkResult<()> {
        for sink in self.sinks.iter().rev() {
            sink.discard(record)?;
        }
        Ok(())
    }

    fn record_failure(&self, url: &str, kind: &str, message: &str) -> SinkResult<()> {
        for sink in &self.sinks {
            sink.record_failure(url, kind, message)?;
        }
        Ok(())
    }

    fn record_summary(&self, summary: &BatchSummary) -> SinkResult<()> {
        for sink in &self.sinks {
            sink.record_summary(summary)?;
        }
        Ok(())
    }
}
