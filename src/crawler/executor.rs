//! Bounded-concurrency batch execution
//!
//! URLs are processed in batches of at most `concurrency_limit`. Every
//! fetch → extract → save pipeline in a batch runs concurrently, and the
//! next batch does not start until the whole batch has finished. Per-URL
//! failures are counted, logged and offered to the sink; they never stop
//! sibling URLs or later batches. The one exception is the fetch mechanism
//! itself being unavailable, which ends the run with
//! [`HarvestError::CollaboratorUnavailable`] once the current batch drains.
//! A stop request lets the current batch finish and skips the rest.

use crate::crawler::collaborator::{Extractor, Fetcher};
use crate::crawler::memory::current_memory_bytes;
use crate::crawler::model::{BatchResult, FrontierEntry, PageRecord};
use crate::crawler::timing::StopSignal;
use crate::output::{BatchSummary, Sink};
use crate::{truncate_message, FetchError, HarvestError, PageFailure, MESSAGE_LIMIT};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// A page that made it all the way to the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPage {
    pub url: String,
    pub depth: u32,
    /// Outbound links, handed back to the frontier by the caller
    pub links: Vec<String>,
}

/// Drives fetch, extract and save for groups of URLs
pub struct BatchExecutor {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    sink: Arc<dyn Sink>,
    fetch_timeout: Duration,
    stop: StopSignal,
}

impl BatchExecutor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        sink: Arc<dyn Sink>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            sink,
            fetch_timeout,
            stop: StopSignal::never(),
        }
    }

    /// Skips the remaining batches once `stop` fires
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// Brings the fetch mechanism up; failure is fatal for the run
    pub async fn prepare(&self) -> Result<(), HarvestError> {
        self.fetcher.prepare().await.map_err(|e| {
            HarvestError::CollaboratorUnavailable(truncate_message(&e.to_string(), MESSAGE_LIMIT))
        })
    }

    /// Processes a fixed URL list in batches of `concurrency_limit`
    ///
    /// Every URL is recorded at depth 0 and no links are followed. On success
    /// `success_count + failure_count == urls.len()` unless a stop cut the
    /// list short, in which case the counts cover the batches that ran.
    pub async fn run(
        &self,
        batch_id: &str,
        urls: &[String],
        concurrency_limit: usize,
    ) -> Result<BatchResult, HarvestError> {
        self.prepare().await?;

        let entries: Vec<FrontierEntry> = urls
            .iter()
            .map(|url| FrontierEntry::new(url.clone(), 0))
            .collect();

        tracing::info!(
            "Starting {}: {} URLs, concurrency limit {}",
            batch_id,
            entries.len(),
            concurrency_limit
        );

        let mut result = BatchResult::default();
        for (index, batch) in entries.chunks(concurrency_limit.max(1)).enumerate() {
            if self.is_stopped() {
                let done = index * concurrency_limit.max(1);
                tracing::info!(
                    "Stop requested, skipping {} of {} URLs",
                    entries.len() - done,
                    entries.len()
                );
                break;
            }
            self.execute_batch(batch, &mut result).await?;
        }

        Ok(self.finish(batch_id, result).result)
    }

    /// Runs one batch to completion and folds its outcome into `result`
    ///
    /// Memory is sampled before and after the batch. Returns the pages that
    /// were saved, in batch order.
    pub async fn execute_batch(
        &self,
        batch: &[FrontierEntry],
        result: &mut BatchResult,
    ) -> Result<Vec<ProcessedPage>, HarvestError> {
        result.peak_memory_bytes = result.peak_memory_bytes.max(current_memory_bytes());

        let outcomes = join_all(batch.iter().map(|entry| self.process(entry))).await;
        result.batches += 1;

        let mut processed = Vec::with_capacity(batch.len());
        let mut fatal = None;

        for (entry, outcome) in batch.iter().zip(outcomes) {
            match outcome {
                Ok(page) => {
                    result.success_count += 1;
                    processed.push(page);
                }
                Err(failure) => {
                    result.failure_count += 1;
                    let message = truncate_message(&failure.to_string(), MESSAGE_LIMIT);
                    tracing::warn!(
                        "Failed {} (depth {}, {}): {}",
                        entry.url,
                        entry.depth,
                        failure.kind(),
                        message
                    );
                    if let Err(e) = self.sink.record_failure(&entry.url, failure.kind(), &message)
                    {
                        tracing::warn!("Could not record failure for {}: {}", entry.url, e);
                    }
                    if failure.is_fatal() && fatal.is_none() {
                        fatal = Some(message);
                    }
                }
            }
        }

        result.peak_memory_bytes = result.peak_memory_bytes.max(current_memory_bytes());
        tracing::debug!(
            "Batch {} done: {} ok, {} failed so far",
            result.batches,
            result.success_count,
            result.failure_count
        );

        match fatal {
            Some(message) => {
                tracing::error!("Fetch collaborator unavailable, aborting run: {}", message);
                Err(HarvestError::CollaboratorUnavailable(message))
            }
            None => Ok(processed),
        }
    }

    /// Logs and records the summary for a finished invocation
    pub fn finish(&self, batch_id: &str, result: BatchResult) -> BatchSummary {
        let summary = BatchSummary::new(batch_id, result);
        tracing::info!("{}", summary);
        if let Err(e) = self.sink.record_summary(&summary) {
            tracing::warn!("Could not record summary for {}: {}", batch_id, e);
        }
        summary
    }

    /// Fetch → extract → save for one URL
    async fn process(&self, entry: &FrontierEntry) -> Result<ProcessedPage, PageFailure> {
        let deadline = self.fetch_timeout + self.fetcher.render_delay();
        let markup = tokio::time::timeout(
            deadline,
            self.fetcher.fetch(&entry.url, self.fetch_timeout),
        )
        .await
        .map_err(|_| FetchError::Timeout(self.fetch_timeout))??;

        let extracted = self.extractor.extract(&markup, &entry.url)?;

        self.sink.save(PageRecord {
            url: entry.url.clone(),
            title: extracted.title,
            content: extracted.text,
            depth: entry.depth,
            fetched_at: Utc::now(),
        })?;

        tracing::debug!("Saved {} (depth {})", entry.url, entry.depth);
        Ok(ProcessedPage {
            url: entry.url.clone(),
            depth: entry.depth,
            links: extracted.links,
        })
    }
}
