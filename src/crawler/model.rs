//! Records exchanged between the frontier, the executor and the sinks

use chrono::{DateTime, Utc};
use std::ops::AddAssign;

/// A URL waiting in the frontier, tagged with its hop count from a seed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrontierEntry {
    /// Normalized URL
    pub url: String,

    /// Number of link hops from the seed list
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// One successfully harvested page, handed to the sink and then forgotten
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub url: String,
    pub title: Option<String>,
    pub content: String,
    pub depth: u32,
    pub fetched_at: DateTime<Utc>,
}

/// Aggregate outcome of one executor invocation
///
/// `success_count + failure_count` always equals the number of URLs that
/// were submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Pages fetched, extracted and durably saved
    pub success_count: usize,

    /// Pages that failed at any stage
    pub failure_count: usize,

    /// Highest resident memory sampled around any batch, in bytes
    pub peak_memory_bytes: u64,

    /// Number of concurrency-bounded batches that were executed
    pub batches: usize,
}

impl BatchResult {
    /// Total URLs accounted for
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }
}

impl AddAssign for BatchResult {
    fn add_assign(&mut self, other: Self) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
        self.peak_memory_bytes = self.peak_memory_bytes.max(other.peak_memory_bytes);
        self.batches += other.batches;
    }
}
