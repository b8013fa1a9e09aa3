//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::storage::{BatchRecord, Storage};
use crate::HarvestError;
use std::collections::BTreeMap;

/// Number of batch summaries shown by default
pub const RECENT_BATCH_LIMIT: usize = 10;

/// Harvest statistics summary
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    /// Saved page rows, rescrapes included
    pub total_pages: u64,

    /// Distinct URLs among saved pages
    pub unique_urls: u64,

    /// Saved pages per traversal depth
    pub depth_breakdown: BTreeMap<u32, u64>,

    /// Total failure rows
    pub total_failures: u64,

    /// Failure counts per stage
    pub failure_summary: BTreeMap<String, u64>,

    /// Latest batch summaries, newest first
    pub recent_batches: Vec<BatchRecord>,
}

impl HarvestStatistics {
    /// Share of attempted fetches that ended in a saved page
    pub fn success_rate(&self) -> f64 {
        let attempted = self.total_pages + self.total_failures;
        if attempted == 0 {
            0.0
        } else {
            (self.total_pages as f64 / attempted as f64) * 100.0
        }
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<HarvestStatistics, HarvestError> {
    Ok(HarvestStatistics {
        total_pages: storage.count_pages()?,
        unique_urls: storage.count_unique_urls()?,
        depth_breakdown: storage.depth_breakdown()?,
        total_failures: storage.count_failures()?,
        failure_summary: storage.failure_summary()?,
        recent_batches: storage.recent_batches(RECENT_BATCH_LIMIT)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Pages saved: {}", stats.total_pages);
    println!("  Unique URLs: {}", stats.unique_urls);
    println!("  Failures: {}", stats.total_failures);
    println!();

    if !stats.depth_breakdown.is_empty() {
        println!("Pages by Depth:");
        for (depth, count) in &stats.depth_breakdown {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    if !stats.failure_summary.is_empty() {
        println!("Failure Summary:");
        let mut counts: Vec<_> = stats.failure_summary.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    if !stats.recent_batches.is_empty() {
        println!("Recent Batches ({}):", stats.recent_batches.len());
        for batch in &stats.recent_batches {
            println!(
                "  {} {} ok={} failed={} batches={} peak_memory={} config={}",
                batch.finished_at,
                batch.batch_id,
                batch.success_count,
                batch.failure_count,
                batch.batches,
                batch.peak_memory_bytes,
                short_hash(&batch.config_hash)
            );
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} saved / {} attempted)",
        stats.success_rate(),
        stats.total_pages,
        stats.total_pages + stats.total_failures
    );
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
