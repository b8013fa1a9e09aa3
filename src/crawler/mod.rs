//! Crawler module: the harvesting core
//!
//! This module contains:
//! - the fetch/extract capability traits and their HTTP/HTML implementations
//! - the breadth-first frontier with keyword/domain admission
//! - the bounded-concurrency batch executor
//! - run orchestration and the recrawl scheduler
//! - cancellable waits and memory sampling

mod collaborator;
mod executor;
mod extractor;
mod fetcher;
mod frontier;
mod harvester;
mod memory;
mod model;
mod scheduler;
mod timing;

pub use collaborator::{Extracted, Extractor, Fetcher};
pub use executor::{BatchExecutor, ProcessedPage};
pub use extractor::HtmlExtractor;
pub use fetcher::{build_http_client, HttpFetcher};
pub use frontier::{FrontierManager, Rejection};
pub use harvester::{HarvestSettings, Harvester, INITIAL_BATCH_ID};
pub use memory::current_memory_bytes;
pub use model::{BatchResult, FrontierEntry, PageRecord};
pub use scheduler::{CrawlJob, RecrawlScheduler, ScheduleReport, ScheduledRun, SchedulerState};
pub use timing::{stop_channel, wait_named, StopHandle, StopSignal, WaitOutcome};
