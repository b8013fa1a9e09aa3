//! Run orchestration
//!
//! The [`Harvester`] ties the pieces together:
//! - resolves seeds from the configured source
//! - builds a fresh [`FrontierManager`] per run
//! - pulls breadth-first batches and hands them to the [`BatchExecutor`]
//! - feeds links from saved pages back into the frontier
//!
//! The frontier is only touched here, between batches, so executor tasks
//! never mutate it.

use crate::config::Config;
use crate::crawler::executor::BatchExecutor;
use crate::crawler::extractor::HtmlExtractor;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::frontier::{FrontierManager, Rejection};
use crate::crawler::model::BatchResult;
use crate::crawler::scheduler::CrawlJob;
use crate::crawler::timing::StopSignal;
use crate::output::{sink_from_config, Sink};
use crate::seeds::{SeedLoader, SeedOptions, SeedSource};
use crate::url::AdmissionFilter;
use crate::HarvestError;
use async_trait::async_trait;
use std::sync::Arc;

/// Batch label of the first run
pub const INITIAL_BATCH_ID: &str = "initial";

/// Traversal parameters fixed for the lifetime of a harvester
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub max_depth: u32,
    pub concurrency_limit: usize,
    pub filter: AdmissionFilter,
}

impl HarvestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            concurrency_limit: config.crawler.concurrency_limit.max(1) as usize,
            filter: config.filter.admission_filter(),
        }
    }
}

/// Orchestrates seed discovery, traversal and fixed-list rescrapes
pub struct Harvester {
    executor: BatchExecutor,
    settings: HarvestSettings,
    seeds: SeedLoader,
}

impl Harvester {
    pub fn new(executor: BatchExecutor, settings: HarvestSettings, seeds: SeedLoader) -> Self {
        Self {
            executor,
            settings,
            seeds,
        }
    }

    /// Ends traversals and rescrapes between batches once `stop` fires
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.executor = self.executor.with_stop_signal(stop);
        self
    }

    /// Builds the production harvester: HTTP fetcher, HTML extractor and the
    /// configured sinks
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Hash stored alongside batch summaries
    /// * `stop` - Stop signal that cuts fetcher waits and traversals short
    pub fn from_config(
        config: &Config,
        config_hash: &str,
        stop: StopSignal,
    ) -> Result<Self, HarvestError> {
        let fetcher =
            HttpFetcher::new(&config.user_agent, &config.crawler)?.with_stop_signal(stop.clone());
        let seeds = SeedLoader::new(fetcher.client().clone(), config.crawler.fetch_timeout());
        let sink: Arc<dyn Sink> = Arc::new(sink_from_config(&config.output, config_hash)?);

        let executor = BatchExecutor::new(
            Arc::new(fetcher),
            Arc::new(HtmlExtractor::new()),
            sink,
            config.crawler.fetch_timeout(),
        );

        Ok(Self::new(executor, HarvestSettings::from_config(config), seeds).with_stop_signal(stop))
    }

    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    pub fn executor(&self) -> &BatchExecutor {
        &self.executor
    }

    /// Resolves seeds without harvesting anything
    pub async fn discover_seeds(
        &self,
        source: &SeedSource,
        options: &SeedOptions,
    ) -> Result<Vec<String>, HarvestError> {
        self.seeds.load(source, options).await
    }

    /// Discovers seeds and runs one full depth-bounded traversal
    ///
    /// Seed discovery failure ends the call before any page is fetched.
    pub async fn run_once(
        &self,
        source: &SeedSource,
        options: &SeedOptions,
    ) -> Result<BatchResult, HarvestError> {
        let seeds = self.discover_seeds(source, options).await?;
        self.traverse(&seeds, INITIAL_BATCH_ID).await
    }

    /// Breadth-first traversal from `seeds`
    pub async fn traverse(
        &self,
        seeds: &[String],
        batch_id: &str,
    ) -> Result<BatchResult, HarvestError> {
        self.executor.prepare().await?;

        let mut frontier = FrontierManager::new(self.settings.max_depth, self.settings.filter.clone());
        let seeded = frontier.seed(seeds);
        tracing::info!(
            "Starting {}: {} seeds, max depth {}, concurrency limit {}",
            batch_id,
            seeded,
            self.settings.max_depth,
            self.settings.concurrency_limit
        );

        let mut result = BatchResult::default();
        loop {
            if self.executor.is_stopped() {
                tracing::info!("Stop requested, ending traversal with {} URLs queued", frontier.len());
                break;
            }

            let batch = frontier.take_batch(self.settings.concurrency_limit);
            if batch.is_empty() {
                tracing::info!("Frontier is empty, traversal complete");
                break;
            }

            let pages = self.executor.execute_batch(&batch, &mut result).await?;

            let mut admitted = 0;
            for page in &pages {
                for link in &page.links {
                    match frontier.admit(link, page.depth) {
                        Ok(entry) => {
                            admitted += 1;
                            tracing::debug!("  Found: {} (depth {})", entry.url, entry.depth);
                        }
                        Err(Rejection::AlreadyVisited | Rejection::AlreadyQueued) => {}
                        Err(reason) => tracing::trace!("Rejected {}: {}", link, reason),
                    }
                }
            }

            tracing::info!(
                "Progress: {} pages saved, {} failed, {} newly queued, {} in frontier",
                result.success_count,
                result.failure_count,
                admitted,
                frontier.len()
            );
        }

        Ok(self.executor.finish(batch_id, result).result)
    }

    /// Re-harvests a fixed URL list without following links
    pub async fn rescrape(
        &self,
        urls: &[String],
        batch_id: &str,
    ) -> Result<BatchResult, HarvestError> {
        self.executor
            .run(batch_id, urls, self.settings.concurrency_limit)
            .await
    }
}

#[async_trait]
impl CrawlJob for Harvester {
    async fn run(&self, urls: &[String], batch_id: &str) -> Result<BatchResult, HarvestError> {
        self.rescrape(urls, batch_id).await
    }
}
