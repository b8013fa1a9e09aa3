//! In-memory collaborators shared by the integration tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use topic_harvester::crawler::{
    BatchExecutor, Fetcher, HarvestSettings, Harvester, HtmlExtractor, PageRecord,
};
use topic_harvester::output::{BatchSummary, Sink, SinkResult};
use topic_harvester::seeds::SeedLoader;
use topic_harvester::{AdmissionFilter, FetchError, SinkError};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds a page whose body links to each of `links`
pub fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{} content</p>{}</body></html>",
        title, title, anchors
    )
}

struct FakeResponse {
    result: Result<String, FetchError>,
    delay: Duration,
}

/// Fetcher serving canned responses; unknown URLs answer 404
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, FakeResponse>,
    default_delay: Duration,
    unavailable: Option<String>,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, markup: String) -> Self {
        self.responses.insert(
            url.to_string(),
            FakeResponse {
                result: Ok(markup),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn slow_page(mut self, url: &str, markup: String, delay: Duration) -> Self {
        self.responses.insert(
            url.to_string(),
            FakeResponse {
                result: Ok(markup),
                delay,
            },
        );
        self
    }

    pub fn failing(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(
            url.to_string(),
            FakeResponse {
                result: Err(error),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Every fetch takes at least this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// `prepare` fails as if the fetch mechanism could not start
    pub fn unavailable(mut self, reason: &str) -> Self {
        self.unavailable = Some(reason.to_string());
        self
    }

    /// URLs fetched, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// URLs with the instant their fetch started
    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn prepare(&self) -> Result<(), FetchError> {
        match &self.unavailable {
            Some(reason) => Err(FetchError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let (result, delay) = match self.responses.get(url) {
            Some(response) => (response.result.clone(), response.delay),
            None => (Err(FetchError::Status(404)), Duration::ZERO),
        };
        tokio::time::sleep(self.default_delay.max(delay)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Sink keeping everything it is given in memory
#[derive(Default)]
pub struct CollectingSink {
    pub records: Mutex<Vec<PageRecord>>,
    pub failures: Mutex<Vec<(String, String)>>,
    pub summaries: Mutex<Vec<BatchSummary>>,
    reject: HashSet<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses to save the given URL
    pub fn rejecting(mut self, url: &str) -> Self {
        self.reject.insert(url.to_string());
        self
    }

    pub fn saved_urls(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    pub fn failure_kinds(&self) -> Vec<(String, String)> {
        self.failures.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> Vec<BatchSummary> {
        self.summaries.lock().unwrap().clone()
    }
}

impl Sink for CollectingSink {
    fn save(&self, record: PageRecord) -> SinkResult<()> {
        if self.reject.contains(&record.url) {
            return Err(SinkError::Rejected("disk full".to_string()));
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    fn record_failure(&self, url: &str, kind: &str, _message: &str) -> SinkResult<()> {
        self.failures
            .lock()
            .unwrap()
            .push((url.to_string(), kind.to_string()));
        Ok(())
    }

    fn record_summary(&self, summary: &BatchSummary) -> SinkResult<()> {
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

pub fn executor(fetcher: Arc<FakeFetcher>, sink: Arc<CollectingSink>) -> BatchExecutor {
    BatchExecutor::new(fetcher, Arc::new(HtmlExtractor::new()), sink, FETCH_TIMEOUT)
}

pub fn harvester(
    fetcher: Arc<FakeFetcher>,
    sink: Arc<CollectingSink>,
    max_depth: u32,
    concurrency_limit: usize,
    keywords: &[&str],
) -> Harvester {
    let settings = HarvestSettings {
        max_depth,
        concurrency_limit,
        filter: AdmissionFilter::new(keywords.iter(), "example.edu"),
    };
    Harvester::new(
        executor(fetcher, sink),
        settings,
        SeedLoader::new(reqwest::Client::new(), FETCH_TIMEOUT),
    )
}

pub fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}
