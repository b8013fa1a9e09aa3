//! Breadth-first traversal through the harvester

use crate::common::{harvester, page, urls, CollectingSink, FakeFetcher};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use topic_harvester::crawler::stop_channel;
use topic_harvester::seeds::{SeedOptions, SeedSource};
use topic_harvester::{FetchError, HarvestError};

const SEED: &str = "https://example.edu/admissions/graduate/msc-ai";
const APPLY: &str = "https://example.edu/admissions/graduate/msc-ai/apply";

#[tokio::test]
async fn test_keyword_link_followed_and_off_topic_rejected() {
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(
                SEED,
                page(
                    "MSc AI",
                    &["/admissions/graduate/msc-ai/apply", "https://example.edu/about"],
                ),
            )
            .page(
                APPLY,
                page("Apply", &["https://example.edu/admissions/graduate/msc-ai/apply/form"]),
            ),
    );
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 1, 4, &["msc"]);

    let result = harvester.traverse(&urls(&[SEED]), "initial").await.unwrap();

    assert_eq!(result.success_count, 2);
    assert_eq!(result.failure_count, 0);
    assert_eq!(result.batches, 2);
    assert_eq!(sink.saved_urls(), vec![SEED, APPLY]);
    assert_eq!(fetcher.fetched(), vec![SEED, APPLY]);

    let records = sink.records.lock().unwrap();
    assert_eq!(records[0].depth, 0);
    assert_eq!(records[1].depth, 1);
    assert_eq!(records[0].title.as_deref(), Some("MSc AI"));
    drop(records);

    let summaries = sink.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].batch_id, "initial");
    assert_eq!(summaries[0].result, result);
}

#[tokio::test]
async fn test_each_url_saved_once() {
    let a = "https://example.edu/msc";
    let b = "https://example.edu/msc/b";
    let c = "https://example.edu/msc/c";
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(a, page("A", &["/msc/b", "/msc/c", "/msc/c#fees"]))
            .page(b, page("B", &["/msc/c", "/msc", "/msc/b/"]))
            .page(c, page("C", &["/msc/b", "/msc"])),
    );
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 3, 2, &["msc"]);

    let result = harvester.traverse(&urls(&[a, a]), "initial").await.unwrap();

    assert_eq!(result.success_count, 3);
    let saved = sink.saved_urls();
    let unique: HashSet<_> = saved.iter().collect();
    assert_eq!(saved.len(), unique.len());
    assert_eq!(fetcher.fetched().len(), 3);
}

#[tokio::test]
async fn test_breadth_first_order() {
    let a = "https://example.edu/msc";
    let b1 = "https://example.edu/msc/b1";
    let b2 = "https://example.edu/msc/b2";
    let c1 = "https://example.edu/msc/b1/c1";
    let c2 = "https://example.edu/msc/b2/c2";
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(a, page("A", &["/msc/b1", "/msc/b2"]))
            .page(b1, page("B1", &["/msc/b1/c1"]))
            .page(b2, page("B2", &["/msc/b2/c2"]))
            .page(c1, page("C1", &[]))
            .page(c2, page("C2", &[])),
    );
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 2, 1, &["msc"]);

    harvester.traverse(&urls(&[a]), "initial").await.unwrap();

    assert_eq!(fetcher.fetched(), vec![a, b1, b2, c1, c2]);
    let depths: Vec<u32> = sink.records.lock().unwrap().iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1, 1, 2, 2]);
}

#[tokio::test]
async fn test_depth_zero_fetches_seeds_only() {
    let fetcher = Arc::new(FakeFetcher::new().page(SEED, page("MSc AI", &["/admissions/graduate/msc-ai/apply"])));
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 0, 4, &["msc"]);

    let result = harvester.traverse(&urls(&[SEED]), "initial").await.unwrap();

    assert_eq!(result.success_count, 1);
    assert_eq!(fetcher.fetched(), vec![SEED]);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_counts_as_failure_without_blocking_siblings() {
    let fast = "https://example.edu/msc/fast";
    let slow = "https://example.edu/msc/slow";
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(fast, page("Fast", &[]))
            .slow_page(slow, page("Slow", &[]), Duration::from_secs(30)),
    );
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 0, 4, &["msc"]);

    let result = harvester.traverse(&urls(&[slow, fast]), "initial").await.unwrap();

    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 1);
    assert_eq!(sink.saved_urls(), vec![fast]);
    assert_eq!(
        sink.failure_kinds(),
        vec![(slow.to_string(), "timeout".to_string())]
    );
}

#[tokio::test]
async fn test_sink_failure_counted_and_links_not_followed() {
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(SEED, page("MSc AI", &["/admissions/graduate/msc-ai/apply"]))
            .page(APPLY, page("Apply", &[])),
    );
    let sink = Arc::new(CollectingSink::new().rejecting(SEED));
    let harvester = harvester(fetcher.clone(), sink.clone(), 1, 4, &["msc"]);

    let result = harvester.traverse(&urls(&[SEED]), "initial").await.unwrap();

    assert_eq!(result.success_count, 0);
    assert_eq!(result.failure_count, 1);
    assert!(sink.saved_urls().is_empty());
    assert_eq!(
        sink.failure_kinds(),
        vec![(SEED.to_string(), "sink".to_string())]
    );
    assert_eq!(fetcher.fetched(), vec![SEED]);
}

#[tokio::test]
async fn test_unavailable_fetcher_aborts_before_any_fetch() {
    let fetcher = Arc::new(FakeFetcher::new().page(SEED, page("MSc AI", &[])).unavailable("no browser"));
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 1, 4, &["msc"]);

    let result = harvester.traverse(&urls(&[SEED]), "initial").await;

    assert!(matches!(result, Err(HarvestError::CollaboratorUnavailable(_))));
    assert!(fetcher.fetched().is_empty());
    assert!(sink.summaries().is_empty());
}

#[tokio::test]
async fn test_unavailable_mid_run_drains_batch_then_aborts() {
    let broken = "https://example.edu/msc/broken";
    let ok = "https://example.edu/msc/ok";
    let fetcher = Arc::new(
        FakeFetcher::new()
            .failing(broken, FetchError::Unavailable("driver crashed".into()))
            .page(ok, page("OK", &["/msc/ok/next"])),
    );
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 2, 4, &["msc"]);

    let result = harvester.traverse(&urls(&[broken, ok]), "initial").await;

    assert!(matches!(result, Err(HarvestError::CollaboratorUnavailable(_))));
    assert_eq!(sink.saved_urls(), vec![ok]);
    assert_eq!(fetcher.fetched(), vec![broken, ok]);
}

#[tokio::test]
async fn test_run_once_from_inline_seeds() {
    let fetcher = Arc::new(FakeFetcher::new().page(SEED, page("MSc AI", &[])));
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 1, 4, &["msc"]);

    let source = SeedSource::Inline(urls(&["http://example.edu/admissions/graduate/msc-ai"]));
    let options = SeedOptions {
        path_filter: None,
        force_https: true,
    };
    let result = harvester.run_once(&source, &options).await.unwrap();

    assert_eq!(result.success_count, 1);
    assert_eq!(sink.saved_urls(), vec![SEED]);
}

#[tokio::test]
async fn test_run_once_with_malformed_sitemap_fetches_nothing() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "<urlset><url><loc>{}", SEED).unwrap();

    let fetcher = Arc::new(FakeFetcher::new().page(SEED, page("MSc AI", &[])));
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 1, 4, &["msc"]);

    let source = SeedSource::Sitemap(file.path().display().to_string());
    let result = harvester.run_once(&source, &SeedOptions::default()).await;

    assert!(matches!(result, Err(HarvestError::SeedDiscovery { .. })));
    assert!(fetcher.fetched().is_empty());
    assert!(sink.summaries().is_empty());
}

#[tokio::test]
async fn test_rescrape_does_not_follow_links() {
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(SEED, page("MSc AI", &["/admissions/graduate/msc-ai/apply"]))
            .page(APPLY, page("Apply", &[])),
    );
    let sink = Arc::new(CollectingSink::new());
    let harvester = harvester(fetcher.clone(), sink.clone(), 3, 4, &["msc"]);

    let result = harvester
        .rescrape(&urls(&[SEED]), "rescheduled-1")
        .await
        .unwrap();

    assert_eq!(result.success_count, 1);
    assert_eq!(fetcher.fetched(), vec![SEED]);
    assert_eq!(sink.summaries()[0].batch_id, "rescheduled-1");
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_first_batch_ends_traversal() {
    let a = "https://example.edu/msc/a";
    let b = "https://example.edu/msc/b";
    let c = "https://example.edu/msc/c";
    let d = "https://example.edu/msc/d";
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(a, page("A", &["/msc/c"]))
            .page(b, page("B", &["/msc/d"]))
            .page(c, page("C", &[]))
            .page(d, page("D", &[]))
            .with_delay(Duration::from_secs(1)),
    );
    let sink = Arc::new(CollectingSink::new());
    let (handle, signal) = stop_channel();
    let harvester =
        harvester(fetcher.clone(), sink.clone(), 2, 2, &["msc"]).with_stop_signal(signal);

    let seeds = urls(&[a, b]);
    let stopper = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.stop();
    };
    let (result, ()) = tokio::join!(harvester.traverse(&seeds, "initial"), stopper);
    let result = result.unwrap();

    // The in-flight batch completes; its links are never fetched
    let saved: HashSet<String> = sink.saved_urls().into_iter().collect();
    assert_eq!(saved, HashSet::from([a.to_string(), b.to_string()]));
    assert_eq!(fetcher.fetched(), vec![a, b]);
    assert_eq!(result.batches, 1);
    assert_eq!(result.success_count + result.failure_count, 2);
    assert_eq!(sink.summaries().len(), 1);
}
