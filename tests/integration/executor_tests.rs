//! Batch grouping and failure accounting in the executor

use crate::common::{executor, page, urls, CollectingSink, FakeFetcher};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use topic_harvester::crawler::stop_channel;
use topic_harvester::{FetchError, HarvestError};

fn numbered(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://example.edu/msc/{}", i))
        .collect()
}

fn fetcher_for(list: &[String]) -> FakeFetcher {
    list.iter().fold(FakeFetcher::new(), |fetcher, url| {
        fetcher.page(url, page("MSc", &[]))
    })
}

#[tokio::test(start_paused = true)]
async fn test_ten_urls_limit_three_run_in_four_batches() {
    let list = numbered(10);
    let fetcher = Arc::new(fetcher_for(&list).with_delay(Duration::from_secs(1)));
    let sink = Arc::new(CollectingSink::new());
    let executor = executor(fetcher.clone(), sink.clone());

    let result = executor.run("initial", &list, 3).await.unwrap();

    assert_eq!(result.success_count, 10);
    assert_eq!(result.failure_count, 0);
    assert_eq!(result.batches, 4);
    assert_eq!(fetcher.peak_in_flight(), 3);

    // Each batch starts one second after the previous one finished
    let calls = fetcher.calls();
    let start = calls[0].1;
    let mut per_second: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for (url, at) in calls {
        per_second
            .entry((at - start).as_secs())
            .or_default()
            .push(url);
    }
    let sizes: Vec<usize> = per_second.values().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);
    assert_eq!(per_second[&0], list[0..3].to_vec());
    assert_eq!(per_second[&3], list[9..10].to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_never_exceeds_limit() {
    let list = numbered(7);
    let fetcher = Arc::new(fetcher_for(&list).with_delay(Duration::from_millis(200)));
    let sink = Arc::new(CollectingSink::new());
    let executor = executor(fetcher.clone(), sink.clone());

    let result = executor.run("initial", &list, 5).await.unwrap();

    assert_eq!(result.batches, 2);
    assert!(fetcher.peak_in_flight() <= 5);
    assert_eq!(sink.saved_urls().len(), 7);
}

#[tokio::test(start_paused = true)]
async fn test_stop_lets_current_batch_finish_and_skips_the_rest() {
    let list = numbered(6);
    let fetcher = Arc::new(fetcher_for(&list).with_delay(Duration::from_secs(1)));
    let sink = Arc::new(CollectingSink::new());
    let (handle, signal) = stop_channel();
    let executor = executor(fetcher.clone(), sink.clone()).with_stop_signal(signal);

    let stopper = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.stop();
    };
    let (result, ()) = tokio::join!(executor.run("rescheduled-1", &list, 3), stopper);
    let result = result.unwrap();

    assert_eq!(result.batches, 1);
    assert_eq!(result.success_count, 3);
    assert_eq!(result.total(), 3);
    assert_eq!(fetcher.fetched(), list[0..3].to_vec());
    assert_eq!(sink.saved_urls().len(), 3);

    let summaries = sink.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].result, result);
}

#[tokio::test]
async fn test_stop_before_run_fetches_nothing() {
    let list = numbered(4);
    let fetcher = Arc::new(fetcher_for(&list));
    let sink = Arc::new(CollectingSink::new());
    let (handle, signal) = stop_channel();
    handle.stop();
    let executor = executor(fetcher.clone(), sink.clone()).with_stop_signal(signal);

    let result = executor.run("rescheduled-1", &list, 2).await.unwrap();

    assert_eq!(result.total(), 0);
    assert!(fetcher.fetched().is_empty());
    assert_eq!(sink.summaries().len(), 1);
}

#[tokio::test]
async fn test_counts_always_add_up() {
    let ok = "https://example.edu/msc/ok";
    let empty = "https://example.edu/msc/empty";
    let reset = "https://example.edu/msc/reset";
    let missing = "https://example.edu/msc/missing";
    let fetcher = Arc::new(
        FakeFetcher::new()
            .page(ok, page("OK", &[]))
            .page(empty, "   ".to_string())
            .failing(reset, FetchError::Network("connection reset".into())),
    );
    let sink = Arc::new(CollectingSink::new());
    let executor = executor(fetcher, sink.clone());
    let list = urls(&[ok, empty, reset, missing]);

    let result = executor.run("initial", &list, 2).await.unwrap();

    assert_eq!(result.success_count + result.failure_count, list.len());
    assert_eq!(result.success_count, 1);
    assert_eq!(sink.saved_urls(), vec![ok]);

    let kinds: BTreeMap<String, String> = sink.failure_kinds().into_iter().collect();
    assert_eq!(kinds[empty], "extraction");
    assert_eq!(kinds[reset], "fetch");
    assert_eq!(kinds[missing], "fetch");
}

#[tokio::test]
async fn test_fixed_list_saved_at_depth_zero() {
    let list = numbered(3);
    let fetcher = Arc::new(fetcher_for(&list));
    let sink = Arc::new(CollectingSink::new());
    let executor = executor(fetcher, sink.clone());

    executor.run("rescheduled-2", &list, 10).await.unwrap();

    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.depth == 0));
    drop(records);

    let summaries = sink.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].batch_id, "rescheduled-2");
    assert_eq!(summaries[0].result.batches, 1);
}

#[tokio::test]
async fn test_empty_list_yields_zero_counts() {
    let fetcher = Arc::new(FakeFetcher::new());
    let sink = Arc::new(CollectingSink::new());
    let executor = executor(fetcher.clone(), sink.clone());

    let result = executor.run("initial", &[], 3).await.unwrap();

    assert_eq!(result.total(), 0);
    assert_eq!(result.batches, 0);
    assert!(fetcher.fetched().is_empty());
    assert_eq!(sink.summaries().len(), 1);
}

#[tokio::test]
async fn test_prepare_failure_is_run_level_error() {
    let list = numbered(2);
    let fetcher = Arc::new(fetcher_for(&list).unavailable("headless browser missing"));
    let sink = Arc::new(CollectingSink::new());
    let executor = executor(fetcher.clone(), sink.clone());

    match executor.run("initial", &list, 2).await {
        Err(HarvestError::CollaboratorUnavailable(message)) => {
            assert!(message.contains("headless browser missing"))
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(fetcher.fetched().is_empty());
    assert!(sink.failure_kinds().is_empty());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_peak_memory_sampled() {
    let list = numbered(1);
    let fetcher = Arc::new(fetcher_for(&list));
    let sink = Arc::new(CollectingSink::new());
    let executor = executor(fetcher, sink);

    let result = executor.run("initial", &list, 1).await.unwrap();

    assert!(result.peak_memory_bytes > 0);
}
