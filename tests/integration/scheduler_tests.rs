//! Recrawl scheduling over a real harvester with fake collaborators

use crate::common::{harvester, page, urls, CollectingSink, FakeFetcher};
use std::sync::Arc;
use std::time::Duration;
use topic_harvester::crawler::{stop_channel, RecrawlScheduler, SchedulerState, StopSignal};

const A: &str = "https://example.edu/msc/a";
const B: &str = "https://example.edu/msc/b";

fn fetcher() -> FakeFetcher {
    FakeFetcher::new()
        .page(A, page("A", &["/msc/a/next"]))
        .page(B, page("B", &[]))
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_runs_once_and_stops() {
    let fetcher = Arc::new(fetcher());
    let sink = Arc::new(CollectingSink::new());
    let job = harvester(fetcher.clone(), sink.clone(), 2, 4, &["msc"]);

    let mut scheduler = RecrawlScheduler::new(job, urls(&[A, B]), Duration::ZERO);
    let report = scheduler.run(StopSignal::never()).await;

    assert_eq!(report.runs, 1);
    assert_eq!(report.final_state, SchedulerState::Stopped);
    assert_eq!(report.history[0].batch_id, "initial");
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    // Fixed list only: the link on A is not followed
    assert_eq!(fetcher.fetched(), vec![A, B]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_list_stops_without_running() {
    let fetcher = Arc::new(fetcher());
    let sink = Arc::new(CollectingSink::new());
    let job = harvester(fetcher.clone(), sink.clone(), 2, 4, &["msc"]);

    let mut scheduler = RecrawlScheduler::new(job, Vec::new(), Duration::from_secs(3600));
    let report = scheduler.run(StopSignal::never()).await;

    assert_eq!(report.runs, 0);
    assert_eq!(report.final_state, SchedulerState::Stopped);
    assert!(fetcher.fetched().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_limit_labels_each_run() {
    let fetcher = Arc::new(fetcher());
    let sink = Arc::new(CollectingSink::new());
    let job = harvester(fetcher.clone(), sink.clone(), 2, 4, &["msc"]);

    let mut scheduler = RecrawlScheduler::new(job, urls(&[A, B]), Duration::from_secs(3600))
        .with_max_runs(Some(3));
    let report = scheduler.run(StopSignal::never()).await;

    assert_eq!(report.runs, 3);
    assert_eq!(report.failed_runs, 0);
    let labels: Vec<String> = sink.summaries().into_iter().map(|s| s.batch_id).collect();
    assert_eq!(labels, vec!["initial", "rescheduled-1", "rescheduled-2"]);
    assert_eq!(fetcher.fetched(), vec![A, B, A, B, A, B]);
    assert_eq!(scheduler.urls(), urls(&[A, B]).as_slice());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_wait_ends_schedule() {
    let fetcher = Arc::new(fetcher());
    let sink = Arc::new(CollectingSink::new());
    let job = harvester(fetcher.clone(), sink.clone(), 2, 4, &["msc"]);
    let (handle, signal) = stop_channel();

    let mut scheduler = RecrawlScheduler::new(job, urls(&[A, B]), Duration::from_secs(3600));
    let stopper = async {
        tokio::time::sleep(Duration::from_secs(5400)).await;
        handle.stop();
    };
    let (report, ()) = tokio::join!(scheduler.run(signal), stopper);

    assert_eq!(report.runs, 2);
    assert_eq!(report.final_state, SchedulerState::Stopped);
    assert_eq!(sink.summaries().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_runs_do_not_stop_schedule() {
    let fetcher = Arc::new(fetcher().unavailable("browser failed to launch"));
    let sink = Arc::new(CollectingSink::new());
    let job = harvester(fetcher.clone(), sink.clone(), 2, 4, &["msc"]);

    let mut scheduler = RecrawlScheduler::new(job, urls(&[A, B]), Duration::from_secs(60))
        .with_max_runs(Some(2));
    let report = scheduler.run(StopSignal::never()).await;

    assert_eq!(report.runs, 2);
    assert_eq!(report.failed_runs, 2);
    for run in &report.history {
        let message = run.outcome.as_ref().unwrap_err();
        assert!(message.contains("browser failed to launch"));
    }
    assert!(fetcher.fetched().is_empty());
}
