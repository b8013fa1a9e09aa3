//! Recrawl scheduler
//!
//! Re-harvests a fixed URL list on a timer:
//!
//! ```text
//! Idle → Running → Waiting → Running → … → Stopped
//! ```
//!
//! The first run starts immediately. After each run the scheduler waits the
//! configured interval, then runs again with the same, unmodified URL list.
//! It stops when the interval is zero, when the run limit is used up, when
//! the URL list is empty, or when the stop signal fires during a wait. A run
//! in progress is always allowed to finish. A failed run is logged and
//! counted; the next interval still proceeds.

use crate::crawler::harvester::INITIAL_BATCH_ID;
use crate::crawler::model::BatchResult;
use crate::crawler::timing::{wait_named, StopSignal, WaitOutcome};
use crate::{truncate_message, HarvestError, MESSAGE_LIMIT};
use async_trait::async_trait;
use std::time::Duration;

/// A unit of scheduled work: harvest `urls` under the given batch label
#[async_trait]
pub trait CrawlJob: Send + Sync {
    async fn run(&self, urls: &[String], batch_id: &str) -> Result<BatchResult, HarvestError>;
}

/// Lifecycle of a [`RecrawlScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Waiting,
    Stopped,
}

impl SchedulerState {
    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(self, next: SchedulerState) -> bool {
        use SchedulerState::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Idle, Stopped)
                | (Running, Waiting)
                | (Running, Stopped)
                | (Waiting, Running)
                | (Waiting, Stopped)
        )
    }
}

/// Outcome of one scheduled run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRun {
    pub batch_id: String,
    /// The run's counts, or its truncated error message
    pub outcome: Result<BatchResult, String>,
}

/// What the scheduler did before it stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleReport {
    pub runs: u32,
    pub failed_runs: u32,
    pub history: Vec<ScheduledRun>,
    pub final_state: SchedulerState,
}

/// Periodically re-runs a [`CrawlJob`] over a fixed URL list
pub struct RecrawlScheduler<J> {
    job: J,
    urls: Vec<String>,
    interval: Duration,
    max_runs: Option<u32>,
    state: SchedulerState,
}

impl<J: CrawlJob> RecrawlScheduler<J> {
    /// Creates an idle scheduler
    ///
    /// # Arguments
    ///
    /// * `job` - The work to run
    /// * `urls` - The fixed URL list handed to every run
    /// * `interval` - Wait between the end of one run and the start of the next
    pub fn new(job: J, urls: Vec<String>, interval: Duration) -> Self {
        Self {
            job,
            urls,
            interval,
            max_runs: None,
            state: SchedulerState::Idle,
        }
    }

    /// Limits the total number of runs; `None` means unlimited
    pub fn with_max_runs(mut self, max_runs: Option<u32>) -> Self {
        self.max_runs = max_runs;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn job(&self) -> &J {
        &self.job
    }

    fn transition(&mut self, next: SchedulerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal scheduler transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!("Scheduler {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Batch label for the n-th run (0-based)
    fn batch_id(run_index: u32) -> String {
        if run_index == 0 {
            INITIAL_BATCH_ID.to_string()
        } else {
            format!("rescheduled-{}", run_index)
        }
    }

    fn runs_exhausted(&self, runs: u32) -> bool {
        self.max_runs.is_some_and(|max| runs >= max)
    }

    /// Runs until stopped and reports what happened
    pub async fn run(&mut self, mut stop: StopSignal) -> ScheduleReport {
        let mut report = ScheduleReport {
            runs: 0,
            failed_runs: 0,
            history: Vec::new(),
            final_state: SchedulerState::Idle,
        };

        if self.urls.is_empty() || self.runs_exhausted(0) || stop.is_stopped() {
            tracing::info!("Nothing to schedule, stopping");
            self.transition(SchedulerState::Stopped);
            report.final_state = self.state;
            return report;
        }

        tracing::info!(
            "Scheduling {} URLs every {:?}{}",
            self.urls.len(),
            self.interval,
            self.max_runs
                .map(|max| format!(" for at most {} runs", max))
                .unwrap_or_default()
        );

        loop {
            self.transition(SchedulerState::Running);
            let batch_id = Self::batch_id(report.runs);
            let outcome = self.job.run(&self.urls, &batch_id).await;
            report.runs += 1;

            let outcome = match outcome {
                Ok(result) => {
                    tracing::info!(
                        "Scheduled run {} finished: {} succeeded, {} failed",
                        batch_id,
                        result.success_count,
                        result.failure_count
                    );
                    Ok(result)
                }
                Err(e) => {
                    report.failed_runs += 1;
                    let message = truncate_message(&e.to_string(), MESSAGE_LIMIT);
                    tracing::error!("Scheduled run {} failed: {}", batch_id, message);
                    Err(message)
                }
            };
            report.history.push(ScheduledRun { batch_id, outcome });

            if self.interval.is_zero() {
                tracing::info!("Recrawl interval is zero, not rescheduling");
                break;
            }
            if self.runs_exhausted(report.runs) {
                tracing::info!("Run limit reached after {} runs", report.runs);
                break;
            }

            self.transition(SchedulerState::Waiting);
            tracing::info!("Next run in {:?}", self.interval);
            if wait_named("recrawl interval", self.interval, &mut stop).await
                == WaitOutcome::Cancelled
            {
                tracing::info!("Stop requested while waiting");
                break;
            }
        }

        self.transition(SchedulerState::Stopped);
        report.final_state = self.state;
        report
    }
}
