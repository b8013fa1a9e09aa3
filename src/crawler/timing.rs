//! Named, cancellable waits
//!
//! Every pause in the harvester (render settling, recrawl intervals) goes
//! through [`wait_named`] so that a stop request cuts it short and paused-clock
//! tests can fast-forward it.

use std::time::Duration;
use tokio::sync::watch;

/// How a timed wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Sending half of a stop signal
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

/// Receiving half of a stop signal; cheap to clone
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

/// Creates a connected stop handle and signal
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

impl StopHandle {
    /// Requests a stop; idempotent
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// Returns a new signal observing this handle
    pub fn signal(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl StopSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Keep the value readable after the sender is gone
        drop(tx);
        Self { rx }
    }

    /// Returns true once a stop has been requested
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when a stop is requested
    ///
    /// If the handle is dropped without stopping, this never resolves.
    pub async fn stopped(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sleeps for `duration` unless the stop signal fires first
pub async fn wait_named(name: &str, duration: Duration, stop: &mut StopSignal) -> WaitOutcome {
    if stop.is_stopped() {
        tracing::debug!("Skipping {} wait: stop already requested", name);
        return WaitOutcome::Cancelled;
    }
    if duration.is_zero() {
        return WaitOutcome::Elapsed;
    }

    tracing::debug!("Waiting {:?} ({})", duration, name);
    tokio::select! {
        _ = tokio::time::sleep(duration) => WaitOutcome::Elapsed,
        _ = stop.stopped() => {
            tracing::debug!("{} wait cancelled", name);
            WaitOutcome::Cancelled
        }
    }
}
