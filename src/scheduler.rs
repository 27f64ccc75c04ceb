// src/scheduler.rs
//! Periodic driver for the aggregator: one interval task scanning all jobs
//! per tick. Cancellable so shutdown and hot-reload do not leak the loop.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::aggregator::Aggregator;

pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

/// Spawn the scheduler loop. The first scan happens one full interval after
/// startup, matching timer-driven polling semantics.
pub fn spawn_scheduler(aggregator: Arc<Aggregator>, interval_secs: u64) -> SchedulerHandle {
    let (tx, mut rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let period = Duration::from_secs(interval_secs);
        let start = tokio::time::Instant::now() + period;
        let mut ticker = tokio::time::interval_at(start, period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("scheduler tick");
                    aggregator.run_due_jobs().await;
                }
                _ = rx.changed() => {
                    tracing::info!("scheduler stopping");
                    break;
                }
            }
        }
    });
    SchedulerHandle {
        shutdown: tx,
        handle,
    }
}
