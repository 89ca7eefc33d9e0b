//! Fixed-cadence task runner.
//!
//! Runs a job immediately and then once per period until the cancellation
//! token fires. Ticks missed while a job overran are skipped rather than
//! replayed in a burst. The job has no error channel: a cycle that fails must
//! deal with it itself, and the next tick fires regardless.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info};

#[derive(Debug, Clone)]
pub struct PeriodicTask {
    label: &'static str,
    every: Duration,
}

impl PeriodicTask {
    /// A zero period is clamped to one millisecond.
    pub fn new(label: &'static str, every: Duration) -> Self {
        Self {
            label,
            every: every.max(Duration::from_millis(1)),
        }
    }

    pub fn every(&self) -> Duration {
        self.every
    }

    /// Runs `job` on the current task until `cancel` fires.
    /// Returns how many cycles completed.
    pub async fn run<F, Fut>(self, cancel: CancellationToken, mut job: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            task = self.label,
            every_ms = self.every.as_millis() as u64,
            "periodic task started"
        );

        let mut cycles = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            // A cycle in progress is allowed to finish before cancellation is observed.
            job().await;
            cycles += 1;
            debug!(task = self.label, cycles, "periodic cycle complete");
        }

        info!(task = self.label, cycles, "periodic task stopped");
        cycles
    }

    /// Spawns [`PeriodicTask::run`] onto the runtime.
    pub fn spawn<F, Fut>(self, cancel: CancellationToken, job: F) -> JoinHandle<u64>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let span = tracing::info_span!("periodic_task", task = self.label);
        tokio::spawn(self.run(cancel, job).instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_period_is_clamped() {
        let task = PeriodicTask::new("t", Duration::ZERO);
        assert_eq!(task.every(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn cancelled_before_start_runs_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let cycles = PeriodicTask::new("t", Duration::from_secs(1))
            .run(cancel, || async {})
            .await;

        assert_eq!(cycles, 0);
    }
}
