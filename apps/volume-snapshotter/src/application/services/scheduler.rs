//! Fixed-Interval Scheduler
//!
//! Runs a cycle once immediately and then once per period, on a single
//! task, until the shutdown token is cancelled.
//!
//! Cycles never overlap: the next tick is only awaited after the current
//! cycle has returned. If a cycle overruns the period the missed ticks are
//! skipped rather than queued. Cancellation is observed between cycles, so
//! a cycle that is already running always finishes.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Shortest period a scheduler will tick at.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Fixed-period cycle runner.
#[derive(Debug, Clone)]
pub struct Scheduler {
    period: Duration,
    shutdown: CancellationToken,
}

impl Scheduler {
    /// Create a scheduler. A zero `period` is raised to one millisecond.
    #[must_use]
    pub const fn new(period: Duration, shutdown: CancellationToken) -> Self {
        let period = if period.is_zero() { MIN_PERIOD } else { period };
        Self { period, shutdown }
    }

    /// Configured period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Run `cycle` immediately and then every period until shutdown.
    ///
    /// Returns the number of cycles executed.
    pub async fn run<F, Fut>(&self, mut cycle: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    tracing::info!(cycles, "Scheduler shutting down");
                    break;
                }
                _ = interval.tick() => {}
            }

            cycle().await;
            cycles += 1;
        }

        cycles
    }
}
