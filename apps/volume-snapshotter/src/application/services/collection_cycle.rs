//! Collection Cycle
//!
//! One pass of the pipeline:
//!
//! ```text
//! Idle -> Fetching -> FetchFailed -> Idle
//!                  -> Fetched -> Aggregating -> Persisting -> Idle
//!                                                          -> PersistFailed -> Idle
//! ```
//!
//! A cycle never fails outward. Every failure is logged with the cycle
//! timestamp, the failing stage and the underlying cause, and reported in
//! the returned [`CycleOutcome`] so the scheduler can simply move on to the
//! next tick.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::Instrument;

use crate::application::ports::{FetchError, OrderSourcePort, SnapshotStorePort, WriteError};
use crate::domain::aggregation::{AggregationPolicy, aggregate};
use crate::domain::order::AggregateBucket;

/// What a completed cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    /// Timestamp stamped on every row of the cycle.
    pub time: DateTime<Utc>,
    /// Orders returned by the source.
    pub orders_fetched: usize,
    /// Orders excluded by the aggregation policy.
    pub orders_skipped: u64,
    /// Distinct `(market, algorithm)` buckets.
    pub buckets: usize,
    /// Cycle-wide total.
    pub grand_total: AggregateBucket,
    /// Rows attempted, including the grand total.
    pub rows_attempted: usize,
    /// Rows written.
    pub rows_written: usize,
}

/// Final state of a cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Fetch or decode failed; nothing was aggregated or written.
    FetchFailed {
        /// Cycle timestamp.
        time: DateTime<Utc>,
        /// Cause.
        error: FetchError,
    },
    /// Every row was written.
    Persisted(CycleSummary),
    /// Some rows failed; the others were still attempted.
    PersistFailed {
        /// Counts for the cycle.
        summary: CycleSummary,
        /// Failed rows.
        error: WriteError,
    },
}

impl CycleOutcome {
    /// Short label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FetchFailed { .. } => "fetch_failed",
            Self::Persisted(_) => "persisted",
            Self::PersistFailed { .. } => "persist_failed",
        }
    }

    /// Summary, when the cycle got past fetching.
    #[must_use]
    pub const fn summary(&self) -> Option<&CycleSummary> {
        match self {
            Self::FetchFailed { .. } => None,
            Self::Persisted(summary) | Self::PersistFailed { summary, .. } => Some(summary),
        }
    }
}

/// Fetch → aggregate → persist, wired to its ports.
pub struct CollectionCycle<S, T>
where
    S: OrderSourcePort,
    T: SnapshotStorePort,
{
    source: Arc<S>,
    store: Arc<T>,
    policy: AggregationPolicy,
}

impl<S, T> CollectionCycle<S, T>
where
    S: OrderSourcePort,
    T: SnapshotStorePort,
{
    /// Create a new cycle.
    pub const fn new(source: Arc<S>, store: Arc<T>, policy: AggregationPolicy) -> Self {
        Self {
            source,
            store,
            policy,
        }
    }

    /// Run one cycle stamped with the current time.
    pub async fn run_once(&self) -> CycleOutcome {
        self.run_at(Utc::now()).await
    }

    /// Run one cycle stamped with `time`.
    pub async fn run_at(&self, time: DateTime<Utc>) -> CycleOutcome {
        let span = tracing::info_span!("cycle", time = %time);
        self.execute(time).instrument(span).await
    }

    async fn execute(&self, time: DateTime<Utc>) -> CycleOutcome {
        tracing::info!("Checking stats");

        let records = match self.source.fetch_orders().await {
            Ok(records) => records,
            Err(error) => {
                tracing::error!(
                    stage = error.stage(),
                    error = %error,
                    "Order fetch failed, skipping cycle"
                );
                return CycleOutcome::FetchFailed { time, error };
            }
        };

        let aggregation = aggregate(&records, self.policy);
        tracing::debug!(
            orders = records.len(),
            skipped = aggregation.skipped,
            buckets = aggregation.bucket_count(),
            "Orders aggregated"
        );

        let rows = aggregation.snapshots(time);
        let mut summary = CycleSummary {
            time,
            orders_fetched: records.len(),
            orders_skipped: aggregation.skipped,
            buckets: aggregation.bucket_count(),
            grand_total: aggregation.grand_total,
            rows_attempted: rows.len(),
            rows_written: 0,
        };

        match self.store.write_snapshot(&rows).await {
            Ok(report) => {
                summary.rows_written = report.written;
                tracing::info!(
                    total_volume = summary.grand_total.volume,
                    total_orders = summary.grand_total.order_count,
                    rows = report.written,
                    "Snapshot persisted"
                );
                CycleOutcome::Persisted(summary)
            }
            Err(error) => {
                summary.rows_written = error.written;
                tracing::error!(
                    stage = "persist",
                    failed = error.failures.len(),
                    attempted = error.attempted,
                    grand_total_failed = error.grand_total_failed(),
                    total_volume = summary.grand_total.volume,
                    error = %error,
                    "Snapshot partially persisted"
                );
                CycleOutcome::PersistFailed { summary, error }
            }
        }
    }
}
