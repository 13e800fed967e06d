//! Prometheus Metrics Module
//!
//! Exposes collection cycle metrics in Prometheus format.
//!
//! # Metrics
//!
//! - `snapshotter_cycles_total{outcome}`: Cycles by final state
//! - `snapshotter_orders_fetched_total`: Orders returned by the source
//! - `snapshotter_rows_written_total` / `snapshotter_rows_failed_total`
//! - `snapshotter_cycle_duration_seconds`: Wall time of each cycle
//! - `snapshotter_last_grand_total_volume`: Grand total of the latest cycle
//!
//! # Integration
//!
//! When `SNAPSHOTTER_METRICS_PORT` is non-zero, metrics are served at
//! `/metrics` on that port. Otherwise the macros record into nothing.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::application::services::{CycleOutcome, CycleSummary};

static INSTALLED_PORT: OnceLock<u16> = OnceLock::new();

/// Install the Prometheus exporter listening on `port`.
///
/// A port of zero leaves metrics disabled. Calling this again after a
/// successful install is a no-op.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(port: u16) -> Result<(), BuildError> {
    if port == 0 {
        tracing::debug!("Metrics exporter disabled");
        return Ok(());
    }
    if let Some(existing) = INSTALLED_PORT.get() {
        tracing::debug!(port = existing, "Metrics exporter already installed");
        return Ok(());
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    let _ = INSTALLED_PORT.set(port);

    register_metrics();
    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Port the exporter is listening on, if installed.
#[must_use]
pub fn metrics_port() -> Option<u16> {
    INSTALLED_PORT.get().copied()
}

fn register_metrics() {
    describe_counter!(
        "snapshotter_cycles_total",
        "Total collection cycles by outcome"
    );
    describe_counter!(
        "snapshotter_orders_fetched_total",
        "Total orders returned by the market data endpoint"
    );
    describe_counter!(
        "snapshotter_rows_written_total",
        "Total snapshot rows written"
    );
    describe_counter!(
        "snapshotter_rows_failed_total",
        "Total snapshot rows that failed to insert"
    );

    describe_histogram!(
        "snapshotter_cycle_duration_seconds",
        "Wall time of a collection cycle"
    );

    describe_gauge!(
        "snapshotter_last_grand_total_volume",
        "Grand total volume computed by the latest cycle"
    );
}

/// Rows of a cycle that were attempted but not written.
#[must_use]
pub const fn rows_failed(summary: &CycleSummary) -> usize {
    summary.rows_attempted.saturating_sub(summary.rows_written)
}

/// Record the result of one cycle.
pub fn record_cycle(outcome: &CycleOutcome, duration: Duration) {
    counter!("snapshotter_cycles_total", "outcome" => outcome.label()).increment(1);
    histogram!("snapshotter_cycle_duration_seconds").record(duration.as_secs_f64());

    let Some(summary) = outcome.summary() else {
        return;
    };

    counter!("snapshotter_orders_fetched_total").increment(summary.orders_fetched as u64);
    counter!("snapshotter_rows_written_total").increment(summary.rows_written as u64);
    counter!("snapshotter_rows_failed_total").increment(rows_failed(summary) as u64);
    gauge!("snapshotter_last_grand_total_volume").set(summary.grand_total.volume);
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::application::ports::FetchError;
    use crate::domain::order::AggregateBucket;

    fn summary(attempted: usize, written: usize) -> CycleSummary {
        CycleSummary {
            time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            orders_fetched: 3,
            orders_skipped: 0,
            buckets: attempted.saturating_sub(1),
            grand_total: AggregateBucket {
                volume: 4.0,
                order_count: 3,
            },
            rows_attempted: attempted,
            rows_written: written,
        }
    }

    #[test]
    fn rows_failed_is_difference() {
        assert_eq!(rows_failed(&summary(3, 3)), 0);
        assert_eq!(rows_failed(&summary(3, 1)), 2);
    }

    #[test]
    fn rows_failed_never_underflows() {
        assert_eq!(rows_failed(&summary(1, 2)), 0);
    }

    #[test]
    fn disabled_port_installs_nothing() {
        assert!(init_metrics(0).is_ok());
        assert_eq!(metrics_port(), None);
    }

    #[test]
    fn record_without_recorder_is_noop() {
        let fetch_failed = CycleOutcome::FetchFailed {
            time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            error: FetchError::Network("connection refused".to_string()),
        };
        record_cycle(&fetch_failed, Duration::from_millis(5));
        record_cycle(&CycleOutcome::Persisted(summary(3, 3)), Duration::from_secs(1));
    }
}
