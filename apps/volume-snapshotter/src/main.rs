//! Volume Snapshotter Binary
//!
//! Starts the periodic volume snapshot job.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin volume-snapshotter
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `SNAPSHOTTER_DB_PASSWORD`: Database password (unless `DATABASE_URL` is set)
//!
//! ## Optional
//! - `DATABASE_URL`: Full PostgreSQL connection URL
//! - `SNAPSHOTTER_DB_HOST` / `SNAPSHOTTER_DB_PORT` / `SNAPSHOTTER_DB_USER` / `SNAPSHOTTER_DB_NAME`
//! - `SNAPSHOTTER_ORDERS_URL`: Active-orders endpoint
//! - `SNAPSHOTTER_POLL_INTERVAL_SECS`: Cycle period (default: 600)
//! - `SNAPSHOTTER_INCLUDE_ONLY_ALIVE`: Aggregate only alive orders (default: false)
//! - `SNAPSHOTTER_SCHEMA_FATAL`: Exit if schema creation fails (default: false)
//! - `SNAPSHOTTER_METRICS_PORT`: Prometheus metrics port (default: 0, disabled)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `RUST_LOG`: Log filter (default: volume_snapshotter=info)

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use volume_snapshotter::application::ports::SnapshotStorePort;
use volume_snapshotter::infrastructure::market_data::MarketDataHttpClient;
use volume_snapshotter::infrastructure::persistence::PgSnapshotStore;
use volume_snapshotter::infrastructure::telemetry;
use volume_snapshotter::{
    CollectionCycle, Scheduler, SnapshotterConfig, init_metrics, record_cycle,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    load_dotenv();

    // Initialize telemetry (tracing + optional OTLP)
    let _telemetry_guard = telemetry::init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting volume snapshotter");

    let config = SnapshotterConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    init_metrics(config.server.metrics_port).context("failed to start metrics exporter")?;

    let source = MarketDataHttpClient::new(&config.market_data)
        .context("failed to build market data client")?;

    let options = config.database.connect_options()?;
    let store = PgSnapshotStore::connect(
        options,
        config.database.max_connections,
        config.database.connect_retry,
    )
    .await
    .context("database unreachable at startup")?;

    if let Err(e) = store.ensure_schema().await {
        tracing::error!(error = %e, "Schema creation failed");
        if config.schema_fatal {
            store.close().await;
            return Err(e).context("schema creation failed");
        }
    }

    let store = Arc::new(store);
    let cycle = CollectionCycle::new(Arc::new(source), Arc::clone(&store), config.aggregation);

    let shutdown_token = CancellationToken::new();
    tokio::spawn(await_shutdown(shutdown_token.clone()));

    let scheduler = Scheduler::new(config.poll_interval, shutdown_token);
    tracing::info!(
        period_secs = scheduler.period().as_secs(),
        "Volume snapshotter ready"
    );

    let cycle = &cycle;
    let cycles = scheduler
        .run(|| async move {
            let started = Instant::now();
            let outcome = cycle.run_once().await;
            record_cycle(&outcome, started.elapsed());
        })
        .await;

    store.close().await;
    tracing::info!(cycles, "Volume snapshotter stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &SnapshotterConfig) {
    tracing::info!(
        orders_url = %config.market_data.orders_url,
        poll_interval_secs = config.poll_interval.as_secs(),
        include_only_alive = config.aggregation.include_only_alive,
        schema_fatal = config.schema_fatal,
        metrics_port = config.server.metrics_port,
        "Configuration loaded"
    );
    tracing::debug!(database = ?config.database, "Database settings");
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// A running cycle is allowed to finish; the scheduler stops before the
/// next tick.
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
