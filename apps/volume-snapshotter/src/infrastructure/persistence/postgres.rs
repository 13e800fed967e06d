//! PostgreSQL Snapshot Store
//!
//! Persists snapshot rows to the `stats` table via `sqlx`. Each row is a
//! single autocommitted `INSERT`, so one failing row cannot roll back its
//! siblings. Every statement is logged at debug level with its elapsed
//! time.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use super::connect::{ConnectRetry, probe_with_retry};
use crate::application::ports::{
    PersistenceError, SchemaError, SnapshotStorePort, StartupConnectivityError,
};
use crate::domain::snapshot::Snapshot;

/// Snapshot table definition.
pub const CREATE_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS stats (
    time      TIMESTAMPTZ      NOT NULL,
    location  TEXT             NOT NULL,
    algorithm TEXT             NOT NULL,
    volume    DOUBLE PRECISION NOT NULL,
    orders    BIGINT           NOT NULL
)";

/// Index supporting time-range reads of the snapshot table.
pub const CREATE_INDEX_SQL: &str = "CREATE INDEX IF NOT EXISTS stats_time_idx ON stats (time)";

/// Row insert statement.
pub const INSERT_SQL: &str =
    "INSERT INTO stats (time, location, algorithm, volume, orders) VALUES ($1, $2, $3, $4, $5)";

const PROBE_SQL: &str = "SELECT 1";

/// How long a statement may wait for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Snapshot store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    /// Build a store without touching the network.
    #[must_use]
    pub fn connect_lazy(options: PgConnectOptions, max_connections: u32) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(options);
        Self { pool }
    }

    /// Build a store and wait until it answers `SELECT 1`.
    ///
    /// # Errors
    ///
    /// Returns `StartupConnectivityError` once every attempt has failed.
    pub async fn connect(
        options: PgConnectOptions,
        max_connections: u32,
        retry: ConnectRetry,
    ) -> Result<Self, StartupConnectivityError> {
        tracing::info!(
            host = options.get_host(),
            database = options.get_database().unwrap_or_default(),
            "Opening database"
        );

        let store = Self::connect_lazy(options, max_connections);
        probe_with_retry(retry, || store.ping()).await?;

        tracing::info!(max_connections, "PostgreSQL connection pool initialized");
        Ok(store)
    }

    /// Run the connectivity probe once.
    pub async fn ping(&self) -> Result<(), PersistenceError> {
        let started = Instant::now();
        let result = sqlx::query_scalar::<_, i32>(PROBE_SQL)
            .fetch_one(&self.pool)
            .await;
        log_statement(PROBE_SQL, started);
        result.map(|_| ()).map_err(classify)
    }

    /// Close the pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SnapshotStorePort for PgSnapshotStore {
    async fn ensure_schema(&self) -> Result<(), SchemaError> {
        for statement in [CREATE_TABLE_SQL, CREATE_INDEX_SQL] {
            let started = Instant::now();
            let result = sqlx::query(statement).execute(&self.pool).await;
            log_statement(statement, started);
            result.map_err(|e| SchemaError::new(e.to_string()))?;
        }
        Ok(())
    }

    async fn insert_snapshot(&self, row: &Snapshot) -> Result<(), PersistenceError> {
        let started = Instant::now();
        let result = sqlx::query(INSERT_SQL)
            .bind(row.time)
            .bind(&row.location)
            .bind(&row.algorithm)
            .bind(row.volume)
            .bind(row.orders)
            .execute(&self.pool)
            .await;
        log_statement(INSERT_SQL, started);
        result.map(|_| ()).map_err(classify)
    }
}

fn log_statement(statement: &str, started: Instant) {
    tracing::debug!(
        elapsed_us = started.elapsed().as_micros(),
        statement = statement.trim(),
        "query"
    );
}

/// Split sqlx errors into "could not reach the store" and "statement failed".
fn classify(err: sqlx::Error) -> PersistenceError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => PersistenceError::Connection(err.to_string()),
        _ => PersistenceError::Query(err.to_string()),
    }
}
