//! Snapshot Store Port (Driven Port)
//!
//! Interface for persisting snapshot rows. Rows are immutable once written;
//! the port offers no update or delete.

use async_trait::async_trait;

use crate::domain::order::AggregateKey;
use crate::domain::snapshot::Snapshot;

/// Schema creation failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("schema creation failed: {message}")]
pub struct SchemaError {
    /// Error details.
    pub message: String,
}

impl SchemaError {
    /// Create a new schema error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single row could not be written.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistenceError {
    /// The store could not be reached.
    #[error("database connection error: {0}")]
    Connection(String),

    /// The statement was rejected.
    #[error("query error: {0}")]
    Query(String),
}

/// The store was unreachable after every startup attempt. Fatal.
#[derive(Debug, Clone, thiserror::Error)]
#[error("database unreachable after {attempts} attempts: {last_error}")]
pub struct StartupConnectivityError {
    /// Attempts made.
    pub attempts: u32,
    /// Cause reported by the final attempt.
    pub last_error: String,
}

/// One failed row within a cycle write.
#[derive(Debug, Clone)]
pub struct RowFailure {
    /// Location/algorithm of the row.
    pub key: AggregateKey,
    /// Why it failed.
    pub error: PersistenceError,
}

/// Outcome of a fully successful cycle write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Rows attempted.
    pub attempted: usize,
    /// Rows written.
    pub written: usize,
}

/// At least one row of a cycle write failed. Sibling rows were still
/// attempted.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} of {attempted} snapshot rows failed", failures.len())]
pub struct WriteError {
    /// Rows attempted.
    pub attempted: usize,
    /// Rows written.
    pub written: usize,
    /// Every failed row.
    pub failures: Vec<RowFailure>,
}

impl WriteError {
    /// Whether the grand-total row was among the failures.
    #[must_use]
    pub fn grand_total_failed(&self) -> bool {
        self.failures.iter().any(|f| {
            f.key.region == crate::domain::snapshot::GRAND_TOTAL_LOCATION
                && f.key.category == crate::domain::snapshot::GRAND_TOTAL_ALGORITHM
        })
    }
}

/// Port for persisting snapshot rows.
#[async_trait]
pub trait SnapshotStorePort: Send + Sync {
    /// Create the snapshot table if it does not exist. Idempotent.
    async fn ensure_schema(&self) -> Result<(), SchemaError>;

    /// Insert a single row.
    async fn insert_snapshot(&self, row: &Snapshot) -> Result<(), PersistenceError>;

    /// Write a cycle's rows, best-effort.
    ///
    /// Every row is attempted independently; a failed row never prevents
    /// the remaining rows from being attempted.
    async fn write_snapshot(&self, rows: &[Snapshot]) -> Result<WriteReport, WriteError> {
        let mut failures = Vec::new();

        for row in rows {
            if let Err(error) = self.insert_snapshot(row).await {
                tracing::warn!(
                    stage = "persist",
                    time = %row.time,
                    location = %row.location,
                    algorithm = %row.algorithm,
                    error = %error,
                    "Snapshot row write failed"
                );
                failures.push(RowFailure {
                    key: row.key(),
                    error,
                });
            }
        }

        let attempted = rows.len();
        let written = attempted - failures.len();
        if failures.is_empty() {
            Ok(WriteReport { attempted, written })
        } else {
            Err(WriteError {
                attempted,
                written,
                failures,
            })
        }
    }
}
