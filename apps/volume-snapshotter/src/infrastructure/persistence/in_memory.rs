//! In-memory snapshot store for testing.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::application::ports::{PersistenceError, SchemaError, SnapshotStorePort};
use crate::domain::order::AggregateKey;
use crate::domain::snapshot::Snapshot;

/// In-memory implementation of `SnapshotStorePort`.
///
/// Supports failure injection per row key and for schema creation.
/// Not for production use.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    rows: Mutex<Vec<Snapshot>>,
    schema_created: Mutex<bool>,
    schema_calls: Mutex<u32>,
    failing_keys: Mutex<HashSet<AggregateKey>>,
    fail_schema: Mutex<Option<String>>,
}

impl InMemorySnapshotStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row written so far, in write order.
    #[must_use]
    pub fn rows(&self) -> Vec<Snapshot> {
        self.rows.lock().clone()
    }

    /// Number of rows written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    /// Whether the schema exists.
    #[must_use]
    pub fn schema_created(&self) -> bool {
        *self.schema_created.lock()
    }

    /// How many times schema creation was requested.
    #[must_use]
    pub fn schema_calls(&self) -> u32 {
        *self.schema_calls.lock()
    }

    /// Reject every insert for `key`.
    pub fn fail_inserts_for(&self, key: AggregateKey) {
        self.failing_keys.lock().insert(key);
    }

    /// Stop rejecting inserts.
    pub fn clear_failures(&self) {
        self.failing_keys.lock().clear();
    }

    /// Make schema creation fail with `message`.
    pub fn fail_schema(&self, message: impl Into<String>) {
        *self.fail_schema.lock() = Some(message.into());
    }
}

#[async_trait]
impl SnapshotStorePort for InMemorySnapshotStore {
    async fn ensure_schema(&self) -> Result<(), SchemaError> {
        *self.schema_calls.lock() += 1;
        if let Some(message) = self.fail_schema.lock().clone() {
            return Err(SchemaError::new(message));
        }
        *self.schema_created.lock() = true;
        Ok(())
    }

    async fn insert_snapshot(&self, row: &Snapshot) -> Result<(), PersistenceError> {
        if self.failing_keys.lock().contains(&row.key()) {
            return Err(PersistenceError::Query(format!(
                "injected failure for {}",
                row.key()
            )));
        }
        self.rows.lock().push(row.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::order::AggregateBucket;

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let store = InMemorySnapshotStore::new();

        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();

        assert!(store.schema_created());
        assert_eq!(store.schema_calls(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn injected_schema_failure() {
        let store = InMemorySnapshotStore::new();
        store.fail_schema("permission denied");

        let err = store.ensure_schema().await.unwrap_err();

        assert_eq!(err.message, "permission denied");
        assert!(!store.schema_created());
    }

    #[tokio::test]
    async fn write_snapshot_attempts_every_row() {
        let store = InMemorySnapshotStore::new();
        store.fail_inserts_for(AggregateKey::new("EU", "X"));
        let now = Utc::now();
        let bucket = AggregateBucket {
            volume: 1.0,
            order_count: 1,
        };
        let rows = vec![
            Snapshot::for_bucket(now, &AggregateKey::new("EU", "X"), &bucket),
            Snapshot::for_bucket(now, &AggregateKey::new("USA", "Y"), &bucket),
            Snapshot::grand_total(now, &bucket),
        ];

        let err = store.write_snapshot(&rows).await.unwrap_err();

        assert_eq!(err.attempted, 3);
        assert_eq!(err.written, 2);
        assert_eq!(store.len(), 2);

        store.clear_failures();
        let report = store.write_snapshot(&rows).await.unwrap();
        assert_eq!(report.written, 3);
        assert_eq!(store.len(), 5);
    }
}
