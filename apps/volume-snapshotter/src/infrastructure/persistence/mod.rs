//! Snapshot Persistence Adapters
//!
//! - `PgSnapshotStore`: PostgreSQL via `sqlx`
//! - `InMemorySnapshotStore`: in-process store for tests and dry runs
//! - `probe_with_retry`: bounded, fixed-delay startup connectivity probe

mod connect;
mod in_memory;
mod postgres;

pub use connect::{ConnectRetry, probe_with_retry};
pub use in_memory::InMemorySnapshotStore;
pub use postgres::{CREATE_INDEX_SQL, CREATE_TABLE_SQL, INSERT_SQL, PgSnapshotStore};
