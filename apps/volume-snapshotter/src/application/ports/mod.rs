//! Port Interfaces
//!
//! Driven (outbound) ports used by the collection cycle:
//!
//! - `OrderSourcePort`: fetches the current active orders
//! - `SnapshotStorePort`: persists snapshot rows

mod order_source_port;
mod snapshot_store_port;

pub use order_source_port::{FetchError, OrderSourcePort};
pub use snapshot_store_port::{
    PersistenceError, RowFailure, SchemaError, SnapshotStorePort, StartupConnectivityError,
    WriteError, WriteReport,
};

#[cfg(test)]
pub use order_source_port::MockOrderSourcePort;
