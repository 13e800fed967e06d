//! Domain Layer - Order aggregation types and pure computation.
//!
//! Nothing in this layer performs I/O. The types here are shared by the
//! market data adapter (which produces [`order::OrderRecord`]s) and the
//! snapshot store (which consumes [`snapshot::Snapshot`] rows).

/// Order records and aggregate buckets.
pub mod order;

/// Reduction of order records into per-(market, algorithm) buckets.
pub mod aggregation;

/// Persisted snapshot rows.
pub mod snapshot;
