#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Volume Snapshotter - Periodic Order Volume Aggregation
//!
//! Polls the public active-orders endpoint every ten minutes, reduces the
//! order book to total volume per `(market, algorithm)`, and appends one
//! row per bucket plus a `BOTH`/`total` grand-total row to PostgreSQL.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure types and computation
//!   - `order`: Order records, aggregate keys and buckets
//!   - `aggregation`: Grouping and the grand total
//!   - `snapshot`: Persisted rows
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Order source and snapshot store interfaces
//!   - `services`: Collection cycle and scheduler
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `market_data`: HTTP client for the active-orders endpoint
//!   - `persistence`: PostgreSQL and in-memory snapshot stores
//!   - `config`: Environment-driven configuration
//!   - `telemetry`: Logging and OpenTelemetry
//!   - `metrics`: Prometheus exporter
//!
//! # Data Flow
//!
//! ```text
//! ┌────────────┐   ┌───────────┐   ┌──────────────┐   ┌────────────┐
//! │ Scheduler  │──►│   Fetch   │──►│  Aggregate   │──►│  Persist   │──► stats
//! │ (10 min)   │   │ (HTTP GET)│   │ (by market,  │   │ (row per   │
//! └────────────┘   └───────────┘   │  algorithm)  │   │  bucket +  │
//!                                  └──────────────┘   │  total)    │
//!                                                     └────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Order and snapshot types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::aggregation::{Aggregation, AggregationPolicy, aggregate};
pub use domain::order::{AggregateBucket, AggregateKey, OrderRecord};
pub use domain::snapshot::{GRAND_TOTAL_ALGORITHM, GRAND_TOTAL_LOCATION, Snapshot};

// Application services
pub use application::services::{CollectionCycle, CycleOutcome, CycleSummary, Scheduler};

// Infrastructure config
pub use infrastructure::config::{ConfigError, SnapshotterConfig};

// Metrics
pub use infrastructure::metrics::{init_metrics, record_cycle};
