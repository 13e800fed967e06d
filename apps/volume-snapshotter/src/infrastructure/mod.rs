//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Environment-driven configuration.
pub mod config;

/// HTTP client for the public active-orders endpoint.
pub mod market_data;

/// Snapshot storage adapters (PostgreSQL, in-memory).
pub mod persistence;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Logging and OpenTelemetry tracing integration.
pub mod telemetry;
