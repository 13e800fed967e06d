//! Configuration Module
//!
//! Environment-driven configuration for the snapshotter.

mod settings;

pub use settings::{ConfigError, DatabaseSettings, ServerSettings, SnapshotterConfig};
