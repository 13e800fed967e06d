//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the collection cycle and scheduler, plus the port
//! interfaces that define how they reach the market data source and the
//! snapshot store.

/// Port interfaces for external systems (order source, snapshot store).
pub mod ports;

/// Application services: the collection cycle and its scheduler.
pub mod services;
