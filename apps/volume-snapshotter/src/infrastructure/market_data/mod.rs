//! Market Data Adapter
//!
//! HTTP client for the public active-orders endpoint and its wire types.

pub mod api_types;
mod http_client;

pub use http_client::{DEFAULT_ORDERS_URL, MarketDataConfig, MarketDataHttpClient};
