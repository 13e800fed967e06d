//! HTTP client for the active-orders endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::api_types::ActiveOrdersResponse;
use crate::application::ports::{FetchError, OrderSourcePort};
use crate::domain::order::OrderRecord;

/// Public active-orders endpoint.
pub const DEFAULT_ORDERS_URL: &str = "https://api2.nicehash.com/main/api/v2/public/orders/active/";

/// Configuration for the market data client.
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    /// Endpoint URL.
    pub orders_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            orders_url: DEFAULT_ORDERS_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl MarketDataConfig {
    /// Create a configuration for `orders_url` with the default timeout.
    #[must_use]
    pub fn new(orders_url: impl Into<String>) -> Self {
        Self {
            orders_url: orders_url.into(),
            ..Self::default()
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches active orders over HTTP. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct MarketDataHttpClient {
    client: Client,
    orders_url: String,
}

impl MarketDataHttpClient {
    /// Create a new client from config.
    pub fn new(config: &MarketDataConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            orders_url: config.orders_url.clone(),
        })
    }

}

#[async_trait]
impl OrderSourcePort for MarketDataHttpClient {
    async fn fetch_orders(&self) -> Result<Vec<OrderRecord>, FetchError> {
        let response = self
            .client
            .get(&self.orders_url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!(
                "unexpected HTTP status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let decoded: ActiveOrdersResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let records = decoded.into_records();
        tracing::debug!(orders = records.len(), "Active orders fetched");
        Ok(records)
    }
}
