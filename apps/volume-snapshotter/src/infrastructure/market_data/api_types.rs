//! Active-orders API wire types.
//!
//! Prices and speeds arrive as decimal strings (`"0.0123"`). Plain JSON
//! numbers are accepted as well; anything else is a decode error.

use serde::{Deserialize, Deserializer};

use crate::domain::order::OrderRecord;

/// Response body of the active-orders endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveOrdersResponse {
    /// Active orders.
    pub list: Vec<ApiOrder>,
}

/// A single order as transmitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrder {
    /// Liveness flag.
    pub alive: bool,
    /// Order price.
    #[serde(deserialize_with = "f64_from_str_or_number")]
    pub price: f64,
    /// Accepted speed.
    #[serde(deserialize_with = "f64_from_str_or_number")]
    pub accepted_current_speed: f64,
    /// Market (region) identifier.
    pub market: String,
    /// Algorithm descriptor.
    pub algorithm: ApiAlgorithm,
}

/// Nested algorithm descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAlgorithm {
    /// Display name, e.g. `Scrypt`.
    pub title: String,
}

impl From<ApiOrder> for OrderRecord {
    fn from(order: ApiOrder) -> Self {
        Self {
            alive: order.alive,
            price: order.price,
            accepted_speed: order.accepted_current_speed,
            market: order.market,
            algorithm_name: order.algorithm.title,
        }
    }
}

impl ActiveOrdersResponse {
    /// Convert into domain records.
    #[must_use]
    pub fn into_records(self) -> Vec<OrderRecord> {
        self.list.into_iter().map(OrderRecord::from).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNumber {
    Str(String),
    Number(f64),
}

fn f64_from_str_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match StrOrNumber::deserialize(deserializer)? {
        StrOrNumber::Number(n) => Ok(n),
        StrOrNumber::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid number {s:?}: {e}"))),
    }
}
