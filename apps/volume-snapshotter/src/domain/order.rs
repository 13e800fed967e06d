//! Order Records and Aggregate Buckets
//!
//! An [`OrderRecord`] is the decoded, transport-agnostic view of a single
//! active order. Records are ephemeral: they live for one cycle and are
//! reduced into [`AggregateBucket`]s keyed by [`AggregateKey`].

use std::fmt;

/// A single active order as seen by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Whether the order is currently alive on the market.
    pub alive: bool,
    /// Order price.
    pub price: f64,
    /// Currently accepted speed.
    pub accepted_speed: f64,
    /// Region identifier (e.g. `EU`, `USA`).
    pub market: String,
    /// Category display name (e.g. `Scrypt`).
    pub algorithm_name: String,
}

impl OrderRecord {
    /// Create a new order record.
    #[must_use]
    pub fn new(
        alive: bool,
        price: f64,
        accepted_speed: f64,
        market: impl Into<String>,
        algorithm_name: impl Into<String>,
    ) -> Self {
        Self {
            alive,
            price,
            accepted_speed,
            market: market.into(),
            algorithm_name: algorithm_name.into(),
        }
    }

    /// Volume contributed by this order: `price * accepted_speed`.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.price * self.accepted_speed
    }

    /// Bucket key for this order.
    #[must_use]
    pub fn key(&self) -> AggregateKey {
        AggregateKey::new(self.market.clone(), self.algorithm_name.clone())
    }
}

/// Composite bucket key: `(region, category)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregateKey {
    /// Region identifier.
    pub region: String,
    /// Category identifier.
    pub category: String,
}

impl AggregateKey {
    /// Create a new key.
    #[must_use]
    pub fn new(region: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.category)
    }
}

/// Accumulated volume and order count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateBucket {
    /// Sum of `price * accepted_speed` over contributing orders.
    pub volume: f64,
    /// Number of contributing orders.
    pub order_count: u64,
}

impl AggregateBucket {
    /// Add one order's volume to the bucket.
    pub fn add(&mut self, volume: f64) {
        self.volume += volume;
        self.order_count += 1;
    }

    /// Whether nothing has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_price_times_speed() {
        let record = OrderRecord::new(true, 2.0, 3.5, "EU", "Scrypt");
        assert_eq!(record.volume(), 7.0);
    }

    #[test]
    fn key_uses_market_and_algorithm() {
        let record = OrderRecord::new(false, 1.0, 1.0, "USA", "SHA256");
        assert_eq!(record.key(), AggregateKey::new("USA", "SHA256"));
        assert_eq!(record.key().to_string(), "USA/SHA256");
    }

    #[test]
    fn bucket_accumulates() {
        let mut bucket = AggregateBucket::default();
        assert!(bucket.is_empty());

        bucket.add(1.5);
        bucket.add(2.5);

        assert_eq!(bucket.volume, 4.0);
        assert_eq!(bucket.order_count, 2);
        assert!(!bucket.is_empty());
    }
}
