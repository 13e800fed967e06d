//! Order Aggregation
//!
//! Reduces a cycle's order records into one [`AggregateBucket`] per
//! `(market, algorithm)` pair plus a cycle-wide grand total.
//!
//! # Liveness
//!
//! The upstream feed marks each order with an `alive` flag. Whether dead
//! orders belong in the volume figures is unsettled, so the choice is
//! exposed as [`AggregationPolicy`]. The default counts every order.
//!
//! # Invariant
//!
//! For every aggregation, the sum of bucket volumes equals the grand total
//! volume and the sum of bucket counts equals the grand total count. Both
//! sides see exactly the same contributions.

use std::collections::HashMap;

use super::order::{AggregateBucket, AggregateKey, OrderRecord};

/// Which orders contribute to an aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationPolicy {
    /// Skip orders whose `alive` flag is false.
    pub include_only_alive: bool,
}

impl AggregationPolicy {
    /// Count every order, alive or not.
    pub const ALL_ORDERS: Self = Self {
        include_only_alive: false,
    };

    /// Count only live orders.
    pub const ALIVE_ONLY: Self = Self {
        include_only_alive: true,
    };

    /// Whether `record` contributes under this policy.
    #[must_use]
    pub const fn admits(&self, record: &OrderRecord) -> bool {
        !self.include_only_alive || record.alive
    }
}

/// Result of aggregating one cycle's orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// One bucket per distinct `(market, algorithm)` pair.
    pub buckets: HashMap<AggregateKey, AggregateBucket>,
    /// Sum over every contributing order.
    pub grand_total: AggregateBucket,
    /// Orders excluded by the policy.
    pub skipped: u64,
}

impl Aggregation {
    /// Number of distinct buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets sorted by key.
    #[must_use]
    pub fn sorted_buckets(&self) -> Vec<(&AggregateKey, &AggregateBucket)> {
        let mut buckets: Vec<_> = self.buckets.iter().collect();
        buckets.sort_by(|a, b| a.0.cmp(b.0));
        buckets
    }
}

/// Aggregate order records into per-key buckets and a grand total.
///
/// Pure and infallible: an empty input yields no buckets and a zero grand
/// total.
#[must_use]
pub fn aggregate(records: &[OrderRecord], policy: AggregationPolicy) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for record in records {
        if !policy.admits(record) {
            aggregation.skipped += 1;
            continue;
        }

        let contribution = record.volume();
        aggregation
            .buckets
            .entry(record.key())
            .or_default()
            .add(contribution);
        aggregation.grand_total.add(contribution);
    }

    aggregation
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn order(market: &str, algo: &str, price: f64, speed: f64) -> OrderRecord {
        OrderRecord::new(true, price, speed, market, algo)
    }

    #[test]
    fn empty_input_yields_empty_aggregation() {
        let aggregation = aggregate(&[], AggregationPolicy::default());

        assert!(aggregation.buckets.is_empty());
        assert_eq!(aggregation.grand_total, AggregateBucket::default());
        assert_eq!(aggregation.grand_total.volume, 0.0);
        assert_eq!(aggregation.grand_total.order_count, 0);
    }

    #[test]
    fn same_key_orders_share_a_bucket() {
        let records = vec![order("A", "X", 2.0, 3.0), order("A", "X", 1.0, 1.0)];

        let aggregation = aggregate(&records, AggregationPolicy::default());

        assert_eq!(aggregation.bucket_count(), 1);
        let bucket = aggregation.buckets[&AggregateKey::new("A", "X")];
        assert_eq!(bucket.volume, 7.0);
        assert_eq!(bucket.order_count, 2);
    }

    #[test]
    fn distinct_markets_produce_distinct_buckets() {
        let records = vec![order("A", "X", 1.0, 1.0), order("B", "Y", 2.0, 2.0)];

        let aggregation = aggregate(&records, AggregationPolicy::default());

        assert_eq!(aggregation.bucket_count(), 2);
        let a = aggregation.buckets[&AggregateKey::new("A", "X")];
        let b = aggregation.buckets[&AggregateKey::new("B", "Y")];
        assert_eq!((a.volume, a.order_count), (1.0, 1));
        assert_eq!((b.volume, b.order_count), (4.0, 1));
        assert_eq!(aggregation.grand_total.volume, 5.0);
        assert_eq!(aggregation.grand_total.order_count, 2);
    }

    #[test]
    fn same_algorithm_in_two_markets_is_two_buckets() {
        let records = vec![order("EU", "Scrypt", 1.0, 1.0), order("USA", "Scrypt", 1.0, 1.0)];

        let aggregation = aggregate(&records, AggregationPolicy::default());

        assert_eq!(aggregation.bucket_count(), 2);
    }

    #[test]
    fn dead_orders_count_by_default() {
        let records = vec![
            OrderRecord::new(false, 1.0, 2.0, "EU", "X"),
            OrderRecord::new(true, 1.0, 1.0, "EU", "X"),
        ];

        let aggregation = aggregate(&records, AggregationPolicy::ALL_ORDERS);

        assert_eq!(aggregation.grand_total.volume, 3.0);
        assert_eq!(aggregation.grand_total.order_count, 2);
        assert_eq!(aggregation.skipped, 0);
    }

    #[test]
    fn alive_only_policy_skips_dead_orders() {
        let records = vec![
            OrderRecord::new(false, 1.0, 2.0, "EU", "X"),
            OrderRecord::new(true, 1.0, 1.0, "EU", "X"),
            OrderRecord::new(false, 5.0, 5.0, "USA", "Y"),
        ];

        let aggregation = aggregate(&records, AggregationPolicy::ALIVE_ONLY);

        assert_eq!(aggregation.bucket_count(), 1);
        assert_eq!(aggregation.grand_total.volume, 1.0);
        assert_eq!(aggregation.grand_total.order_count, 1);
        assert_eq!(aggregation.skipped, 2);
        assert!(!aggregation.buckets.contains_key(&AggregateKey::new("USA", "Y")));
    }

    #[test]
    fn sorted_buckets_are_ordered_by_key() {
        let records = vec![
            order("USA", "B", 1.0, 1.0),
            order("EU", "Z", 1.0, 1.0),
            order("EU", "A", 1.0, 1.0),
        ];

        let aggregation = aggregate(&records, AggregationPolicy::default());
        let keys: Vec<String> = aggregation
            .sorted_buckets()
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect();

        assert_eq!(keys, vec!["EU/A", "EU/Z", "USA/B"]);
    }

    // Prices and speeds are multiples of 1/4 so every product and partial
    // sum is exactly representable and the invariant can be checked with ==.
    fn arb_record() -> impl Strategy<Value = OrderRecord> {
        (
            any::<bool>(),
            0u32..4_000,
            0u32..4_000,
            prop::sample::select(vec!["EU", "USA"]),
            prop::sample::select(vec!["Scrypt", "SHA256", "X16R", "KawPow"]),
        )
            .prop_map(|(alive, price, speed, market, algo)| {
                OrderRecord::new(
                    alive,
                    f64::from(price) / 4.0,
                    f64::from(speed) / 4.0,
                    market,
                    algo,
                )
            })
    }

    proptest! {
        #[test]
        fn grand_total_equals_sum_of_buckets(
            records in prop::collection::vec(arb_record(), 0..200),
            alive_only in any::<bool>(),
        ) {
            let policy = AggregationPolicy { include_only_alive: alive_only };
            let aggregation = aggregate(&records, policy);

            let volume: f64 = aggregation.buckets.values().map(|b| b.volume).sum();
            let count: u64 = aggregation.buckets.values().map(|b| b.order_count).sum();

            prop_assert_eq!(volume, aggregation.grand_total.volume);
            prop_assert_eq!(count, aggregation.grand_total.order_count);
            prop_assert_eq!(count + aggregation.skipped, records.len() as u64);
        }
    }
}
