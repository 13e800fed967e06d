//! Snapshot Rows
//!
//! A [`Snapshot`] is one persisted row: either a single bucket or the
//! cycle's grand total. Every row produced for a cycle carries the same
//! timestamp so the rows of a cycle can be correlated later.

use chrono::{DateTime, Utc};
use super::aggregation::Aggregation;
use super::order::{AggregateBucket, AggregateKey};

/// Location recorded on the grand-total row.
pub const GRAND_TOTAL_LOCATION: &str = "BOTH";

/// Algorithm recorded on the grand-total row.
pub const GRAND_TOTAL_ALGORITHM: &str = "total";

/// One persisted snapshot row.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Cycle timestamp, shared by every row of the cycle.
    pub time: DateTime<Utc>,
    /// Region, or [`GRAND_TOTAL_LOCATION`].
    pub location: String,
    /// Category, or [`GRAND_TOTAL_ALGORITHM`].
    pub algorithm: String,
    /// Aggregated volume.
    pub volume: f64,
    /// Number of contributing orders.
    pub orders: i64,
}

impl Snapshot {
    /// Row for a single bucket.
    #[must_use]
    pub fn for_bucket(time: DateTime<Utc>, key: &AggregateKey, bucket: &AggregateBucket) -> Self {
        Self {
            time,
            location: key.region.clone(),
            algorithm: key.category.clone(),
            volume: bucket.volume,
            orders: order_count_to_i64(bucket.order_count),
        }
    }

    /// Row for the grand total.
    #[must_use]
    pub fn grand_total(time: DateTime<Utc>, total: &AggregateBucket) -> Self {
        Self {
            time,
            location: GRAND_TOTAL_LOCATION.to_string(),
            algorithm: GRAND_TOTAL_ALGORITHM.to_string(),
            volume: total.volume,
            orders: order_count_to_i64(total.order_count),
        }
    }

    /// Whether this is the synthetic grand-total row.
    #[must_use]
    pub fn is_grand_total(&self) -> bool {
        self.location == GRAND_TOTAL_LOCATION && self.algorithm == GRAND_TOTAL_ALGORITHM
    }

    /// Key identifying the row within its cycle.
    #[must_use]
    pub fn key(&self) -> AggregateKey {
        AggregateKey::new(self.location.clone(), self.algorithm.clone())
    }
}

impl Aggregation {
    /// Expand into the rows persisted for one cycle.
    ///
    /// Bucket rows come first in key order, followed by exactly one
    /// grand-total row. Every row carries `time`.
    #[must_use]
    pub fn snapshots(&self, time: DateTime<Utc>) -> Vec<Snapshot> {
        let mut rows: Vec<Snapshot> = self
            .sorted_buckets()
            .into_iter()
            .map(|(key, bucket)| Snapshot::for_bucket(time, key, bucket))
            .collect();
        rows.push(Snapshot::grand_total(time, &self.grand_total));
        rows
    }
}

fn order_count_to_i64(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
