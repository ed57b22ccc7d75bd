//! Broker collaborator seam.
//!
//! The consumer core only needs three things from a broker: the partitions of
//! a topic, a (retryable) high watermark probe, and a per-partition fetch
//! stream. [`crate::client::KafkaBroker`] provides them over rdkafka; tests
//! drive the core with in-memory implementations.

use async_trait::async_trait;
use kafka_types::{FetchedRecord, HighWatermark, StartOffset};

use crate::error::{Error, Result};

/// A per-partition fetch stream.
#[async_trait]
pub trait PartitionFetcher: Send {
    /// Wait for the next record of this partition.
    ///
    /// Returns `None` once the stream is closed. An `Err` item is a transient
    /// receive error; the stream remains usable.
    async fn next_record(&mut self) -> Option<Result<FetchedRecord>>;
}

/// Access to a topic's partitions on a Kafka cluster.
#[async_trait]
pub trait PartitionBroker: Send + Sync {
    /// List the partitions of `topic` in ascending order.
    async fn partitions(&self, topic: &str) -> Result<Vec<i32>>;

    /// Ask the partition leader for its current high watermark.
    ///
    /// A single attempt; callers retry. `budget` bounds the request itself.
    async fn probe_high_watermark(
        &self,
        topic: &str,
        partition: i32,
        budget: std::time::Duration,
    ) -> Result<HighWatermark>;

    /// Attach a fetch stream to `partition` starting at `start`.
    async fn open_partition(
        &self,
        topic: &str,
        partition: i32,
        start: StartOffset,
    ) -> Result<Box<dyn PartitionFetcher>>;
}

/// Narrow the topic's partitions to the requested subset.
///
/// An empty request means every partition. Requested ids that the topic does
/// not have are an error.
pub fn select_partitions(topic: &str, available: &[i32], requested: &[i32]) -> Result<Vec<i32>> {
    if requested.is_empty() {
        return Ok(available.to_vec());
    }

    let mut selected = Vec::with_capacity(requested.len());
    for &partition in requested {
        if !available.contains(&partition) {
            return Err(Error::UnknownPartition {
                topic: topic.to_string(),
                partition,
            });
        }
        if !selected.contains(&partition) {
            selected.push(partition);
        }
    }
    selected.sort_unstable();
    Ok(selected)
}
