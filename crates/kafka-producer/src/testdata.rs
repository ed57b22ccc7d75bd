//! Test data publishing helpers for Kafka integration tests
//!
//! Every sample event carries a JSON value, a JSON key and three headers: a
//! plain UTF-8 one, a tagged short string (`0xA1`, length, bytes) and a tagged
//! big-endian u64 (`0x83`, eight bytes).

use crate::{KafkaTestProducer, TestRecord};
use anyhow::Context;
use serde_json::json;

const EVENT_TYPES: [&str; 4] = ["login", "purchase", "view", "logout"];

/// Tagged short string header encoding.
///
/// The length prefix is one byte, so values over 255 bytes are rejected.
pub fn short_string_header(value: &str) -> anyhow::Result<Vec<u8>> {
    let bytes = value.as_bytes();
    let len = u8::try_from(bytes.len())
        .with_context(|| format!("Short string header is {} bytes, max 255", bytes.len()))?;
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(0xA1);
    out.push(len);
    out.extend_from_slice(bytes);
    Ok(out)
}

/// Tagged big-endian u64 header encoding.
pub fn u64_header(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    out.push(0x83);
    out.extend_from_slice(&value.to_be_bytes());
    out
}

/// `per_partition` events for each of `partitions`, in publish order.
pub fn sample_events(partitions: i32, per_partition: usize) -> anyhow::Result<Vec<TestRecord>> {
    let mut records = Vec::new();
    for partition in 0..partitions {
        for seq in 0..per_partition {
            let event_type = EVENT_TYPES[seq % EVENT_TYPES.len()];
            let user = format!("user_{:03}", seq + 1);
            let value = json!({
                "event": event_type,
                "partition": partition,
                "seq": seq,
            });
            let key = json!({ "user": user });

            records.push(
                TestRecord::new(value.to_string().into_bytes())
                    .partition(partition)
                    .key(key.to_string().into_bytes())
                    .header("source", b"kafka-tail-tests".to_vec())
                    .header("trace", short_string_header(&format!("p{partition}-{seq}"))?)
                    .header("sequence", u64_header(seq as u64)),
            );
        }
    }
    Ok(records)
}

/// Publish [`sample_events`] to `topic`
pub async fn publish_test_events(
    producer: &KafkaTestProducer,
    topic: &str,
    partitions: i32,
    per_partition: usize,
) -> anyhow::Result<usize> {
    let records = sample_events(partitions, per_partition)?;
    for record in &records {
        producer.publish(topic, record).await?;
    }
    tracing::debug!("Published {} test events to {topic}", records.len());
    Ok(records.len())
}
