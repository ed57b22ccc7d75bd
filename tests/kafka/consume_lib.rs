//! Kafka consume E2E test
//!
//! Test flow:
//! 1. Create a topic with three partitions
//! 2. Publish sample events with keys and tagged headers using the test producer
//! 3. Consume the topic through `KafkaBroker` into a collecting sink
//! 4. Verify per-partition ordering, decoded headers and start offsets

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kafka_tail_producer::{publish_test_events, KafkaTestProducer};
use kafka_tail_source::{
    run_consume, ConsumeRequest, DecodePipeline, DecodedRecord, KafkaBroker, KafkaConfig,
    OffsetMode, OffsetResolver, ProbePolicy, RecordSink,
};
use tokio::time::sleep;

/// Kafka broker address for testing
const KAFKA_BROKER: &str = "kafka:9092";

const PARTITIONS: i32 = 3;
const PER_PARTITION: usize = 4;

#[derive(Default)]
struct CollectingSink {
    records: Mutex<Vec<DecodedRecord>>,
}

impl CollectingSink {
    fn by_partition(&self) -> BTreeMap<i32, Vec<DecodedRecord>> {
        let mut grouped: BTreeMap<i32, Vec<DecodedRecord>> = BTreeMap::new();
        for record in self.records.lock().unwrap().iter() {
            grouped
                .entry(record.partition)
                .or_default()
                .push(record.clone());
        }
        grouped
    }
}

impl RecordSink for CollectingSink {
    fn write(&self, record: &DecodedRecord) -> kafka_tail_source::Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn test_topic(label: &str) -> String {
    format!(
        "test-tail-{label}-{}-{}",
        std::process::id(),
        chrono::Utc::now().timestamp_millis()
    )
}

async fn publish(topic: &str) -> anyhow::Result<()> {
    let producer = KafkaTestProducer::new(KAFKA_BROKER).await?;
    producer.create_topic_if_not_exists(topic, PARTITIONS).await?;

    // Give Kafka a moment to propagate topic metadata
    sleep(Duration::from_millis(500)).await;

    publish_test_events(&producer, topic, PARTITIONS, PER_PARTITION).await?;
    Ok(())
}

/// Consume for a fixed window; Kafka streams never end on their own.
async fn consume_for(topic: &str, mode: OffsetMode, window: Duration) -> Arc<CollectingSink> {
    let broker = KafkaBroker::new(KafkaConfig {
        brokers: KAFKA_BROKER.to_string(),
        ..KafkaConfig::default()
    })
    .unwrap();
    let resolver = OffsetResolver::new(ProbePolicy {
        timeout: Duration::from_secs(5),
        backoff: Duration::from_millis(50),
    });
    let sink = Arc::new(CollectingSink::default());
    let request = ConsumeRequest::new(topic, mode);

    let result = tokio::time::timeout(
        window,
        run_consume(
            &broker,
            &request,
            &resolver,
            DecodePipeline::default(),
            sink.clone(),
        ),
    )
    .await;
    if let Ok(outcome) = result {
        panic!("consume ended before the window closed: {outcome:?}");
    }
    sink
}

#[tokio::test]
#[ignore = "requires a Kafka broker at kafka:9092"]
async fn test_consume_oldest_reads_every_partition() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("kafka_tail=debug,kafka_tail_source=debug")
        .try_init()
        .ok();

    let topic = test_topic("oldest");
    publish(&topic).await?;

    let sink = consume_for(&topic, OffsetMode::Oldest, Duration::from_secs(10)).await;
    let grouped = sink.by_partition();

    assert_eq!(grouped.len(), PARTITIONS as usize);
    for (partition, records) in &grouped {
        let offsets: Vec<i64> = records.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, (0..PER_PARTITION as i64).collect::<Vec<_>>());

        for (seq, record) in records.iter().enumerate() {
            assert!(record.decode_errors.is_empty(), "{:?}", record.decode_errors);
            assert!(record.timestamp.is_some());

            let value: serde_json::Value = serde_json::from_slice(&record.value)?;
            assert_eq!(value["partition"], *partition);
            assert_eq!(value["seq"], seq);

            let headers: BTreeMap<&str, String> = record
                .headers
                .iter()
                .map(|h| (h.key.as_str(), String::from_utf8_lossy(&h.value).into_owned()))
                .collect();
            assert_eq!(headers["source"], "kafka-tail-tests");
            assert_eq!(headers["trace"], format!("p{partition}-{seq}"));
            assert_eq!(headers["sequence"], seq.to_string());

            let key = record.key.as_deref().unwrap_or_default();
            assert_eq!(key, format!(r#"{{ "user": "user_{:03}" }}"#, seq + 1));
        }
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires a Kafka broker at kafka:9092"]
async fn test_consume_follow_starts_at_latest_record() -> anyhow::Result<()> {
    let topic = test_topic("follow");
    publish(&topic).await?;

    let sink = consume_for(&topic, OffsetMode::FollowLatest, Duration::from_secs(10)).await;
    let grouped = sink.by_partition();

    assert_eq!(grouped.len(), PARTITIONS as usize);
    for records in grouped.values() {
        let offsets: Vec<i64> = records.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![PER_PARTITION as i64 - 1]);
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires a Kafka broker at kafka:9092"]
async fn test_consume_newest_skips_existing_records() -> anyhow::Result<()> {
    let topic = test_topic("newest");
    publish(&topic).await?;

    let sink = consume_for(&topic, OffsetMode::Newest, Duration::from_secs(5)).await;
    assert!(sink.by_partition().is_empty());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a Kafka broker at kafka:9092"]
async fn test_consume_unknown_topic_fails() {
    let broker = KafkaBroker::new(KafkaConfig {
        brokers: KAFKA_BROKER.to_string(),
        properties: vec![(
            "allow.auto.create.topics".to_string(),
            "false".to_string(),
        )],
        ..KafkaConfig::default()
    })
    .unwrap();
    let request = ConsumeRequest::new(test_topic("missing"), OffsetMode::Oldest);

    let result = run_consume(
        &broker,
        &request,
        &OffsetResolver::default(),
        DecodePipeline::default(),
        Arc::new(CollectingSink::default()),
    )
    .await;
    assert!(result.is_err());
}
