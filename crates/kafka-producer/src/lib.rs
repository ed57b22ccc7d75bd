//! Kafka producer library for testing kafka-tail
//!
//! Publishes records with explicit partitions, keys and headers so that
//! consumer tests can predict exactly what every partition holds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kafka_tail_producer::{KafkaTestProducer, TestRecord};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let producer = KafkaTestProducer::new("localhost:9092").await?;
//!     producer.create_topic_if_not_exists("events", 3).await?;
//!
//!     let record = TestRecord::new(br#"{"id":1}"#.to_vec())
//!         .partition(0)
//!         .key(b"user_001".to_vec())
//!         .header("source", b"test".to_vec());
//!     producer.publish("events", &record).await?;
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::time::Duration;

// Test data helpers module
pub mod testdata;

pub use testdata::{publish_test_events, sample_events};

/// A record to publish, with optional partition and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub partition: Option<i32>,
    pub key: Option<Vec<u8>>,
    pub value: Vec<u8>,
    pub headers: Vec<(String, Vec<u8>)>,
}

impl TestRecord {
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            partition: None,
            key: None,
            value,
            headers: Vec::new(),
        }
    }

    pub fn partition(mut self, partition: i32) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn key(mut self, key: Vec<u8>) -> Self {
        self.key = Some(key);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.headers.push((key.into(), value));
        self
    }
}

/// Kafka producer wrapper for testing
pub struct KafkaTestProducer {
    producer: FutureProducer,
    broker: String,
}

impl KafkaTestProducer {
    /// Create a new Kafka test producer
    pub async fn new(broker: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", broker)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Kafka producer")?;

        Ok(Self {
            producer,
            broker: broker.to_string(),
        })
    }

    /// Create Kafka topic if it doesn't exist
    pub async fn create_topic_if_not_exists(&self, topic: &str, partitions: i32) -> Result<()> {
        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.broker)
            .create()
            .context("Failed to create admin client")?;

        let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(1));
        let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(5)));

        match admin_client.create_topics(&[new_topic], &opts).await {
            Ok(results) => {
                for result in results {
                    match result {
                        Ok(topic_name) => {
                            tracing::info!("Topic '{topic_name}' created successfully");
                        }
                        Err((topic_name, err)) => {
                            if err.to_string().contains("already exists") {
                                tracing::info!("Topic '{topic_name}' already exists");
                            } else {
                                return Err(anyhow::anyhow!("Failed to create topic: {err}"));
                            }
                        }
                    }
                }
            }
            Err(e) => return Err(anyhow::anyhow!("Failed to create topics: {e}")),
        }

        Ok(())
    }

    /// Publish one record and wait for the delivery report
    pub async fn publish(&self, topic: &str, record: &TestRecord) -> Result<()> {
        let mut headers = OwnedHeaders::new_with_capacity(record.headers.len());
        for (key, value) in &record.headers {
            headers = headers.insert(Header {
                key: key.as_str(),
                value: Some(value.as_slice()),
            });
        }

        let mut future_record = FutureRecord::<[u8], [u8]>::to(topic)
            .payload(record.value.as_slice())
            .headers(headers);
        if let Some(key) = &record.key {
            future_record = future_record.key(key.as_slice());
        }
        if let Some(partition) = record.partition {
            future_record = future_record.partition(partition);
        }

        self.producer
            .send(future_record, Duration::from_secs(5))
            .await
            .map_err(|(err, _)| err)
            .with_context(|| format!("Failed to send record to Kafka topic {topic}"))?;

        tracing::debug!(
            "Published record to {topic} (partition {:?}, {} headers)",
            record.partition,
            record.headers.len()
        );
        Ok(())
    }
}
