use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kafka_types::record::timestamp_from_millis;
use kafka_types::{FetchedRecord, HighWatermark, RecordHeader, StartOffset};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer as RdkafkaConsumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::{BorrowedMessage, Headers, Message as RdkafkaMessage};
use rdkafka::{Offset, TopicPartitionList};
use tracing::{debug, info};

use crate::broker::{PartitionBroker, PartitionFetcher};
use crate::error::{Error, Result};

/// Connection settings for the rdkafka-backed broker.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Group id set on the clients.
    ///
    /// Partitions are assigned manually, so the group is never joined and no
    /// offsets are committed under it.
    pub group_id: String,
    /// Timeout for metadata requests
    pub metadata_timeout: Duration,
    /// Extra librdkafka properties, applied last
    pub properties: Vec<(String, String)>,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "kafka-tail".to_string(),
            metadata_timeout: Duration::from_secs(10),
            properties: Vec::new(),
        }
    }
}

impl KafkaConfig {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "false")
            .set("enable.auto.offset.store", "false")
            .set("enable.partition.eof", "false");
        for (key, value) in &self.properties {
            config.set(key, value);
        }
        config
    }
}

/// [`PartitionBroker`] over rdkafka.
///
/// Metadata and watermark requests go through one shared `BaseConsumer`; each
/// partition gets its own manually assigned `StreamConsumer`.
pub struct KafkaBroker {
    config: KafkaConfig,
    metadata: Arc<BaseConsumer>,
    leaders: Mutex<HashMap<i32, i32>>,
}

impl KafkaBroker {
    pub fn new(config: KafkaConfig) -> Result<Self> {
        let metadata: BaseConsumer = config
            .client_config()
            .create()
            .map_err(|e| Error::Broker(format!("Failed to create metadata client: {e}")))?;

        Ok(Self {
            config,
            metadata: Arc::new(metadata),
            leaders: Mutex::new(HashMap::new()),
        })
    }

    fn leader(&self, partition: i32) -> Option<i32> {
        self.leaders
            .lock()
            .ok()
            .and_then(|leaders| leaders.get(&partition).copied())
    }
}

#[async_trait]
impl PartitionBroker for KafkaBroker {
    async fn partitions(&self, topic: &str) -> Result<Vec<i32>> {
        let consumer = Arc::clone(&self.metadata);
        let requested = topic.to_string();
        let timeout = self.config.metadata_timeout;
        let layout = tokio::task::spawn_blocking(move || {
            partition_layout(&consumer, &requested, timeout)
        })
        .await
        .map_err(|e| Error::Broker(format!("Metadata task failed: {e}")))??;

        if let Ok(mut leaders) = self.leaders.lock() {
            leaders.extend(layout.iter().copied());
        }
        let mut partitions: Vec<i32> = layout.into_iter().map(|(id, _leader)| id).collect();
        partitions.sort_unstable();

        debug!("Topic {topic} has partitions {partitions:?}");
        Ok(partitions)
    }

    async fn probe_high_watermark(
        &self,
        topic: &str,
        partition: i32,
        budget: Duration,
    ) -> Result<HighWatermark> {
        let consumer = Arc::clone(&self.metadata);
        let topic = topic.to_string();
        // librdkafka takes the timeout as an i32 of milliseconds
        let budget = budget.min(Duration::from_millis(i32::MAX as u64));
        let (_low, high) = tokio::task::spawn_blocking(move || {
            consumer.fetch_watermarks(&topic, partition, budget)
        })
        .await
        .map_err(|e| Error::Broker(format!("Watermark task failed: {e}")))??;

        Ok(HighWatermark {
            partition,
            leader: self.leader(partition),
            offset: high,
        })
    }

    async fn open_partition(
        &self,
        topic: &str,
        partition: i32,
        start: StartOffset,
    ) -> Result<Box<dyn PartitionFetcher>> {
        let consumer: StreamConsumer = self.config.client_config().create()?;

        let offset = match start {
            StartOffset::Beginning => Offset::Beginning,
            StartOffset::End => Offset::End,
            StartOffset::At(offset) => Offset::Offset(offset),
        };
        let mut assignment = TopicPartitionList::new();
        assignment.add_partition_offset(topic, partition, offset)?;
        consumer.assign(&assignment)?;

        info!("Attached to partition {partition} of topic {topic} at offset {start}");
        Ok(Box::new(KafkaPartitionFetcher { consumer }))
    }
}

/// `(partition, leader)` pairs of `topic`, from a blocking metadata request.
fn partition_layout(
    consumer: &BaseConsumer,
    topic: &str,
    timeout: Duration,
) -> Result<Vec<(i32, i32)>> {
    let metadata = consumer.fetch_metadata(Some(topic), timeout)?;
    let topic_metadata = metadata
        .topics()
        .iter()
        .find(|t| t.name() == topic)
        .ok_or_else(|| Error::TopicNotFound(topic.to_string()))?;

    if let Some(err) = topic_metadata.error() {
        let code = RDKafkaErrorCode::from(err);
        if code == RDKafkaErrorCode::UnknownTopicOrPartition {
            return Err(Error::TopicNotFound(topic.to_string()));
        }
        return Err(Error::Kafka(KafkaError::MetadataFetch(code)));
    }

    let layout: Vec<(i32, i32)> = topic_metadata
        .partitions()
        .iter()
        .map(|p| (p.id(), p.leader()))
        .collect();
    if layout.is_empty() {
        return Err(Error::TopicNotFound(topic.to_string()));
    }
    Ok(layout)
}

/// Fetch stream of a single assigned partition.
struct KafkaPartitionFetcher {
    consumer: StreamConsumer,
}

#[async_trait]
impl PartitionFetcher for KafkaPartitionFetcher {
    async fn next_record(&mut self) -> Option<Result<FetchedRecord>> {
        // A stream consumer never runs dry on its own; it only ends with the
        // process.
        Some(
            self.consumer
                .recv()
                .await
                .map(|message| to_fetched_record(&message))
                .map_err(Error::from),
        )
    }
}

fn to_fetched_record(message: &BorrowedMessage<'_>) -> FetchedRecord {
    let mut read_errors = Vec::new();
    let mut headers = Vec::new();

    if let Some(borrowed) = message.headers() {
        for idx in 0..borrowed.count() {
            match borrowed.try_get(idx) {
                Some(header) => headers.push(RecordHeader::new(
                    header.key.as_bytes(),
                    header.value.unwrap_or_default(),
                )),
                None => read_errors.push(format!("could not read header {idx}")),
            }
        }
    }

    FetchedRecord {
        partition: message.partition(),
        offset: message.offset(),
        timestamp: message.timestamp().to_millis().and_then(timestamp_from_millis),
        key: message.key().map(|k| k.to_vec()),
        value: message.payload().map(|p| p.to_vec()).unwrap_or_default(),
        headers,
        read_errors,
    }
}
