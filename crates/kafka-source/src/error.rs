use thiserror::Error;

/// Errors that abort a consume operation.
///
/// Per-record decode problems are not represented here: they are attached to
/// the record as diagnostics and never stop consumption.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Broker error: {0}")]
    Broker(String),

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Partition {partition} does not exist in topic {topic}")]
    UnknownPartition { topic: String, partition: i32 },

    #[error("Unable to get available offsets for partition {partition}: {source}")]
    OffsetProbe {
        partition: i32,
        #[source]
        source: Box<Error>,
    },

    #[error("Timed out after {elapsed_ms}ms getting available offsets for partition {partition}")]
    OffsetProbeTimeout { partition: i32, elapsed_ms: u128 },

    #[error("Unable to consume partition {partition}: {source}")]
    Attach {
        partition: i32,
        #[source]
        source: Box<Error>,
    },

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("Partition worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, Error>;
