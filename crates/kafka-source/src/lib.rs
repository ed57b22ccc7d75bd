//! Multi-partition Kafka consumer for the terminal.
//!
//! This crate provides:
//! - Start offset resolution (oldest, newest, or follow the latest record)
//! - One concurrent fetch loop per partition
//! - Record decoding through an optional schema decoder, plus header sniffing
//! - Synchronized output that never interleaves records of different partitions
//!
//! # Partial failure
//!
//! Failures before fetching starts (unknown topic, offset probe timeout,
//! partition attach failure) abort the consume operation. Once fetching, a
//! record that cannot be decoded is still written, with its raw bytes and a
//! diagnostic.

pub mod broker;

/// rdkafka-backed [`broker::PartitionBroker`].
pub mod client;
pub mod consume;

/// Partition worker pool.
pub mod consumer;
pub mod decode;
pub mod error;
pub mod offset;
pub mod schema;
pub mod sink;

pub use broker::{PartitionBroker, PartitionFetcher};
pub use client::{KafkaBroker, KafkaConfig};
pub use consume::{run_consume, ConsumeRequest};
pub use consumer::{PartitionSummary, PartitionWorkerPool};
pub use decode::DecodePipeline;
pub use error::{Error, Result};
pub use offset::{OffsetResolver, ProbePolicy};
pub use schema::{PayloadDecoder, SchemaDecoder};
pub use sink::{RecordSink, SynchronizedSink};

// Re-export from kafka-types for convenience
pub use kafka_types::{
    DecodedHeader, DecodedRecord, FetchedRecord, HighWatermark, OffsetMode, PartitionOffsetState,
    RecordHeader, StartOffset,
};
