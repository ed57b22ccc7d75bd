//! Consume orchestration.
//!
//! ```text
//! partitions ─► OffsetResolver ─► PartitionWorkerPool ─► DecodePipeline ─► RecordSink
//! ```

use std::sync::Arc;

use kafka_types::OffsetMode;
use tracing::info;

use crate::broker::{select_partitions, PartitionBroker};
use crate::consumer::{PartitionSummary, PartitionWorkerPool};
use crate::decode::DecodePipeline;
use crate::error::Result;
use crate::offset::OffsetResolver;
use crate::sink::RecordSink;

/// What to consume. Fixed once consumption starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumeRequest {
    pub topic: String,
    /// Partitions to consume; empty means all of the topic's partitions
    pub partitions: Vec<i32>,
    pub offset_mode: OffsetMode,
}

impl ConsumeRequest {
    pub fn new(topic: impl Into<String>, offset_mode: OffsetMode) -> Self {
        Self {
            topic: topic.into(),
            partitions: Vec::new(),
            offset_mode,
        }
    }

    pub fn with_partitions(mut self, partitions: Vec<i32>) -> Self {
        self.partitions = partitions;
        self
    }
}

/// Consume every requested partition until all fetch streams close.
///
/// Partition listing, offset resolution and attaching are all done before the
/// first record is fetched; any failure there aborts the operation.
pub async fn run_consume<B: PartitionBroker + ?Sized>(
    broker: &B,
    request: &ConsumeRequest,
    resolver: &OffsetResolver,
    pipeline: DecodePipeline,
    sink: Arc<dyn RecordSink>,
) -> Result<Vec<PartitionSummary>> {
    let topic = request.topic.as_str();
    let available = broker.partitions(topic).await?;
    let partitions = select_partitions(topic, &available, &request.partitions)?;

    info!(
        "Resolving {} offsets for partitions {partitions:?} of topic {topic}",
        request.offset_mode
    );
    let states = resolver
        .resolve_all(broker, topic, &partitions, request.offset_mode)
        .await?;

    let pool = PartitionWorkerPool::new(Arc::new(pipeline), sink);
    pool.run(broker, topic, &states).await
}
