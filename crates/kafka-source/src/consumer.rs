//! One fetch loop per partition.
//!
//! Every partition gets its own tokio task that pulls records in offset order,
//! decodes them and hands them to the shared sink. Tasks share nothing but the
//! decode pipeline (read-only) and the sink (internally locked). The pool
//! completes when every partition's fetch stream has closed; for a live topic
//! that means it runs until the process is stopped. A worker that fails to
//! write its output stops the whole pool.

use std::sync::Arc;

use futures::future::try_join_all;
use kafka_types::PartitionOffsetState;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::broker::{PartitionBroker, PartitionFetcher};
use crate::decode::DecodePipeline;
use crate::error::{Error, Result};
use crate::sink::RecordSink;

/// Per-partition totals reported when a fetch loop ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSummary {
    pub partition: i32,
    /// Records written to the sink
    pub records: u64,
    /// Transient receive errors that were skipped
    pub receive_errors: u64,
}

/// Spawns and joins the partition fetch loops.
pub struct PartitionWorkerPool {
    pipeline: Arc<DecodePipeline>,
    sink: Arc<dyn RecordSink>,
}

impl PartitionWorkerPool {
    pub fn new(pipeline: Arc<DecodePipeline>, sink: Arc<dyn RecordSink>) -> Self {
        Self { pipeline, sink }
    }

    /// Attach to every partition, then run all fetch loops to completion.
    ///
    /// Attaching happens before any loop starts, so a partition that cannot be
    /// consumed fails the whole operation without output.
    pub async fn run<B: PartitionBroker + ?Sized>(
        &self,
        broker: &B,
        topic: &str,
        states: &[PartitionOffsetState],
    ) -> Result<Vec<PartitionSummary>> {
        let fetchers = try_join_all(states.iter().map(|state| async move {
            broker
                .open_partition(topic, state.partition, state.start)
                .await
                .map(|fetcher| (state.partition, fetcher))
                .map_err(|e| Error::Attach {
                    partition: state.partition,
                    source: Box::new(e),
                })
        }))
        .await?;

        info!(
            "Consuming {} partition(s) of topic {topic}",
            fetchers.len()
        );

        let mut workers = JoinSet::new();
        for (partition, fetcher) in fetchers {
            let pipeline = Arc::clone(&self.pipeline);
            let sink = Arc::clone(&self.sink);
            workers.spawn(run_partition(partition, fetcher, pipeline, sink));
        }

        let mut summaries = Vec::with_capacity(workers.len());
        while let Some(joined) = workers.join_next().await {
            let outcome = joined
                .map_err(|e| Error::Worker(e.to_string()))
                .and_then(|result| result);
            match outcome {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    workers.abort_all();
                    return Err(e);
                }
            }
        }

        summaries.sort_by_key(|summary| summary.partition);
        Ok(summaries)
    }
}

async fn run_partition(
    partition: i32,
    mut fetcher: Box<dyn PartitionFetcher>,
    pipeline: Arc<DecodePipeline>,
    sink: Arc<dyn RecordSink>,
) -> Result<PartitionSummary> {
    let mut summary = PartitionSummary {
        partition,
        records: 0,
        receive_errors: 0,
    };

    while let Some(next) = fetcher.next_record().await {
        let record = match next {
            Ok(record) => record,
            Err(e) => {
                warn!("Error receiving message on partition {partition}: {e}");
                summary.receive_errors += 1;
                continue;
            }
        };

        debug!("Received message {}/{}", record.partition, record.offset);
        let decoded = pipeline.decode(record).await;
        // Sink writes block on terminal I/O and the shared output lock
        let sink = Arc::clone(&sink);
        tokio::task::spawn_blocking(move || sink.write(&decoded))
            .await
            .map_err(|e| Error::Worker(e.to_string()))??;
        summary.records += 1;
    }

    debug!(
        "Fetch stream for partition {partition} closed after {} record(s)",
        summary.records
    );
    Ok(summary)
}
