//! Start offset resolution.
//!
//! `Oldest` and `Newest` map straight to the broker's sentinels. `FollowLatest`
//! needs the partition's high watermark, which is probed against the leader
//! with bounded retries: one deadline is fixed when probing starts and every
//! attempt, including the one in flight, is cut off by it.

use std::time::Duration;

use futures::future::try_join_all;
use kafka_types::{HighWatermark, OffsetMode, PartitionOffsetState, StartOffset};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::broker::PartitionBroker;
use crate::error::{Error, Result};

/// Lower bound on the spacing between probe attempts.
const MIN_PROBE_BACKOFF: Duration = Duration::from_millis(1);

/// Longest deadline a resolver will wait for; larger timeouts are clamped.
const MAX_DEADLINE: Duration = Duration::from_secs(86_400 * 365);

/// Timing of the high watermark probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Total time allowed for probing one partition
    pub timeout: Duration,
    /// Pause between failed attempts
    pub backoff: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            backoff: Duration::from_millis(10),
        }
    }
}

/// Maps an [`OffsetMode`] to a concrete start offset per partition.
#[derive(Debug, Clone, Default)]
pub struct OffsetResolver {
    policy: ProbePolicy,
}

impl OffsetResolver {
    pub fn new(policy: ProbePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ProbePolicy {
        &self.policy
    }

    /// Resolve the start offset of a single partition.
    pub async fn resolve<B: PartitionBroker + ?Sized>(
        &self,
        broker: &B,
        topic: &str,
        partition: i32,
        mode: OffsetMode,
    ) -> Result<PartitionOffsetState> {
        let start = match mode {
            OffsetMode::Oldest => StartOffset::Beginning,
            OffsetMode::Newest => StartOffset::End,
            OffsetMode::FollowLatest => {
                let high_watermark = self.probe_with_retry(broker, topic, partition).await?;
                let start = high_watermark.follow_start();
                match start {
                    StartOffset::At(offset) => {
                        info!("Starting on partition {partition} with offset {offset}");
                    }
                    _ => debug!(
                        "Partition {partition} has high watermark {}, starting at newest",
                        high_watermark.offset
                    ),
                }
                start
            }
        };

        Ok(PartitionOffsetState { partition, start })
    }

    /// Resolve every partition concurrently, failing on the first error.
    pub async fn resolve_all<B: PartitionBroker + ?Sized>(
        &self,
        broker: &B,
        topic: &str,
        partitions: &[i32],
        mode: OffsetMode,
    ) -> Result<Vec<PartitionOffsetState>> {
        try_join_all(
            partitions
                .iter()
                .map(|&partition| self.resolve(broker, topic, partition, mode)),
        )
        .await
    }

    async fn probe_with_retry<B: PartitionBroker + ?Sized>(
        &self,
        broker: &B,
        topic: &str,
        partition: i32,
    ) -> Result<HighWatermark> {
        let started = Instant::now();
        let deadline = started + self.policy.timeout.min(MAX_DEADLINE);
        let backoff = self.policy.backoff.max(MIN_PROBE_BACKOFF);
        let mut last_error = None;
        let mut attempt = 0u32;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            attempt += 1;
            let probe = broker.probe_high_watermark(topic, partition, remaining);
            match tokio::time::timeout_at(deadline, probe).await {
                Ok(Ok(high_watermark)) => {
                    debug!(
                        "Probed partition {partition} (leader {:?}) on attempt {attempt}: high watermark {}",
                        high_watermark.leader, high_watermark.offset
                    );
                    return Ok(high_watermark);
                }
                Ok(Err(e)) => {
                    warn!("High watermark probe attempt {attempt} for partition {partition} failed: {e}");
                    last_error = Some(e);
                }
                Err(_) => break,
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(backoff.min(remaining)).await;
        }

        Err(match last_error {
            Some(source) => Error::OffsetProbe {
                partition,
                source: Box::new(source),
            },
            None => Error::OffsetProbeTimeout {
                partition,
                elapsed_ms: started.elapsed().as_millis(),
            },
        })
    }
}
