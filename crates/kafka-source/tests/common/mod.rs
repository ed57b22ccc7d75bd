//! In-memory broker used to drive the consumer core without Kafka.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kafka_tail_source::{
    Error, FetchedRecord, HighWatermark, PartitionBroker, PartitionFetcher, Result, StartOffset,
};

#[derive(Clone)]
pub enum Step {
    Record(FetchedRecord),
    ReceiveError,
}

#[derive(Default)]
pub struct MemoryBroker {
    logs: BTreeMap<i32, Vec<Step>>,
    fail_attach: Option<i32>,
    probes: AtomicU32,
    opened: Mutex<Vec<(i32, StartOffset)>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a partition whose log holds `values` at offsets 0, 1, 2, ...
    pub fn with_partition(mut self, partition: i32, values: &[&[u8]]) -> Self {
        let steps = values
            .iter()
            .enumerate()
            .map(|(offset, value)| {
                Step::Record(
                    FetchedRecord::new(partition, offset as i64, value.to_vec())
                        .with_timestamp_millis(1_700_000_000_000 + offset as i64),
                )
            })
            .collect();
        self.logs.insert(partition, steps);
        self
    }

    pub fn with_steps(mut self, partition: i32, steps: Vec<Step>) -> Self {
        self.logs.insert(partition, steps);
        self
    }

    pub fn failing_attach(mut self, partition: i32) -> Self {
        self.fail_attach = Some(partition);
        self
    }

    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> Vec<(i32, StartOffset)> {
        let mut opened = self.opened.lock().unwrap().clone();
        opened.sort_by_key(|(partition, _)| *partition);
        opened
    }

    fn records(&self, partition: i32) -> impl Iterator<Item = &FetchedRecord> {
        self.logs
            .get(&partition)
            .into_iter()
            .flatten()
            .filter_map(|step| match step {
                Step::Record(record) => Some(record),
                Step::ReceiveError => None,
            })
    }
}

#[async_trait]
impl PartitionBroker for MemoryBroker {
    async fn partitions(&self, topic: &str) -> Result<Vec<i32>> {
        if self.logs.is_empty() {
            return Err(Error::TopicNotFound(topic.to_string()));
        }
        Ok(self.logs.keys().copied().collect())
    }

    async fn probe_high_watermark(
        &self,
        _topic: &str,
        partition: i32,
        _budget: Duration,
    ) -> Result<HighWatermark> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let offset = self
            .records(partition)
            .map(|record| record.offset + 1)
            .max()
            .unwrap_or(0);
        Ok(HighWatermark {
            partition,
            leader: Some(1),
            offset,
        })
    }

    async fn open_partition(
        &self,
        _topic: &str,
        partition: i32,
        start: StartOffset,
    ) -> Result<Box<dyn PartitionFetcher>> {
        if self.fail_attach == Some(partition) {
            return Err(Error::Broker("leader not available".to_string()));
        }
        self.opened.lock().unwrap().push((partition, start));

        let steps: VecDeque<Step> = self
            .logs
            .get(&partition)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|step| match (step, start) {
                (Step::Record(_), StartOffset::End) => false,
                (Step::Record(record), StartOffset::At(offset)) => record.offset >= offset,
                _ => true,
            })
            .collect();
        Ok(Box::new(MemoryFetcher { steps }))
    }
}

struct MemoryFetcher {
    steps: VecDeque<Step>,
}

#[async_trait]
impl PartitionFetcher for MemoryFetcher {
    async fn next_record(&mut self) -> Option<Result<FetchedRecord>> {
        // Give other partitions a chance to run between records.
        tokio::task::yield_now().await;
        match self.steps.pop_front()? {
            Step::Record(record) => Some(Ok(record)),
            Step::ReceiveError => Some(Err(Error::Broker("fetch failed".to_string()))),
        }
    }
}

/// A write observed by [`Recorder`], with its global sequence number.
#[derive(Debug, Clone)]
pub struct Observed {
    pub seq: u64,
    pub stream: &'static str,
    pub text: String,
}

/// Writer that logs every write it sees, shared between both sink streams.
#[derive(Clone)]
pub struct Recorder {
    stream: &'static str,
    seq: Arc<AtomicU64>,
    log: Arc<Mutex<Vec<Observed>>>,
}

impl Recorder {
    pub fn pair() -> (Recorder, Recorder) {
        let seq = Arc::new(AtomicU64::new(0));
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Recorder {
                stream: "diagnostics",
                seq: Arc::clone(&seq),
                log: Arc::clone(&log),
            },
            Recorder {
                stream: "payload",
                seq,
                log,
            },
        )
    }

    pub fn observed(&self) -> Vec<Observed> {
        let mut log = self.log.lock().unwrap().clone();
        log.sort_by_key(|o| o.seq);
        log
    }
}

impl Write for Recorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        std::thread::yield_now();
        self.log.lock().unwrap().push(Observed {
            seq,
            stream: self.stream,
            text: String::from_utf8_lossy(buf).into_owned(),
        });
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
