//! Offset modes and per-partition start offsets.

use std::fmt;
use std::str::FromStr;

use crate::error::KafkaTypesError;

/// Where consumption should start on every partition of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetMode {
    /// Start at the beginning of each partition's log.
    #[default]
    Oldest,
    /// Start at the end of each partition's log, only surfacing new records.
    Newest,
    /// Start at the most recently written record (high watermark - 1).
    ///
    /// Requires a live probe of each partition's leader.
    FollowLatest,
}

impl FromStr for OffsetMode {
    type Err = KafkaTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" | "earliest" | "beginning" => Ok(OffsetMode::Oldest),
            "newest" | "latest" | "end" => Ok(OffsetMode::Newest),
            "follow" => Ok(OffsetMode::FollowLatest),
            _ => Err(KafkaTypesError::InvalidOffsetMode(s.to_string())),
        }
    }
}

impl fmt::Display for OffsetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetMode::Oldest => write!(f, "oldest"),
            OffsetMode::Newest => write!(f, "newest"),
            OffsetMode::FollowLatest => write!(f, "follow"),
        }
    }
}

/// A start position understood by the broker fetch primitive.
///
/// `Beginning` and `End` are the broker's sentinels; `At` is a concrete offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOffset {
    Beginning,
    End,
    At(i64),
}

impl fmt::Display for StartOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartOffset::Beginning => write!(f, "oldest"),
            StartOffset::End => write!(f, "newest"),
            StartOffset::At(offset) => write!(f, "{offset}"),
        }
    }
}

/// The resolved start offset of one partition.
///
/// Computed once before fetching begins and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionOffsetState {
    pub partition: i32,
    pub start: StartOffset,
}

/// Result of probing a partition leader for its high watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighWatermark {
    pub partition: i32,
    /// Broker id of the partition leader that answered, if known.
    pub leader: Option<i32>,
    /// Offset one past the last readable record.
    pub offset: i64,
}

impl HighWatermark {
    /// Start offset that surfaces exactly the most recent record.
    ///
    /// Falls back to the `End` sentinel when `offset - 1` is not positive.
    pub fn follow_start(&self) -> StartOffset {
        let last = self.offset - 1;
        if last > 0 {
            StartOffset::At(last)
        } else {
            StartOffset::End
        }
    }
}
