//! Kafka record types.
//!
//! A [`FetchedRecord`] is what a partition fetch loop hands to the decode
//! pipeline; a [`DecodedRecord`] is what the pipeline hands to the output
//! sink. Every fetched record yields exactly one decoded record.

use chrono::{DateTime, Utc};

/// A raw header as read from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl RecordHeader {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A record fetched from one partition, not yet decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecord {
    /// Kafka partition number
    pub partition: i32,
    /// Kafka offset within the partition
    pub offset: i64,
    /// Record timestamp (create or log-append time), if the broker provided one
    pub timestamp: Option<DateTime<Utc>>,
    /// Record key (if any)
    pub key: Option<Vec<u8>>,
    /// Record value, empty for tombstones
    pub value: Vec<u8>,
    /// Headers in wire order
    pub headers: Vec<RecordHeader>,
    /// Problems met while reading this record's key or headers.
    ///
    /// These never drop the record; they are shown next to it.
    pub read_errors: Vec<String>,
}

impl FetchedRecord {
    /// Create a record with no key, headers or timestamp.
    pub fn new(partition: i32, offset: i64, value: impl Into<Vec<u8>>) -> Self {
        Self {
            partition,
            offset,
            timestamp: None,
            key: None,
            value: value.into(),
            headers: Vec::new(),
            read_errors: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push(RecordHeader::new(key, value));
        self
    }

    pub fn with_timestamp_millis(mut self, millis: i64) -> Self {
        self.timestamp = timestamp_from_millis(millis);
        self
    }
}

/// Convert milliseconds since the epoch to a UTC timestamp.
pub fn timestamp_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// A header ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHeader {
    pub key: String,
    /// Display bytes: sniffed text, or the header value exactly as received
    pub value: Vec<u8>,
}

/// A record ready to be written to the output sink.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub partition: i32,
    pub offset: i64,
    pub timestamp: Option<DateTime<Utc>>,
    /// Rendered key, `None` when the record has no (or an empty) key
    pub key: Option<String>,
    pub headers: Vec<DecodedHeader>,
    /// Displayable value: decoded and formatted, or the raw bytes on failure
    pub value: Vec<u8>,
    /// Diagnostics collected while reading and decoding this record
    pub decode_errors: Vec<String>,
}
