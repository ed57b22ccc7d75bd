//! Synchronized terminal output.
//!
//! Each record is written as a diagnostics block (headers, key, partition,
//! offset, timestamp and any decode errors) on one stream and its payload on
//! another, normally stderr and stdout. Both writes for one record happen
//! under a single lock, so blocks from concurrently consumed partitions never
//! interleave.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::SecondsFormat;
use kafka_types::DecodedRecord;

use crate::error::{Error, Result};

/// Destination for decoded records, shared by all partition workers.
pub trait RecordSink: Send + Sync {
    fn write(&self, record: &DecodedRecord) -> Result<()>;
}

struct Streams<D, P> {
    diagnostics: D,
    payload: P,
}

/// Writes records to a diagnostics stream and a payload stream atomically.
pub struct SynchronizedSink<D, P> {
    streams: Mutex<Streams<D, P>>,
    raw: bool,
}

impl SynchronizedSink<io::Stderr, io::Stdout> {
    /// Diagnostics to stderr, payloads to stdout.
    pub fn stdio(raw: bool) -> Self {
        Self::new(io::stderr(), io::stdout(), raw)
    }
}

impl<D: Write, P: Write> SynchronizedSink<D, P> {
    /// In `raw` mode only decode errors go to the diagnostics stream.
    pub fn new(diagnostics: D, payload: P, raw: bool) -> Self {
        Self {
            streams: Mutex::new(Streams {
                diagnostics,
                payload,
            }),
            raw,
        }
    }

    /// Take the underlying streams back.
    pub fn into_inner(self) -> (D, P) {
        let streams = match self.streams.into_inner() {
            Ok(streams) => streams,
            Err(poisoned) => poisoned.into_inner(),
        };
        (streams.diagnostics, streams.payload)
    }
}

impl<D: Write + Send, P: Write + Send> RecordSink for SynchronizedSink<D, P> {
    fn write(&self, record: &DecodedRecord) -> Result<()> {
        // Render outside the lock; the critical section is only the writes.
        let block = render_diagnostics(record, self.raw)?;

        let mut streams = self
            .streams
            .lock()
            .map_err(|_| Error::Output(io::Error::other("output streams lock poisoned")))?;
        if !block.is_empty() {
            streams.diagnostics.write_all(&block)?;
            streams.diagnostics.flush()?;
        }
        streams.payload.write_all(&record.value)?;
        streams.payload.write_all(b"\n")?;
        streams.payload.flush()?;
        Ok(())
    }
}

const LABEL_WIDTH: usize = 11;

/// Render the diagnostics block of a record.
///
/// Decode errors come first, then (unless `raw`) headers, key, partition,
/// offset and timestamp. Header values are written as the bytes received.
pub fn render_diagnostics(record: &DecodedRecord, raw: bool) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();

    for error in &record.decode_errors {
        writeln!(out, "{error}")?;
    }

    if raw {
        return Ok(out);
    }

    if !record.headers.is_empty() {
        out.write_all(b"Headers:\n")?;
        let key_width = record
            .headers
            .iter()
            .map(|h| h.key.chars().count())
            .max()
            .unwrap_or(0);
        for header in &record.headers {
            write!(out, "  Key: {:<key_width$}  Value: ", header.key)?;
            out.write_all(&header.value)?;
            out.write_all(b"\n")?;
        }
    }

    if let Some(key) = &record.key {
        writeln!(out, "{:<LABEL_WIDTH$}{key}", "Key:")?;
    }

    let timestamp = record
        .timestamp
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| "unknown".to_string());
    writeln!(out, "{:<LABEL_WIDTH$}{}", "Partition:", record.partition)?;
    writeln!(out, "{:<LABEL_WIDTH$}{}", "Offset:", record.offset)?;
    writeln!(out, "{:<LABEL_WIDTH$}{timestamp}", "Timestamp:")?;

    Ok(out)
}
