//! Shared types for kafka-tail.
//!
//! This crate holds the data model that flows through the consumer core:
//!
//! ```text
//! OffsetMode ─► StartOffset (PartitionOffsetState)
//! broker fetch ─► FetchedRecord ─► decode ─► DecodedRecord ─► sink
//! ```
//!
//! # Modules
//!
//! - [`offset`] - Offset modes, start offsets and high watermark probes
//! - [`record`] - Fetched and decoded record types
//! - [`error`] - Error types for parsing offsets from user input

pub mod error;
pub mod offset;
pub mod record;

pub use error::{KafkaTypesError, Result};
pub use offset::{HighWatermark, OffsetMode, PartitionOffsetState, StartOffset};
pub use record::{DecodedHeader, DecodedRecord, FetchedRecord, RecordHeader};
