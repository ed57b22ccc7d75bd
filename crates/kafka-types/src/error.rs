//! Error types for kafka-types crate.

use thiserror::Error;

/// Errors that can occur while interpreting offset input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum KafkaTypesError {
    #[error("Invalid offset mode: {0} (expected oldest, newest or follow)")]
    InvalidOffsetMode(String),
}

/// Result type alias for kafka-types operations.
pub type Result<T> = std::result::Result<T, KafkaTypesError>;
