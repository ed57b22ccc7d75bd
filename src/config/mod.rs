//! CLI value parsers.

pub mod duration;

pub use duration::{parse_duration, parse_kafka_property};
