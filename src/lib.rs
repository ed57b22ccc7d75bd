//! kafka-tail library
//!
//! Consumes every partition of a Kafka topic concurrently and prints each
//! record to the terminal: diagnostics (headers, key, partition, offset,
//! timestamp) on stderr, the payload on stdout.
//!
//! # Crates
//!
//! - `kafka_types` - offsets and record types
//! - `kafka_tail_source` - offset resolution, partition workers, decoding, output
//! - `kafka_tail_schema_registry` - Confluent schema registry payload decoding
//!
//! # CLI Usage
//!
//! ```bash
//! # Everything in the topic, from the beginning of each partition
//! kafka-tail consume events --brokers localhost:9092
//!
//! # Start at the latest record of partitions 0 and 2 and keep following
//! kafka-tail consume events -f --partitions 0,2
//!
//! # Decode Avro payloads through a schema registry, payload only
//! kafka-tail consume events --raw --schema-registry-url http://localhost:8081
//! ```

use std::time::Duration;

use clap::{Parser, ValueEnum};
use kafka_types::OffsetMode;

pub mod config;
pub mod consume;

pub use config::{parse_duration, parse_kafka_property};

#[derive(Parser, Clone, Debug)]
pub struct ConsumeArgs {
    /// Topic to consume
    pub topic: String,

    /// Kafka brokers (comma-separated list)
    #[arg(
        long,
        env = "KAFKA_BROKERS",
        default_value = "localhost:9092",
        value_delimiter = ','
    )]
    pub brokers: Vec<String>,

    /// Where to start in each partition: oldest or newest
    #[arg(long, default_value = "oldest")]
    pub offset: OffsetMode,

    /// Start at the latest existing record of each partition (overrides --offset)
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// Print only the payload, without headers, key or metadata
    #[arg(long)]
    pub raw: bool,

    /// Color formatted JSON: auto colors only when stdout is a terminal
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Partitions to consume (comma-separated); all partitions when omitted
    #[arg(long, value_delimiter = ',')]
    pub partitions: Vec<i32>,

    /// Total time allowed to probe a partition's high watermark
    #[arg(long, default_value = "500ms", value_parser = parse_duration)]
    pub offset_probe_timeout: Duration,

    /// Pause between failed high watermark probes
    #[arg(long, default_value = "10ms", value_parser = parse_duration)]
    pub offset_probe_backoff: Duration,

    /// Extra librdkafka property, may be repeated
    #[arg(long = "kafka-config", value_name = "KEY=VALUE", value_parser = parse_kafka_property)]
    pub kafka_config: Vec<(String, String)>,

    /// Schema registry options
    #[command(flatten)]
    pub schema_registry: SchemaRegistryOpts,
}

impl ConsumeArgs {
    /// The effective offset mode, `--follow` taking precedence.
    pub fn offset_mode(&self) -> OffsetMode {
        if self.follow {
            OffsetMode::FollowLatest
        } else {
            self.offset
        }
    }

    /// Whether formatted JSON gets ANSI colors. Raw output is never colored.
    pub fn use_color(&self, stdout_is_terminal: bool) -> bool {
        if self.raw {
            return false;
        }
        match self.color {
            ColorMode::Auto => stdout_is_terminal,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Parser, Clone, Debug, Default)]
pub struct SchemaRegistryOpts {
    /// Schema registry URL; payloads are printed as-is when not set
    #[arg(long, env = "SCHEMA_REGISTRY_URL")]
    pub schema_registry_url: Option<String>,

    /// Schema registry username
    #[arg(long, env = "SCHEMA_REGISTRY_USERNAME")]
    pub schema_registry_username: Option<String>,

    /// Schema registry password
    #[arg(long, env = "SCHEMA_REGISTRY_PASSWORD")]
    pub schema_registry_password: Option<String>,
}
