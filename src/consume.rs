//! `consume` command handler.
//!
//! Source crate: crates/kafka-source/
//! CLI command:
//! - `consume <TOPIC> --brokers ... [--offset oldest|newest] [-f] [--raw] [--color auto|always|never]`

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Context;
use kafka_tail_schema_registry::{RegistryConfig, SchemaRegistryDecoder};
use kafka_tail_source::{
    run_consume, ConsumeRequest, DecodePipeline, KafkaBroker, KafkaConfig, OffsetResolver,
    PayloadDecoder, ProbePolicy, RecordSink, SynchronizedSink,
};

use crate::{ConsumeArgs, SchemaRegistryOpts};

/// Run the consumer until every partition stream ends or Ctrl+C is received.
pub async fn run(args: ConsumeArgs) -> anyhow::Result<()> {
    let offset_mode = args.offset_mode();
    tracing::info!(
        "Consuming topic {} from {} ({offset_mode})",
        args.topic,
        args.brokers.join(",")
    );

    let broker = KafkaBroker::new(kafka_config(&args)).context("Failed to create Kafka client")?;
    let decoder = payload_decoder(&args.schema_registry)?;
    let pipeline = DecodePipeline::new(decoder, args.raw)
        .with_color(args.use_color(std::io::stdout().is_terminal()));
    let sink: Arc<dyn RecordSink> = Arc::new(SynchronizedSink::stdio(args.raw));
    let resolver = OffsetResolver::new(ProbePolicy {
        timeout: args.offset_probe_timeout,
        backoff: args.offset_probe_backoff,
    });
    let request =
        ConsumeRequest::new(args.topic.as_str(), offset_mode).with_partitions(args.partitions);

    tokio::select! {
        result = run_consume(&broker, &request, &resolver, pipeline, sink) => {
            let summaries = result
                .with_context(|| format!("Failed to consume topic {}", request.topic))?;
            for summary in summaries {
                tracing::info!(
                    "Partition {} finished: {} records, {} receive errors",
                    summary.partition,
                    summary.records,
                    summary.receive_errors
                );
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            tracing::info!("Received interrupt signal (Ctrl+C)");
        }
    }

    Ok(())
}

fn kafka_config(args: &ConsumeArgs) -> KafkaConfig {
    KafkaConfig {
        brokers: args.brokers.join(","),
        properties: args.kafka_config.clone(),
        ..KafkaConfig::default()
    }
}

/// Schema registry decoding when a URL is configured, pass-through otherwise.
fn payload_decoder(opts: &SchemaRegistryOpts) -> anyhow::Result<PayloadDecoder> {
    let Some(url) = &opts.schema_registry_url else {
        return Ok(PayloadDecoder::PassThrough);
    };

    tracing::info!("Decoding payloads with schema registry at {url}");
    let mut config = RegistryConfig::new(url.as_str());
    config.username = opts.schema_registry_username.clone();
    config.password = opts.schema_registry_password.clone();

    let decoder =
        SchemaRegistryDecoder::new(config).context("Failed to create schema registry client")?;
    Ok(PayloadDecoder::schema(decoder))
}
