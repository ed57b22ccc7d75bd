//! Command-line interface for kafka-tail
//!
//! # Usage Examples
//!
//! ```bash
//! # Every partition from the beginning
//! kafka-tail consume events --brokers localhost:9092
//!
//! # Only new records, payload only
//! kafka-tail consume events --offset newest --raw
//!
//! # The latest record of each partition, then everything after it
//! kafka-tail consume events --follow
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change the level (default `info`).

use clap::{Parser, Subcommand};
use kafka_tail::ConsumeArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kafka-tail")]
#[command(about = "Consume every partition of a Kafka topic and print the records")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consume a topic, printing diagnostics to stderr and payloads to stdout
    Consume(ConsumeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for payloads
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Consume(args) => kafka_tail::consume::run(args).await?,
    }

    Ok(())
}
