mod cli;
mod config;
mod dataset;
mod embedding;
mod encoder;
mod error;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tweet-embed",
    version,
    about = "Batch embedding pipeline: tweet CSV to .npy vector matrix"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed a CSV of tweet records and write the vector matrix
    Encode {
        /// Path to the input CSV (columns: id, keyword, location, text)
        csv: PathBuf,

        /// Output path for the .npy matrix (default: data/encoded_vectors.npy)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Strings per model invocation (default: 100)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.tweet-embed/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::PipelineConfig::load()?;

    // Initialize tracing with the configured log level, writing to stderr so
    // stdout carries only the run summary.
    let filter = EnvFilter::try_new(&config.pipeline.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Encode {
            csv,
            output,
            batch_size,
        } => {
            cli::encode::run(&config, &csv, output, batch_size)?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
