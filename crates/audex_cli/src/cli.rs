//! CLI argument definitions using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "audex")]
#[command(about = "Audio indexing pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index a WAV file and write the run report
    Index {
        /// Path to input WAV file
        audio: PathBuf,

        /// Sidecar metadata JSON (default: input path with .json extension)
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Configuration file (default: audex.toml, created if missing)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report output path (default: <output_folder>/<stem>.index.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the pipeline steps in execution order
    Steps {
        /// Configuration file (default: audex.toml, created if missing)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Index {
            audio,
            metadata,
            config,
            output,
        } => crate::index::execute(audio, metadata, config, output),
        Commands::Steps { config } => crate::steps::execute(config),
    }
}
