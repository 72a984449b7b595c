//! Intermic CLI - inter-microphone level and delay estimation.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "intermic")]
#[command(author, version, about = "Inter-microphone difference features and estimation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute difference tensors and inspect one time slice
    Features(commands::features::FeaturesArgs),

    /// Estimate phase slope and level difference from spectra files
    Estimate(commands::estimate::EstimateArgs),

    /// Estimate from a multichannel WAV recording
    Stft(commands::stft::StftArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Features(args) => commands::features::run(args),
        Commands::Estimate(args) => commands::estimate::run(args),
        Commands::Stft(args) => commands::stft::run(args),
    }
}
