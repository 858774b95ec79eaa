//! TUBEGUESS CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the web game server
//! - play: Play a session in the terminal
//! - stations: Validate and list station data

mod play;
mod server;
mod stations;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tubeguess")]
#[command(about = "Guess where London stations are")]
struct Cli {
    /// Random seed for station order (random if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web game server
    Serve(server::ServerArgs),
    /// Play a session in the terminal
    Play(play::PlayArgs),
    /// Validate and list station data
    Stations(stations::StationsArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args, cli.seed),
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Stations(args) => stations::run(args),
    }
}
