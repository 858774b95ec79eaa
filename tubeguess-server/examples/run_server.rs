//! Example to run the TUBEGUESS server standalone
//!
//! Run with: cargo run -p tubeguess-server --example run_server

use tubeguess_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig::default();

    println!("Starting TUBEGUESS server on port {}", config.port);
    println!("Stations from: {}", config.stations_path.display());
    println!("Open http://localhost:{}/", config.port);

    run_server(config).await
}
