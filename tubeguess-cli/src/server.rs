//! Serve command - host the browser game
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to tubeguess-server crate)
//! - Level 4: front end checks

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use tubeguess_core::GameConfig;
use tubeguess_server::{run_server, ServerConfig, SessionLimits};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Directory containing the browser front end
    #[arg(long, default_value = "web")]
    pub static_dir: PathBuf,

    /// GeoJSON file with station features
    #[arg(long, value_name = "FILE", default_value = "data/stations.geojson")]
    pub stations: PathBuf,

    /// Rounds per session
    #[arg(long, default_value = "10")]
    pub rounds: u32,

    /// Drop sessions idle for this many minutes
    #[arg(long, default_value = "30")]
    pub idle_minutes: u64,

    /// Most sessions held at once
    #[arg(long, default_value = "10000")]
    pub max_sessions: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run serve command
///
/// 1. Build the server config from flags
/// 2. Serve until interrupted
pub fn run(args: ServerArgs, seed: Option<u64>) -> Result<()> {
    let config = configure_server(&args, seed)?;

    tracing::info!(
        "Serving {} rounds per session, sessions expire after {} min",
        config.game.rounds_per_session,
        args.idle_minutes
    );

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn configure_server(args: &ServerArgs, seed: Option<u64>) -> Result<ServerConfig> {
    check_front_end(&args.static_dir)?;
    if args.idle_minutes == 0 {
        anyhow::bail!("--idle-minutes must be at least 1");
    }

    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.to_string_lossy().to_string(),
        stations_path: args.stations.clone(),
        game: GameConfig::default().with_rounds(args.rounds),
        seed,
        limits: SessionLimits {
            idle_timeout: Duration::from_secs(args.idle_minutes * 60),
            max_sessions: args.max_sessions.max(1),
        },
    })
}

fn start_server(config: ServerConfig) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(run_server(config))
}

// ============================================================================
// LEVEL 4 - FRONT END CHECKS
// ============================================================================

/// The API works without a front end, so only a file in place of the
/// directory is fatal
fn check_front_end(dir: &Path) -> Result<()> {
    if dir.is_file() {
        anyhow::bail!("--static-dir points at a file: {}", dir.display());
    }
    if !dir.join("index.html").is_file() {
        tracing::warn!("No index.html in {}; only the JSON API will be usable", dir.display());
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServerArgs {
        ServerArgs {
            port: 9000,
            static_dir: PathBuf::from("test_static"),
            stations: PathBuf::from("stations.geojson"),
            rounds: 5,
            idle_minutes: 15,
            max_sessions: 200,
        }
    }

    #[test]
    fn test_configure_server() {
        let config = configure_server(&args(), None).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.static_dir, "test_static");
        assert_eq!(config.stations_path, PathBuf::from("stations.geojson"));
        assert_eq!(config.game.rounds_per_session, 5);
        assert_eq!(config.seed, None);
        assert_eq!(config.limits.idle_timeout, Duration::from_secs(900));
        assert_eq!(config.limits.max_sessions, 200);
    }

    #[test]
    fn test_seed_reaches_server_config() {
        let config = configure_server(&args(), Some(7)).unwrap();
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_zero_idle_minutes_rejected() {
        let mut args = args();
        args.idle_minutes = 0;
        assert!(configure_server(&args, None).is_err());
    }

    #[test]
    fn test_missing_front_end_only_warns() {
        assert!(check_front_end(Path::new("/nonexistent/path")).is_ok());
    }

    #[test]
    fn test_front_end_path_is_file() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        assert!(check_front_end(&manifest).is_err());
    }

    #[test]
    fn test_bundled_front_end() {
        let web = Path::new(env!("CARGO_MANIFEST_DIR")).join("../web");
        assert!(web.join("index.html").is_file());
        assert!(check_front_end(&web).is_ok());
    }
}
