//! TUBEGUESS Server - HTTP API for the browser game
//!
//! This crate provides the web backend:
//! - REST API driving one round controller per session
//! - Game configuration for the front end's map widget
//! - Static file serving for the front end

mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use tubeguess_core::{GameConfig, StationPool};

pub use error::{ApiError, ApiResult};
pub use state::{GameSession, ServerState, SessionEntry, SessionLimits, SessionSnapshot};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
    pub stations_path: PathBuf,
    pub game: GameConfig,
    /// Seed for the station order of successive sessions
    pub seed: Option<u64>,
    pub limits: SessionLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            static_dir: "web".to_string(),
            stations_path: PathBuf::from("data/stations.geojson"),
            game: GameConfig::default(),
            seed: None,
            limits: SessionLimits::default(),
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Map and session parameters
        .route("/api/config", get(routes::config::get_config))
        // Session API
        .route("/api/session", post(routes::session::create_session))
        .route(
            "/api/session/:id",
            get(routes::session::get_session).delete(routes::session::delete_session),
        )
        .route("/api/session/:id/click", post(routes::session::click))
        .route("/api/session/:id/submit", post(routes::session::submit))
        .route("/api/session/:id/next", post(routes::session::next))
        .route("/api/session/:id/play-again", post(routes::session::play_again))
        // Shared state
        .with_state(state)
        .layer(CorsLayer::permissive())
        // Static file serving (must be last)
        .fallback_service(static_service)
}

/// Load station data, logging instead of failing.
///
/// A server without stations still starts; session creation then answers
/// 503 until it is restarted with valid data.
pub fn load_stations(config: &ServerConfig) -> Option<StationPool> {
    match StationPool::load(&config.stations_path) {
        Ok(pool) if pool.is_empty() => {
            tracing::error!(
                "Station data at {} contains no valid stations",
                config.stations_path.display()
            );
            None
        }
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::error!("Error loading station data: {}", e);
            None
        }
    }
}

/// Shared state for a configured server
pub fn build_state(config: &ServerConfig, stations: Option<StationPool>) -> ServerState {
    let state = ServerState::new(config.game.clone(), stations).with_limits(config.limits);
    match config.seed {
        Some(seed) => {
            tracing::info!("Session station order seeded with {}", seed);
            state.with_seed(seed)
        }
        None => state,
    }
}

/// Periodically drop sessions whose browser went away
fn spawn_session_sweeper(state: Arc<ServerState>) {
    let period = state.limits.sweep_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            state.evict_idle_sessions();
        }
    });
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let stations = load_stations(&config);
    let state = Arc::new(build_state(&config, stations));
    let router = create_router(&config, state.clone());
    spawn_session_sweeper(state);

    tracing::info!("TUBEGUESS Server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("Static files served from: {}", config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
