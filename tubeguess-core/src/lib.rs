//! TUBEGUESS Core - Station guessing game engine
//!
//! This crate provides the core game logic for TUBEGUESS:
//! - Geographic coordinates and great-circle distance
//! - Station records loaded from GeoJSON
//! - Distance scoring, styling tiers and end-of-game messages
//! - Map widget capability trait with a headless recorder
//! - Round controller state machine

pub mod config;
pub mod display;
pub mod error;
pub mod game;
pub mod geo;
pub mod map;
pub mod scoring;
pub mod session;
pub mod station;

// Re-exports for convenient access
pub use config::GameConfig;
pub use display::{ActionButton, DisplayState, GameOverPanel, ResultPanel};
pub use error::{GameError, StationError};
pub use game::{Input, Outcome, RoundController, RoundResult};
pub use geo::{haversine_distance, LatLng, LatLngBounds};
pub use map::{HeadlessMap, Layer, LayerId, LineStyle, MapSurface, MarkerKind, TileLayer, Viewport};
pub use scoring::{calculate_score, format_distance, format_score, DistanceClass, ScoreTier};
pub use session::{RoundPhase, SessionState};
pub use station::{Station, StationPool};
