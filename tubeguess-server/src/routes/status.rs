//! Status endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::ServerState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stations_loaded: bool,
    pub stations: usize,
    pub sessions: usize,
}

pub async fn status_handler(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        stations_loaded: state.stations.is_some(),
        stations: state.station_count(),
        sessions: state.session_count(),
    })
}
