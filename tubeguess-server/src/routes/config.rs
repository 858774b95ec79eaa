//! Game configuration endpoint
//!
//! Gives the browser the default view and tile layers so it can build its
//! map widget before the first session exists.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use tubeguess_core::{LatLng, TileLayer};

use crate::state::ServerState;

#[derive(Serialize)]
pub struct TileLayerInfo {
    pub id: TileLayer,
    pub url: &'static str,
    pub attribution: &'static str,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub rounds: u32,
    pub max_score: u32,
    pub default_center: LatLng,
    pub default_zoom: u8,
    pub fit_padding: u32,
    pub tile_layers: Vec<TileLayerInfo>,
}

pub async fn get_config(State(state): State<Arc<ServerState>>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        rounds: config.rounds_per_session,
        max_score: config.max_score(),
        default_center: config.default_center,
        default_zoom: config.default_zoom,
        fit_padding: config.fit_padding,
        tile_layers: TileLayer::ALL
            .iter()
            .map(|&layer| TileLayerInfo {
                id: layer,
                url: layer.url_template(),
                attribution: layer.attribution(),
            })
            .collect(),
    })
}
