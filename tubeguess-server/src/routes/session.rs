//! Game session endpoints
//!
//! Each request feeds exactly one input to the session's round controller
//! and answers with a fresh snapshot.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use tubeguess_core::{Input, LatLng};

use crate::error::{ApiError, ApiResult};
use crate::state::{ServerState, SessionSnapshot};

/// Start a new session at round one
pub async fn create_session(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<(StatusCode, Json<SessionSnapshot>)> {
    let snapshot = state.create_session()?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Current state without applying any input
pub async fn get_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    let snapshot = state.with_session(&id, |game| Ok(SessionSnapshot::capture(&id, game, None)))?;
    Ok(Json(snapshot))
}

/// Map click payload
#[derive(Deserialize)]
pub struct ClickRequest {
    pub lat: f64,
    pub lng: f64,
}

pub async fn click(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    payload: Result<Json<ClickRequest>, JsonRejection>,
) -> ApiResult<Json<SessionSnapshot>> {
    let Json(req) = payload?;
    let at = LatLng::new(req.lat, req.lng);
    if !at.is_valid() {
        return Err(ApiError::Validation(format!(
            "coordinates out of range: {}, {}",
            req.lat, req.lng
        )));
    }
    apply(&state, &id, Input::MapClick { at })
}

pub async fn submit(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    apply(&state, &id, Input::Submit)
}

pub async fn next(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    apply(&state, &id, Input::Next)
}

pub async fn play_again(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    apply(&state, &id, Input::PlayAgain)
}

pub async fn delete_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.remove_session(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

fn apply(state: &ServerState, id: &str, input: Input) -> ApiResult<Json<SessionSnapshot>> {
    let snapshot = state.with_session(id, |game| {
        let outcome = game.handle(input)?;
        Ok(SessionSnapshot::capture(id, game, Some(outcome)))
    })?;
    Ok(Json(snapshot))
}
