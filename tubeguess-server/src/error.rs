//! API error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use tubeguess_core::GameError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("station data not loaded")]
    StationsUnavailable,

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::StationsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Game(e) => {
                tracing::error!("Game error: {}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
