//! HTTP-facing errors. Fetch failures never reach this layer; they degrade
//! the result instead.

use shuttle_axum::axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Blank path parameter. Body: `{"message": ...}`.
    #[error("{0}")]
    InvalidInput(String),
    /// Missing query parameter. Body: `{"error": ...}`.
    #[error("{0}")]
    MissingParameter(String),
    #[error("{0}")]
    NotFound(String),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::InvalidInput(msg) => ApiError::InvalidInput(msg.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidInput(m) => (StatusCode::BAD_REQUEST, json!({ "message": m })),
            ApiError::MissingParameter(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
        };
        (status, Json(body)).into_response()
    }
}
