use axum::{
    Json,
    response::{IntoResponse, Response},
};
use hotel_core::CoreError;
use http::StatusCode;
use serde_json::json;
use tracing::warn;

use crate::map_core_error;

// Declare sub-modules within the application layer
pub mod authz;
pub mod commands;
pub mod credentials;
pub mod middleware;
pub mod query;

/// Errors a handler can answer with. Rendered as `{ "error": message }`.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => map_core_error(err),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if !matches!(self, ApiError::Core(_)) {
            warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
