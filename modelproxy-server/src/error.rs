//! HTTP-facing errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use modelproxy_core::AdapterError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors a route can answer with. Every variant renders as
/// `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing Authorization")]
    MissingAuthorization,

    #[error("Invalid Authorization")]
    InvalidAuthorization,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("stream not supported by adapter")]
    StreamingUnsupported,

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("Failed to store answer: {0}")]
    Persistence(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAuthorization | ApiError::InvalidAuthorization => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::InvalidBody(_) | ApiError::StreamingUnsupported => StatusCode::BAD_REQUEST,
            ApiError::Adapter(_) | ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The backend failed, not the proxy or the caller
    pub fn is_upstream(&self) -> bool {
        matches!(self, ApiError::Adapter(err) if err.is_upstream())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_upstream() {
            warn!("upstream failed: {}", self);
        } else if status.is_server_error() {
            error!("request failed: {}", self);
        } else {
            warn!("request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
