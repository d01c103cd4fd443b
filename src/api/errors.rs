//! # API Errors
//!
//! Every failure renders as `{"success": false, "error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::pipeline::QueryError;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request parameter that cannot be decoded
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParam { name: String, reason: String },

    /// Body that is not a JSON object
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // ==================
    // Pipeline
    // ==================
    #[error("{0}")]
    Query(#[from] QueryError),
}

impl ApiError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ApiError::InvalidParam {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParam { .. } | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Query(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", self);
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
