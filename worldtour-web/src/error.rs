//! Error types for worldtour-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// worldtour-common error
    #[error("Common error: {0}")]
    Common(#[from] worldtour_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(err) => return common_error_response(err),
        };

        error_response(status, error_code, message)
    }
}

/// Map a db-layer error onto the HTTP surface.
///
/// Not-found and invalid-input keep their meaning; everything else is a 500.
fn common_error_response(err: worldtour_common::Error) -> Response {
    use worldtour_common::Error;

    let (status, error_code, message) = match err {
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
        Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            other.to_string(),
        ),
    };

    error_response(status, error_code, message)
}

fn error_response(status: StatusCode, error_code: &str, message: String) -> Response {
    let body = Json(json!({
        "error": {
            "code": error_code,
            "message": message,
        }
    }));

    (status, body).into_response()
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
