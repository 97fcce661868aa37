//! Public API types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// Errors

pub struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(msg.to_string()),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!("Rejected request: {}", self.error);
        (self.status, self.error.to_string()).into_response()
    }
}
