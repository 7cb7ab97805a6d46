//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bullyguard_ml::{ComparisonError, ErrorClass};
use serde_json::json;

/// Errors returned by gateway handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    /// The body could not be parsed into the expected request shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// A spawned handler task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Comparison(e) => e.class(),
            Self::InvalidBody(_) => ErrorClass::Validation,
            Self::Internal(_) => ErrorClass::Failure,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Comparison(e) => e.kind(),
            Self::InvalidBody(_) => "invalid_request",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.class())
    }
}

/// Client-caused conditions are 400, everything else is 500.
pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::Validation => StatusCode::BAD_REQUEST,
        ErrorClass::Failure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(kind = self.kind(), error = %self, "Request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "Request rejected");
        }
        let body = json!({
            "detail": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(body)).into_response()
    }
}
