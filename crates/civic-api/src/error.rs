//! API error taxonomy and response mapping
use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use civic_core::StatusParseError;
use civic_store::StoreError;
use serde_json::json;

/// Request-shape failures surfaced directly to the caller. Failures
/// internal to analysis (upstream, parse) never reach this type; they
/// are absorbed into a degraded complaint instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad upload or query parameter → 400
    Validation(String),
    /// Status outside the recognized set → 400
    InvalidStatus(String),
    /// Unknown complaint ID → 404
    NotFound(String),
    /// Insert collided with an existing ID → 409
    Duplicate(String),
    /// Missing vision credential → 503
    Config(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Duplicate(_) => StatusCode::CONFLICT,
            ApiError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::InvalidStatus(msg)
            | ApiError::NotFound(msg)
            | ApiError::Duplicate(msg)
            | ApiError::Config(msg) => msg,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(format!("complaint '{id}' not found")),
            StoreError::DuplicateId(id) => {
                ApiError::Duplicate(format!("complaint '{id}' already exists"))
            }
        }
    }
}

impl From<StatusParseError> for ApiError {
    fn from(err: StatusParseError) -> Self {
        ApiError::InvalidStatus(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = %status, error = self.message(), "request rejected");
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
