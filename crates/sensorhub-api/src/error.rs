//! Error types for the HTTP layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! renders as `{ "message": ... }` with the matching status code via its
//! [`IntoResponse`] implementation.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sensorhub_core::IngestError;
use sensorhub_todos::TodoError;

/// Message returned for every internal failure.
pub const INTERNAL_MESSAGE: &str = "Beklenmeyen bir hata olustu";

/// Message returned for unmatched routes.
pub const ENDPOINT_NOT_FOUND: &str = "Endpoint bulunamadi";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or query failed validation (400).
    #[error("{0}")]
    Validation(String),

    /// The device key was missing or wrong (401).
    #[error("Gecersiz x-device-key")]
    Unauthorized,

    /// The requested resource does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The request body exceeded the size limit (413).
    #[error("Istek govdesi cok buyuk")]
    PayloadTooLarge,

    /// Something unexpected failed (500). The detail is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::NotFound => Self::NotFound(err.to_string()),
            TodoError::InvalidCompletedFilter
            | TodoError::MissingTitle
            | TodoError::InvalidTitle
            | TodoError::InvalidCompleted => Self::Validation(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                String::from(INTERNAL_MESSAGE)
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
