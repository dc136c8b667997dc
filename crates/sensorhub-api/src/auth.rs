//! Shared device key guard.
//!
//! Ingestion is the only authenticated route. Devices prove themselves
//! by sending the configured secret in the `x-device-key` header; there
//! are no per-device credentials.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the device credential.
pub const DEVICE_KEY_HEADER: &str = "x-device-key";

/// Middleware rejecting requests whose device key does not match.
pub async fn require_device_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let supplied = request
        .headers()
        .get(DEVICE_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if supplied != Some(state.device_key.as_str()) {
        tracing::warn!(
            path = %request.uri().path(),
            key_present = supplied.is_some(),
            "rejected ingestion with invalid device key"
        );
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}
