//! Sensor REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `POST` | `/api/v1/sensors/ingest` | Store a reading (device key required) |
//! | `GET` | `/api/v1/sensors/latest` | Latest reading, optionally per device |
//! | `GET` | `/api/v1/sensors/history` | Recent readings, most recent first |
//! | `GET` | `/api/v1/sensors` | Alias of `history` |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sensorhub_core::ReadingDraft;
use sensorhub_types::time::to_iso_millis;

use crate::body::JsonBody;
use crate::error::{ApiError, ENDPOINT_NOT_FOUND};
use crate::query::QueryParams;
use crate::state::AppState;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "esp32-sensor-api";

/// Message returned when no reading matches a `latest` query.
pub const NO_READING: &str = "Sensor verisi bulunamadi";

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report that the service is up.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": to_iso_millis(&Utc::now()),
        "service": SERVICE_NAME,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/sensors/ingest
// ---------------------------------------------------------------------------

/// Validate and store one reading, then fan it out to stream subscribers.
///
/// Responds `201` with the stored reading. The device key has already
/// been checked by [`require_device_key`](crate::auth::require_device_key).
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let draft = ReadingDraft::from_json(&body).inspect_err(|e| {
        tracing::debug!(field = e.field(), reason = %e, "rejected sensor reading");
    })?;
    let reading = state.hub.ingest(draft).await;
    Ok((StatusCode::CREATED, Json(reading)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/sensors/latest
// ---------------------------------------------------------------------------

/// Return the most recent reading, or the most recent for `deviceId`.
pub async fn latest(
    State(state): State<Arc<AppState>>,
    params: QueryParams,
) -> Result<impl IntoResponse, ApiError> {
    let device_id = params.device_filter();
    state
        .hub
        .latest(device_id.as_deref())
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(String::from(NO_READING)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/sensors/history (and /api/v1/sensors)
// ---------------------------------------------------------------------------

/// Return up to `limit` recent readings, most recent first.
///
/// `limit` defaults to 100 and is clamped to `1..=500`; a repeated
/// `limit` or `deviceId` is ignored. An empty result is still `200`.
pub async fn history(
    State(state): State<Arc<AppState>>,
    params: QueryParams,
) -> impl IntoResponse {
    let device_id = params.device_filter();
    let limit = params.history_limit();
    Json(state.hub.recent(device_id.as_deref(), limit).await)
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

/// JSON 404 for anything no route or static file matched.
pub async fn not_found() -> ApiError {
    ApiError::NotFound(String::from(ENDPOINT_NOT_FOUND))
}
