//! Lenient JSON body extractor.
//!
//! Devices and the dashboard do not always send a `Content-Type`, and
//! some send no body at all. [`JsonBody`] reads the raw bytes and parses
//! them as JSON whatever the headers say; an empty body is `{}`. Bodies
//! over the router's size limit are answered with a JSON 413.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde_json::Value;

use crate::error::ApiError;

/// Message returned when the body is not valid JSON.
pub const MALFORMED_BODY: &str = "Gecersiz JSON govdesi";

/// A request body parsed as untyped JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return ApiError::PayloadTooLarge;
            }
            tracing::debug!(error = %rejection, "failed to read request body");
            ApiError::Validation(String::from(MALFORMED_BODY))
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Value::Object(serde_json::Map::new())));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected malformed JSON body");
                ApiError::Validation(String::from(MALFORMED_BODY))
            })
    }
}
