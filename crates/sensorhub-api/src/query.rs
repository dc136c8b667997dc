//! Lenient query string extractor.
//!
//! Clients repeat keys (`?limit=1&limit=2`) and axum's typed `Query`
//! rejects that with a plain-text 400. [`QueryParams`] keeps every pair
//! and lets each endpoint decide: a repeated filter or limit is ignored,
//! a repeated `completed` flag is a validation error.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use sensorhub_core::{clamp_history_limit, normalize_device_id};
use sensorhub_todos::{TodoError, parse_completed_filter};

use crate::error::ApiError;

/// Message returned when the query string cannot be decoded at all.
pub const MALFORMED_QUERY: &str = "Gecersiz sorgu parametresi";

/// How often a key appears in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param<'a> {
    /// The key is absent.
    Missing,
    /// The key appears exactly once.
    Single(&'a str),
    /// The key appears more than once.
    Repeated,
}

/// Every `key=value` pair of the request's query string, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(pub Vec<(String, String)>);

impl QueryParams {
    /// Look up one key.
    pub fn param(&self, key: &str) -> Param<'_> {
        let mut values = self.0.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str());
        match (values.next(), values.next()) {
            (None, _) => Param::Missing,
            (Some(value), None) => Param::Single(value),
            (Some(_), Some(_)) => Param::Repeated,
        }
    }

    /// The `deviceId` filter. Blank or repeated means no filter.
    pub fn device_filter(&self) -> Option<String> {
        match self.param("deviceId") {
            Param::Single(raw) => normalize_device_id(Some(raw)),
            Param::Missing | Param::Repeated => None,
        }
    }

    /// The history `limit`. A repeated key counts as non-numeric.
    pub fn history_limit(&self) -> usize {
        match self.param("limit") {
            Param::Single(raw) => clamp_history_limit(Some(raw)),
            Param::Missing | Param::Repeated => clamp_history_limit(None),
        }
    }

    /// The to-do list `completed` filter.
    pub fn completed_filter(&self) -> Result<Option<bool>, TodoError> {
        match self.param("completed") {
            Param::Missing => Ok(None),
            Param::Single(raw) => parse_completed_filter(Some(raw)),
            Param::Repeated => Err(TodoError::InvalidCompletedFilter),
        }
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| Self(pairs))
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected malformed query string");
                ApiError::Validation(String::from(MALFORMED_QUERY))
            })
    }
}
