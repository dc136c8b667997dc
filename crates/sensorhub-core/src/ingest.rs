//! Validation of raw ingestion payloads.
//!
//! Devices post loosely-typed JSON. [`ReadingDraft::from_json`] turns
//! that into a fully validated draft or rejects it whole; nothing from a
//! rejected payload is ever stored.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. `deviceId` must be a string that is non-empty after trimming.
//! 2. Each recognized metric that is present must be numeric. Metrics
//!    are checked in [`Metric::ALL`] order.
//! 3. At least one recognized metric must be present.
//! 4. `timestamp`, if present, must parse.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sensorhub_types::Metric;
use serde_json::{Map, Value};

/// Reasons an ingestion payload is rejected.
///
/// The `Display` text is the message returned to the device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// `deviceId` is missing, not a string, or blank.
    #[error("deviceId zorunludur")]
    MissingDeviceId,

    /// A recognized metric was supplied with a non-numeric value.
    #[error("{0} numeric olmalidir")]
    NonNumeric(Metric),

    /// None of the recognized metrics were supplied.
    #[error("En az bir sensor alani gonderilmelidir")]
    NoMetrics,

    /// `timestamp` was supplied but could not be parsed.
    #[error("timestamp gecersiz")]
    InvalidTimestamp,
}

impl IngestError {
    /// Name of the payload field the error refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingDeviceId => "deviceId",
            Self::NonNumeric(metric) => metric.as_str(),
            Self::NoMetrics => "metrics",
            Self::InvalidTimestamp => "timestamp",
        }
    }
}

/// A validated reading that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingDraft {
    /// Trimmed, non-empty device identifier.
    pub device_id: String,
    /// At least one finite metric value.
    pub metrics: BTreeMap<Metric, f64>,
    /// Device-supplied measurement time; `None` means "use receipt time".
    pub measured_at: Option<DateTime<Utc>>,
}

impl ReadingDraft {
    /// Validate a raw JSON payload.
    ///
    /// A payload that is not a JSON object is treated as an empty one.
    pub fn from_json(body: &Value) -> Result<Self, IngestError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        let device_id = normalize_device_id(fields.get("deviceId").and_then(Value::as_str))
            .ok_or(IngestError::MissingDeviceId)?;

        let mut metrics = BTreeMap::new();
        for metric in Metric::ALL {
            let Some(raw) = metric_value(fields, metric) else {
                continue;
            };
            let value = coerce_number(raw).ok_or(IngestError::NonNumeric(metric))?;
            metrics.insert(metric, value);
        }
        if metrics.is_empty() {
            return Err(IngestError::NoMetrics);
        }

        let measured_at = fields
            .get("timestamp")
            .map(|raw| parse_timestamp(raw).ok_or(IngestError::InvalidTimestamp))
            .transpose()?;

        Ok(Self {
            device_id,
            metrics,
            measured_at,
        })
    }
}

/// Trim a device identifier, treating blank as absent.
///
/// Used for the ingestion body and for every `deviceId` query filter.
pub fn normalize_device_id(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
}

/// Look up a metric by its field name, falling back to its legacy alias
/// when the primary field is absent or null.
fn metric_value(fields: &Map<String, Value>, metric: Metric) -> Option<&Value> {
    let primary = fields.get(metric.as_str());
    match (primary, metric.alias()) {
        (None | Some(Value::Null), Some(alias)) if fields.contains_key(alias) => fields.get(alias),
        _ => primary,
    }
}

/// Accept finite JSON numbers and strings holding a finite decimal number.
fn coerce_number(raw: &Value) -> Option<f64> {
    let number = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Parse a device-supplied measurement time.
///
/// Accepts RFC 3339 with any offset, a naive date-time or bare date
/// (both read as UTC), or an integer count of epoch milliseconds.
fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
