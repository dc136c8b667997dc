//! Sensor readings.
//!
//! A [`SensorReading`] is one timestamped set of metric values reported
//! by one device. Readings are immutable once the history store has
//! assigned their identifier.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::ids::ReadingId;

/// The metrics a device may report.
///
/// Declaration order is the validation order and the order metrics
/// appear in serialized readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    /// Ambient temperature.
    Temperature,
    /// Relative humidity.
    Humidity,
    /// Sound level.
    SoundLevel,
    /// Barometric pressure.
    Pressure,
    /// Battery charge.
    Battery,
}

impl Metric {
    /// Every recognized metric, in validation order.
    pub const ALL: [Self; 5] = [
        Self::Temperature,
        Self::Humidity,
        Self::SoundLevel,
        Self::Pressure,
        Self::Battery,
    ];

    /// The JSON field name of this metric.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::SoundLevel => "soundLevel",
            Self::Pressure => "pressure",
            Self::Battery => "battery",
        }
    }

    /// Legacy field name still accepted on ingestion, if any.
    pub const fn alias(self) -> Option<&'static str> {
        match self {
            Self::SoundLevel => Some("sound"),
            _ => None,
        }
    }
}

impl core::fmt::Display for Metric {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored sensor reading.
///
/// Serializes flat: metric values appear as top-level fields next to
/// the identifier and timestamps, and absent metrics are omitted.
/// Integral values are written without a fraction (`87`, not `87.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Sequential identifier assigned at ingestion.
    pub id: ReadingId,
    /// Reporting device, trimmed and non-empty.
    pub device_id: String,
    /// Reported metric values. Always non-empty and finite.
    #[serde(flatten, serialize_with = "serialize_metrics")]
    pub metrics: BTreeMap<Metric, f64>,
    /// When the device says the values were measured.
    #[serde(rename = "timestamp", with = "crate::time::iso_millis")]
    pub measured_at: DateTime<Utc>,
    /// When the server accepted the reading.
    #[serde(with = "crate::time::iso_millis")]
    pub received_at: DateTime<Utc>,
}

impl SensorReading {
    /// Whether this reading passes an optional device filter.
    ///
    /// `None` matches every device.
    pub fn matches_device(&self, device_id: Option<&str>) -> bool {
        device_id.is_none_or(|wanted| wanted == self.device_id)
    }
}

/// Largest magnitude at which every integer is exactly representable (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn serialize_metrics<S: Serializer>(metrics: &BTreeMap<Metric, f64>, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(metrics.len()))?;
    for (metric, value) in metrics {
        match exact_integer(*value) {
            Some(integer) => map.serialize_entry(metric, &integer)?,
            None => map.serialize_entry(metric, value)?,
        }
    }
    map.end()
}

// Integral and within 2^53, so the cast is exact.
#[allow(clippy::cast_possible_truncation)]
fn exact_integer(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER).then_some(value as i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> SensorReading {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap();
        SensorReading {
            id: ReadingId(1),
            device_id: String::from("d1"),
            metrics: BTreeMap::from([(Metric::Humidity, 51.2), (Metric::Temperature, 24.6)]),
            measured_at: at,
            received_at: at,
        }
    }

    #[test]
    fn serializes_flat_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "deviceId": "d1",
                "temperature": 24.6,
                "humidity": 51.2,
                "timestamp": "2024-05-01T12:00:00.000Z",
                "receivedAt": "2024-05-01T12:00:00.000Z",
            })
        );
    }

    #[test]
    fn field_order_follows_metric_order() {
        let text = serde_json::to_string(&sample()).unwrap();
        let temperature = text.find("temperature").unwrap();
        let humidity = text.find("humidity").unwrap();
        let timestamp = text.find("timestamp").unwrap();
        assert!(text.starts_with(r#"{"id":1,"deviceId":"d1""#));
        assert!(temperature < humidity);
        assert!(humidity < timestamp);
    }

    #[test]
    fn deserializes_what_it_serializes() {
        let text = serde_json::to_string(&sample()).unwrap();
        let back: SensorReading = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn integral_values_have_no_fraction() {
        let mut reading = sample();
        reading.metrics = BTreeMap::from([(Metric::Pressure, 1013.25), (Metric::Battery, 87.0)]);
        let text = serde_json::to_string(&reading).unwrap();
        assert!(text.contains(r#""pressure":1013.25"#));
        assert!(text.contains(r#""battery":87,"#));

        let back: SensorReading = serde_json::from_str(&text).unwrap();
        assert_eq!(back.metrics, reading.metrics);
    }

    #[test]
    fn device_filter() {
        let reading = sample();
        assert!(reading.matches_device(None));
        assert!(reading.matches_device(Some("d1")));
        assert!(!reading.matches_device(Some("d2")));
    }

    #[test]
    fn metric_names() {
        let names: Vec<&str> = Metric::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, ["temperature", "humidity", "soundLevel", "pressure", "battery"]);
        assert_eq!(Metric::SoundLevel.alias(), Some("sound"));
        assert_eq!(Metric::Battery.alias(), None);
    }
}
