//! Timestamp wire format.
//!
//! Timestamps go over the wire as ISO-8601 UTC strings with millisecond
//! precision and a `Z` suffix (`2024-05-01T12:00:00.000Z`).

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a timestamp in the wire format.
pub fn to_iso_millis(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for `DateTime<Utc>` fields using [`to_iso_millis`].
///
/// Use with `#[serde(with = "crate::time::iso_millis")]`.
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a timestamp as a millisecond-precision ISO string.
    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_iso_millis(at))
    }

    /// Deserialize an RFC 3339 string into a UTC timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn formats_with_millis_and_z() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap();
        assert_eq!(to_iso_millis(&at), "2024-05-01T12:00:00.000Z");
    }
}
