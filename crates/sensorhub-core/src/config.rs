//! Service configuration.
//!
//! All configuration comes from environment variables. Every variable is
//! optional; unset or empty values fall back to the documented default,
//! while a value that is present but malformed aborts startup.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `DEVICE_API_KEY` | `esp32-demo-key` |
//! | `MAX_SENSOR_READINGS` | `1000` |
//! | `STREAM_KEEPALIVE_SECS` | `25` |
//! | `PUBLIC_DIR` | `public` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default shared device credential.
pub const DEFAULT_DEVICE_API_KEY: &str = "esp32-demo-key";

/// Default history cap.
pub const DEFAULT_MAX_SENSOR_READINGS: usize = 1000;

/// Default interval between stream keep-alive comments.
pub const DEFAULT_STREAM_KEEPALIVE_SECS: u64 = 25;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be used.
    #[error("invalid {name}={value:?}: {reason}")]
    Invalid {
        /// The environment variable name.
        name: &'static str,
        /// The offending raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Complete service configuration.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Address to bind to.
    pub host: String,
    /// TCP port to listen on. `0` picks an ephemeral port.
    pub port: u16,
    /// Shared secret devices send in `x-device-key`.
    pub device_api_key: String,
    /// Maximum number of readings kept in history. Always at least 1.
    pub max_sensor_readings: usize,
    /// Interval between keep-alive comments on open streams.
    pub stream_keepalive: Duration,
    /// Directory served for requests that match no API route.
    pub public_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: DEFAULT_PORT,
            device_api_key: String::from(DEFAULT_DEVICE_API_KEY),
            max_sensor_readings: DEFAULT_MAX_SENSOR_READINGS,
            stream_keepalive: Duration::from_secs(DEFAULT_STREAM_KEEPALIVE_SECS),
            public_dir: PathBuf::from("public"),
        }
    }
}

// The device key stays out of logs and panic messages.
impl core::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("device_api_key", &"<redacted>")
            .field("max_sensor_readings", &self.max_sensor_readings)
            .field("stream_keepalive", &self.stream_keepalive)
            .field("public_dir", &self.public_dir)
            .finish()
    }
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` is this with `std::env::var`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = parse_or("PORT", var("PORT"), defaults.port)?;

        let max_sensor_readings =
            parse_or("MAX_SENSOR_READINGS", var("MAX_SENSOR_READINGS"), defaults.max_sensor_readings)?;
        if max_sensor_readings == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_SENSOR_READINGS",
                value: String::from("0"),
                reason: String::from("must be at least 1"),
            });
        }

        let keepalive_secs = parse_or(
            "STREAM_KEEPALIVE_SECS",
            var("STREAM_KEEPALIVE_SECS"),
            DEFAULT_STREAM_KEEPALIVE_SECS,
        )?;
        if keepalive_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "STREAM_KEEPALIVE_SECS",
                value: String::from("0"),
                reason: String::from("must be at least 1"),
            });
        }

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            device_api_key: var("DEVICE_API_KEY").unwrap_or(defaults.device_api_key),
            max_sensor_readings,
            stream_keepalive: Duration::from_secs(keepalive_secs),
            public_dir: var("PUBLIC_DIR").map_or(defaults.public_dir, PathBuf::from),
        })
    }
}

/// Parse an optional raw value, falling back to `default` when unset.
fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value: raw,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServiceConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.device_api_key, "esp32-demo-key");
        assert_eq!(config.max_sensor_readings, 1000);
        assert_eq!(config.stream_keepalive, Duration::from_secs(25));
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("PORT", "8081"),
            ("DEVICE_API_KEY", "s3cret"),
            ("MAX_SENSOR_READINGS", " 5 "),
            ("STREAM_KEEPALIVE_SECS", "3"),
            ("PUBLIC_DIR", "/srv/www"),
        ])
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.device_api_key, "s3cret");
        assert_eq!(config.max_sensor_readings, 5);
        assert_eq!(config.stream_keepalive, Duration::from_secs(3));
        assert_eq!(config.public_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("PORT", ""), ("DEVICE_API_KEY", "  ")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.device_api_key, "esp32-demo-key");
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = load(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        assert!(load(&[("MAX_SENSOR_READINGS", "-3")]).is_err());
        assert!(load(&[("MAX_SENSOR_READINGS", "0")]).is_err());
        assert!(load(&[("STREAM_KEEPALIVE_SECS", "0")]).is_err());
    }

    #[test]
    fn debug_output_hides_the_device_key() {
        let config = load(&[("DEVICE_API_KEY", "s3cret")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }
}
