//! Configuration loading from environment variables.
//!
//! Everything is read once at startup into an immutable [`Config`] that is passed
//! explicitly to the sink and the emitter. `INFLUXDB_TOKEN` is the only required
//! variable; its absence is a fatal [`ConfigError`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_URL: &str = "http://localhost:8086";
pub const DEFAULT_ORG: &str = "my-org";
pub const DEFAULT_BUCKET: &str = "my-bucket";
pub const DEFAULT_INTERVAL_MS: u64 = 500;
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 10;

/// Error type for configuration loading
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("INFLUXDB_TOKEN not found in environment variables. Please check your .env file.")]
    MissingToken,

    #[error("Invalid URL in {var}: {value}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("Invalid value for {var}: {value} (expected a positive integer)")]
    InvalidNumber { var: &'static str, value: String },
}

/// Tag values stamped on every generated record
#[derive(Debug, Clone, PartialEq)]
pub struct TagConfig {
    pub host: String,
    pub interface: String,
    pub region: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            host: "server-01".to_string(),
            interface: "eth0".to_string(),
            region: "us-east".to_string(),
        }
    }
}

/// Immutable process configuration.
#[derive(Clone)]
pub struct Config {
    pub url: Url,
    pub token: String,
    pub org: String,
    pub bucket: String,
    pub interval: Duration,
    pub write_timeout: Duration,
    pub tags: TagConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url.as_str())
            .field("token", &"<redacted>")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("interval", &self.interval)
            .field("write_timeout", &self.write_timeout)
            .field("tags", &self.tags)
            .finish()
    }
}

impl Config {
    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unset and empty variables fall back to their defaults, except the token
    /// which must be present and non-blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("INFLUXDB_TOKEN").ok_or(ConfigError::MissingToken)?;

        let raw_url = get("INFLUXDB_URL").unwrap_or_else(|| DEFAULT_URL.to_string());
        let url = parse_url("INFLUXDB_URL", &raw_url)?;

        let interval_ms = parse_positive("EMIT_INTERVAL_MS", get("EMIT_INTERVAL_MS"), DEFAULT_INTERVAL_MS)?;
        let timeout_secs = parse_positive(
            "WRITE_TIMEOUT_SECS",
            get("WRITE_TIMEOUT_SECS"),
            DEFAULT_WRITE_TIMEOUT_SECS,
        )?;

        let defaults = TagConfig::default();

        Ok(Self {
            url,
            token,
            org: get("INFLUXDB_ORG").unwrap_or_else(|| DEFAULT_ORG.to_string()),
            bucket: get("INFLUXDB_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            interval: Duration::from_millis(interval_ms),
            write_timeout: Duration::from_secs(timeout_secs),
            tags: TagConfig {
                host: get("METRICS_HOST").unwrap_or(defaults.host),
                interface: get("METRICS_INTERFACE").unwrap_or(defaults.interface),
                region: get("METRICS_REGION").unwrap_or(defaults.region),
            },
        })
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
    };

    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

fn parse_positive(var: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = value else {
        return Ok(default);
    };

    match u64::from_str(raw.trim()) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value: raw }),
    }
}
