use std::time::Duration;

use clima_core::thresholds::ThresholdConfig;
use clima_events::{FeedConfig, StreamConfig};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Static envelope for the always-on threshold check.
    pub thresholds: ThresholdConfig,
    /// Bounded wait of a stream read, in milliseconds (default: `1000`).
    pub stream_block_ms: u64,
    /// Re-check interval inside that wait, in milliseconds (default: `100`).
    pub stream_poll_ms: u64,
    /// Delivery-loop back-off after a failed read, in seconds (default: `5`).
    pub feed_retry_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `TEMP_MIN_THRESHOLD`     | `-50`                   |
    /// | `TEMP_MAX_THRESHOLD`     | `60`                    |
    /// | `HUMIDITY_MIN_THRESHOLD` | `0`                     |
    /// | `HUMIDITY_MAX_THRESHOLD` | `100`                   |
    /// | `STREAM_BLOCK_MS`        | `1000`                  |
    /// | `STREAM_POLL_MS`         | `100`                   |
    /// | `FEED_RETRY_SECS`        | `5`                     |
    ///
    /// Panics on unparsable values or an inverted threshold envelope, so
    /// misconfiguration fails at startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable
    /// source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = parse_or(&lookup, "PORT", 3000);

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30);

        let defaults = ThresholdConfig::default();
        let thresholds = ThresholdConfig {
            temp_min: parse_or(&lookup, "TEMP_MIN_THRESHOLD", defaults.temp_min),
            temp_max: parse_or(&lookup, "TEMP_MAX_THRESHOLD", defaults.temp_max),
            humidity_min: parse_or(&lookup, "HUMIDITY_MIN_THRESHOLD", defaults.humidity_min),
            humidity_max: parse_or(&lookup, "HUMIDITY_MAX_THRESHOLD", defaults.humidity_max),
        };
        if let Err(e) = thresholds.validate() {
            panic!("Invalid threshold configuration: {e}");
        }

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            thresholds,
            stream_block_ms: parse_or(&lookup, "STREAM_BLOCK_MS", 1000),
            stream_poll_ms: parse_or(&lookup, "STREAM_POLL_MS", 100),
            feed_retry_secs: parse_or(&lookup, "FEED_RETRY_SECS", 5),
        }
    }

    pub fn stream(&self) -> StreamConfig {
        StreamConfig {
            block_timeout: Duration::from_millis(self.stream_block_ms),
            poll_interval: Duration::from_millis(self.stream_poll_ms.max(1)),
        }
    }

    pub fn feed(&self) -> FeedConfig {
        FeedConfig {
            retry_delay: Duration::from_secs(self.feed_retry_secs),
            ..FeedConfig::default()
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is not valid ('{raw}'): {e}")),
        None => default,
    }
}
