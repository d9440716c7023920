//! # API Configuration
//!
//! Environment-based configuration for the REST service and the battery
//! audit task. Command-line flags are applied on top with
//! [`Config::with_overrides`].

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

/// Seconds between two battery audit passes
pub const DEFAULT_BATTERY_LOG_INTERVAL_SECS: u64 = 240;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// API server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// Path every REST route is mounted under, e.g. `/api/v1`
    pub api_prefix: String,

    /// Logging level used when `RUST_LOG` is unset
    pub log_level: String,

    /// Battery audit interval
    pub battery_log_interval: Duration,

    /// Send drones stuck loading on a low battery back to idle during audits
    pub battery_reset_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            api_prefix: "/api/v1".to_string(),
            log_level: "info".to_string(),
            battery_log_interval: Duration::from_secs(DEFAULT_BATTERY_LOG_INTERVAL_SECS),
            battery_reset_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a value that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a value that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let server_addr = match lookup("SERVER_ADDR") {
            Some(value) => parse("SERVER_ADDR", &value)?,
            None => defaults.server_addr,
        };

        let battery_log_interval = match lookup("BATTERY_LOG_INTERVAL_SECS") {
            Some(value) => interval("BATTERY_LOG_INTERVAL_SECS", &value)?,
            None => defaults.battery_log_interval,
        };

        let battery_reset_enabled = match lookup("BATTERY_RESET_ENABLED") {
            Some(value) => flag("BATTERY_RESET_ENABLED", &value)?,
            None => defaults.battery_reset_enabled,
        };

        Ok(Self {
            server_addr,
            api_prefix: normalize_prefix(
                &lookup("API_PREFIX").unwrap_or(defaults.api_prefix),
            ),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            battery_log_interval,
            battery_reset_enabled,
        })
    }

    /// Apply command-line overrides; `None` keeps the configured value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero log interval.
    pub fn with_overrides(
        mut self,
        host: Option<IpAddr>,
        port: Option<u16>,
        log_interval_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = host {
            self.server_addr.set_ip(host);
        }
        if let Some(port) = port {
            self.server_addr.set_port(port);
        }
        if let Some(secs) = log_interval_secs {
            self.battery_log_interval = interval("--log-interval", &secs.to_string())?;
        }
        Ok(self)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn interval(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match parse::<u64>(key, value)? {
        0 => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Leading slash, no trailing slash; the root prefix becomes empty
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.battery_log_interval, Duration::from_secs(240));
    }

    #[test]
    fn test_reads_every_key() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_ADDR", "127.0.0.1:9000"),
            ("API_PREFIX", "fleet/"),
            ("LOG_LEVEL", "debug"),
            ("BATTERY_LOG_INTERVAL_SECS", "30"),
            ("BATTERY_RESET_ENABLED", "false"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.api_prefix, "/fleet");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.battery_log_interval, Duration::from_secs(30));
        assert!(!config.battery_reset_enabled);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = Config::from_lookup(lookup(&[("SERVER_ADDR", "nowhere")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "SERVER_ADDR",
                value: "nowhere".into()
            }
        );
        assert!(Config::from_lookup(lookup(&[("BATTERY_LOG_INTERVAL_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("BATTERY_RESET_ENABLED", "maybe")])).is_err());
    }

    #[test]
    fn test_root_prefix_is_empty() {
        let config = Config::from_lookup(lookup(&[("API_PREFIX", "/")])).unwrap();
        assert_eq!(config.api_prefix, "");
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(Some("127.0.0.1".parse().unwrap()), Some(3000), Some(5))
            .unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.battery_log_interval, Duration::from_secs(5));

        let untouched = Config::default().with_overrides(None, None, None).unwrap();
        assert_eq!(untouched, Config::default());
        assert!(Config::default().with_overrides(None, None, Some(0)).is_err());
    }
}
