//! Gateway configuration types.
//!
//! This module defines configuration structures for the HTTP gateway and
//! loads them from the environment:
//!
//! | Variable                  | Field                     | Default        |
//! |---------------------------|---------------------------|----------------|
//! | `LISTEN_ADDR`             | `listen_addr`             | `0.0.0.0:8080` |
//! | `CORS_ORIGINS`            | `cors_origins` (commas)   | `*`            |
//! | `MAX_BODY_BYTES`          | `max_body_bytes`          | `65536`        |
//! | `REQUEST_TIMEOUT_SECONDS` | `request_timeout_seconds` | `30`           |

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// A configuration value that could not be parsed.
#[derive(Debug, Error)]
#[error("invalid {name}: {message}")]
pub struct ConfigError {
    /// Variable name.
    pub name: String,
    /// Parse failure.
    pub message: String,
}

/// Configuration for the gateway service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    pub listen_addr: String,

    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    const fn default_max_body() -> usize {
        64 * 1024 // 64 KiB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Load the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let cors_origins = lookup("CORS_ORIGINS").map_or_else(
            || vec!["*".to_string()],
            |raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            },
        );

        Ok(Self {
            listen_addr: lookup("LISTEN_ADDR").unwrap_or_else(Self::default_listen_addr),
            cors_origins,
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", Self::default_max_body())?,
            request_timeout_seconds: parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECONDS",
                Self::default_request_timeout(),
            )?,
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Read and parse an environment variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns an error if the variable is set but does not parse.
pub fn env_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_or(&|name: &str| std::env::var(name).ok(), name, default)
}

fn parse_or<L, T>(lookup: &L, name: &str, default: T) -> Result<T, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            name: name.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.max_body_bytes, 64 * 1024);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.max_body_bytes, 64 * 1024);
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn reads_every_variable() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("MAX_BODY_BYTES", "1024"),
            ("REQUEST_TIMEOUT_SECONDS", " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let err = GatewayConfig::from_lookup(lookup(&[("MAX_BODY_BYTES", "lots")])).unwrap_err();
        assert_eq!(err.name, "MAX_BODY_BYTES");
    }
}
