//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | COMANDA_API_BASE_URL | (required) | Backend base URL |
//! | COMANDA_REQUEST_TIMEOUT_SECS | transport default | Per-request timeout |
//! | COMANDA_TABLES_POLL_SECS | 0 (manual refresh only) | Table grid background poll |
//! | COMANDA_DEFAULT_CUSTOMER | Consumidor | Customer label for blank names |

use crate::client::NetworkHttpClient;
use crate::error::ConfigError;
use std::time::Duration;

pub const BASE_URL_ENV: &str = "COMANDA_API_BASE_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "COMANDA_REQUEST_TIMEOUT_SECS";
pub const TABLES_POLL_ENV: &str = "COMANDA_TABLES_POLL_SECS";
pub const DEFAULT_CUSTOMER_ENV: &str = "COMANDA_DEFAULT_CUSTOMER";

/// Customer name used when the one typed in is blank
pub const DEFAULT_CUSTOMER: &str = "Consumidor";

/// Bounds for the table grid background poll
const MIN_POLL_SECS: u64 = 5;
const MAX_POLL_SECS: u64 = 300;

/// Client configuration for connecting to the backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "https://api.example.com/api:v1")
    pub base_url: String,

    /// Request timeout; `None` keeps the transport default
    pub request_timeout: Option<Duration>,

    /// Table grid poll interval; `None` means manual refresh only
    pub tables_poll_interval: Option<Duration>,

    /// Customer label for tabs opened with a blank name
    pub default_customer: String,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            request_timeout: None,
            tables_poll_interval: None,
            default_customer: DEFAULT_CUSTOMER.to_string(),
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    ///
    /// A missing or malformed base URL is fatal; the optional settings fall
    /// back to their defaults when unparsable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl(BASE_URL_ENV))?;

        let mut config = Self::new(base_url);
        config.validate()?;

        if let Some(secs) = parse_secs(&lookup, REQUEST_TIMEOUT_ENV)
            && secs > 0
        {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_secs(&lookup, TABLES_POLL_ENV) {
            config = config.with_poll_secs(secs);
        }
        if let Some(name) = lookup(DEFAULT_CUSTOMER_ENV) {
            config = config.with_default_customer(name);
        }

        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason,
        };
        let url = url::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme {}", other))),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the table grid poll interval in seconds; 0 disables polling
    pub fn with_poll_secs(mut self, secs: u64) -> Self {
        self.tables_poll_interval = match secs {
            0 => None,
            s => Some(Duration::from_secs(s.clamp(MIN_POLL_SECS, MAX_POLL_SECS))),
        };
        self
    }

    /// Set the default customer label; blank keeps the current one
    pub fn with_default_customer(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.default_customer = name.trim().to_string();
        }
        self
    }

    /// Create a network HTTP client from this configuration
    pub fn build_http_client(&self) -> Result<NetworkHttpClient, ConfigError> {
        self.validate()?;
        NetworkHttpClient::new(&self.base_url, self.request_timeout)
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_base_url_is_fatal() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl(BASE_URL_ENV)));

        let err = ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err =
            ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "ftp://example.com")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_defaults() {
        let config =
            ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "https://api.example.com/v1/")]))
                .unwrap();
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.tables_poll_interval, None);
        assert_eq!(config.default_customer, DEFAULT_CUSTOMER);
    }

    #[test]
    fn test_optional_settings() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "http://localhost:8080"),
            (REQUEST_TIMEOUT_ENV, "15"),
            (TABLES_POLL_ENV, "1"),
            (DEFAULT_CUSTOMER_ENV, " Balcão "),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        // clamped to the minimum interval
        assert_eq!(config.tables_poll_interval, Some(Duration::from_secs(5)));
        assert_eq!(config.default_customer, "Balcão");

        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "http://localhost:8080"),
            (REQUEST_TIMEOUT_ENV, "soon"),
            (TABLES_POLL_ENV, "0"),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.tables_poll_interval, None);
    }
}
