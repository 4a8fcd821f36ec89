//! Tracking client configuration.
//!
//! Defaults reproduce the production extension: the dev store's app-proxy
//! origin, the `/apps/fedex-status/tracking` path, the opaque `_fd=0` and
//! `pb=0` flags, and a single rate-limit retry after 600 ms. Override via
//! environment variables or explicit construction for staging/testing.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::retry::RetryPolicy;

/// Default app-proxy origin.
pub const DEFAULT_ORIGIN: &str = "https://emerileverydaydev.myshopify.com";

/// Default app-proxy path of the tracking endpoint.
pub const DEFAULT_PATH: &str = "/apps/fedex-status/tracking";

/// Configuration for the tracking endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Origin of the storefront that hosts the app proxy.
    pub origin: Url,
    /// Path of the tracking endpoint under the origin.
    pub path: String,
    /// Query parameters appended to every request, in order. Their meaning
    /// belongs to the backend; they are passed through unchanged.
    pub query: Vec<(String, String)>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Rate-limit retry policy.
    pub retry: RetryPolicy,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            path: DEFAULT_PATH.to_string(),
            query: default_query(),
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

impl TrackingConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `FDSS_APP_ORIGIN` (default: `https://emerileverydaydev.myshopify.com`)
    /// - `FDSS_TRACKING_PATH` (default: `/apps/fedex-status/tracking`)
    /// - `FDSS_TIMEOUT_SECS` (default: 30)
    /// - `FDSS_MAX_RETRIES` (default: 1)
    /// - `FDSS_RETRY_DELAY_MS` (default: 600)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            origin: env_url("FDSS_APP_ORIGIN", DEFAULT_ORIGIN)?,
            path: std::env::var("FDSS_TRACKING_PATH").unwrap_or(defaults.path),
            query: defaults.query,
            timeout_secs: env_parse("FDSS_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs),
            retry: RetryPolicy {
                max_retries: env_parse("FDSS_MAX_RETRIES").unwrap_or(defaults.retry.max_retries),
                delay: env_parse("FDSS_RETRY_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.delay),
            },
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// Keeps the production path and flags but shortens the retry delay so
    /// tests do not sit in the backoff.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `uri` cannot be parsed.
    pub fn local_mock(uri: &str) -> Result<Self, ConfigError> {
        let origin =
            Url::parse(uri).map_err(|e| ConfigError::InvalidUrl(uri.to_string(), e.to_string()))?;
        Ok(Self {
            origin,
            timeout_secs: 5,
            retry: RetryPolicy {
                max_retries: 1,
                delay: Duration::from_millis(10),
            },
            ..Self::default()
        })
    }

    /// Apply the fields present in a config file on top of `self`.
    pub fn overlay(mut self, file: ConfigFile) -> Result<Self, ConfigError> {
        if let Some(origin) = file.origin {
            self.origin =
                Url::parse(&origin).map_err(|e| ConfigError::InvalidUrl(origin.clone(), e.to_string()))?;
        }
        if let Some(path) = file.path {
            self.path = path;
        }
        if let Some(query) = file.query {
            self.query = query;
        }
        if let Some(timeout_secs) = file.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(max_retries) = file.max_retries {
            self.retry.max_retries = max_retries;
        }
        if let Some(delay_ms) = file.retry_delay_ms {
            self.retry.delay = Duration::from_millis(delay_ms);
        }
        Ok(self)
    }

    /// Full URL of the tracking endpoint, flags included.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `path` cannot be joined onto
    /// `origin`.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let mut url = self
            .origin
            .join(&self.path)
            .map_err(|e| ConfigError::InvalidUrl(self.path.clone(), e.to_string()))?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// On-disk configuration. Every field is optional and overrides the value
/// loaded before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub origin: Option<String>,
    pub path: Option<String>,
    /// Ordered query flags, e.g. `[["_fd", "0"], ["pb", "0"]]`.
    pub query: Option<Vec<(String, String)>>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

fn default_origin() -> Url {
    Url::parse(DEFAULT_ORIGIN).unwrap_or_else(|_| unreachable!("DEFAULT_ORIGIN must parse"))
}

fn default_query() -> Vec<(String, String)> {
    vec![("_fd".into(), "0".into()), ("pb".into(), "0".into())]
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
