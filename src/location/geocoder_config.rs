//! Configuration for the reverse-geocoding client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reverse-geocoding client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Enable/disable address lookup
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Service base URL; requests go to `{base_url}/reverse`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Identifying User-Agent, required by the public service
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Detail level requested from the service
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of retry attempts after the first failure
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    /// Base backoff in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Maximum cached lookups
    #[serde(default = "default_cache_size")]
    pub cache_max_size: u64,

    /// Circuit breaker failure threshold
    #[serde(default = "default_breaker_failures")]
    pub circuit_breaker_failures: usize,

    /// Circuit breaker reset timeout in seconds
    #[serde(default = "default_breaker_reset")]
    pub circuit_breaker_reset_secs: u64,
}

fn default_enabled() -> bool { true }
fn default_base_url() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { "Civira-Report-App/1.0 (support@civira.app)".to_string() }
fn default_zoom() -> u8 { 18 }
fn default_timeout_ms() -> u64 { 5000 }
fn default_retry_attempts() -> usize { 1 }
fn default_retry_backoff_ms() -> u64 { 200 }
fn default_cache_ttl() -> u64 { 600 }
fn default_cache_size() -> u64 { 1000 }
fn default_breaker_failures() -> usize { 5 }
fn default_breaker_reset() -> u64 { 30 }

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            zoom: default_zoom(),
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_ttl_secs: default_cache_ttl(),
            cache_max_size: default_cache_size(),
            circuit_breaker_failures: default_breaker_failures(),
            circuit_breaker_reset_secs: default_breaker_reset(),
        }
    }
}

impl GeocoderConfig {
    /// Apply environment variable overrides
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("GEOCODER_ENABLED") {
            self.enabled = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("GEOCODER_URL") {
            self.base_url = val;
        }

        if let Ok(val) = std::env::var("GEOCODER_USER_AGENT") {
            self.user_agent = val;
        }

        if let Ok(val) = std::env::var("GEOCODER_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.timeout_ms = timeout;
            }
        }

        if let Ok(val) = std::env::var("GEOCODER_MAX_RETRIES") {
            if let Ok(retries) = val.parse() {
                self.retry_attempts = retries;
            }
        }

        if let Ok(val) = std::env::var("GEOCODER_RETRY_BACKOFF_MS") {
            if let Ok(ms) = val.parse() {
                self.retry_backoff_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("GEOCODER_CACHE_TTL_SECS") {
            if let Ok(ttl) = val.parse() {
                self.cache_ttl_secs = ttl;
            }
        }

        if let Ok(val) = std::env::var("GEOCODER_CIRCUIT_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                self.circuit_breaker_failures = threshold;
            }
        }

        if let Ok(val) = std::env::var("GEOCODER_CIRCUIT_COOLDOWN_SECS") {
            if let Ok(secs) = val.parse() {
                self.circuit_breaker_reset_secs = secs;
            }
        }

        self
    }

    /// Lookup endpoint
    pub fn reverse_url(&self) -> String {
        format!("{}/reverse", self.base_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn breaker_reset_timeout(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
