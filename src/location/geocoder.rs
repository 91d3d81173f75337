//! Reverse-geocoding client with retry, caching, and circuit breaker

use super::circuit_breaker::{BreakerStats, CircuitBreaker, CircuitBreakerConfig};
use super::geocoder_config::GeocoderConfig;
use super::models::{Coordinates, ResolvedAddress, ReverseResponse};
use crate::metrics::WIZARD_METRICS;
use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Reverse-geocoding error types
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Address lookup is disabled")]
    Disabled,

    #[error("Circuit breaker is open")]
    CircuitOpen,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Lookup returned no usable address fields")]
    NoUsableFields,
}

impl GeocodeError {
    /// Failures worth another attempt
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_) | Self::Timeout(_) | Self::UpstreamError(_)
        )
    }
}

/// Coordinates to human address
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, coords: Coordinates) -> Result<ResolvedAddress, GeocodeError>;
}

/// Client for a Nominatim-compatible `/reverse` endpoint
pub struct NominatimClient {
    http: Client,
    config: GeocoderConfig,
    cache: Cache<(u64, u64), ResolvedAddress>,
    breaker: CircuitBreaker,
}

impl NominatimClient {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::RequestFailed(e.to_string()))?;

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl())
            .build();

        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: config.circuit_breaker_failures,
            reset_timeout: config.breaker_reset_timeout(),
        });

        Ok(Self {
            http,
            config,
            cache,
            breaker,
        })
    }

    /// Call the lookup endpoint once
    async fn call_reverse_api(&self, coords: Coordinates) -> Result<ResolvedAddress, GeocodeError> {
        let params = [
            ("format", "json".to_string()),
            ("lat", coords.lat.to_string()),
            ("lon", coords.lng.to_string()),
            ("zoom", self.config.zoom.to_string()),
            ("addressdetails", "1".to_string()),
        ];

        debug!("Calling reverse geocode API for ({}, {})", coords.lat, coords.lng);

        let response = self
            .http
            .get(self.config.reverse_url())
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout(e.to_string())
                } else {
                    GeocodeError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GeocodeError::UpstreamError(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let resolved = body.to_resolved();
        if !resolved.is_usable() {
            return Err(GeocodeError::NoUsableFields);
        }
        Ok(resolved)
    }

    /// Calculate exponential backoff
    fn calculate_backoff(&self, attempt: usize) -> Duration {
        let base = self.config.retry_backoff();
        let multiplier = 2_u32.saturating_pow(attempt.saturating_sub(1) as u32);
        base.saturating_mul(multiplier)
    }

    pub fn breaker_stats(&self) -> BreakerStats {
        self.breaker.stats()
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, coords: Coordinates) -> Result<ResolvedAddress, GeocodeError> {
        let start = Instant::now();

        if !self.config.enabled {
            WIZARD_METRICS.record_geocode("disabled");
            return Err(GeocodeError::Disabled);
        }

        let key = coords.cache_key();
        if let Some(hit) = self.cache.get(&key).await {
            WIZARD_METRICS.geocode_cache_hits.inc();
            debug!("Reverse geocode cache hit");
            return Ok(hit);
        }
        WIZARD_METRICS.geocode_cache_misses.inc();

        if !self.breaker.allow_request() {
            WIZARD_METRICS.geocode_circuit_open.inc();
            error!("Circuit breaker is open for reverse geocoding");
            return Err(GeocodeError::CircuitOpen);
        }

        let mut attempt = 0;
        let resolved = loop {
            attempt += 1;

            match self.call_reverse_api(coords).await {
                Ok(resolved) => {
                    self.breaker.record_success();
                    WIZARD_METRICS.record_geocode("success");
                    break resolved;
                }
                Err(GeocodeError::NoUsableFields) => {
                    // The upstream answered; it just knows nothing here
                    self.breaker.record_success();
                    WIZARD_METRICS.record_geocode("empty");
                    return Err(GeocodeError::NoUsableFields);
                }
                Err(e) => {
                    self.breaker.record_failure();
                    WIZARD_METRICS.record_geocode("error");

                    if !e.is_transient() || attempt > self.config.retry_attempts {
                        error!("Reverse geocode failed after {} attempts: {}", attempt, e);
                        return Err(e);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        "Reverse geocode attempt {} failed: {}, retrying in {:?}",
                        attempt, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        };

        self.cache.insert(key, resolved.clone()).await;
        WIZARD_METRICS
            .geocode_duration
            .observe(start.elapsed().as_secs_f64());

        Ok(resolved)
    }
}
