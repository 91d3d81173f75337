//! Configuration for the complaint wizard core
//!
//! Values are layered: built-in defaults, then an optional config file, then
//! `CIVIC__<SECTION>__<KEY>` environment variables.

use crate::error::Result;
use crate::location::geocoder_config::GeocoderConfig;
use crate::location::models::{Coordinates, LocationTarget};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub geolocation: GeolocationConfig,

    #[serde(default)]
    pub geocoder: GeocoderConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from a config file (any format the `config` crate understands)
    /// with environment overrides applied on top
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("CIVIC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        if config.camera.max_photos > MAX_PHOTOS {
            warn!(
                "camera.max_photos = {} exceeds the ceiling, using {}",
                config.camera.max_photos, MAX_PHOTOS
            );
        }
        Ok(config)
    }

    /// Read `.env`, then load the file named by `CIVIC_CONFIG` (default
    /// `civic.toml`)
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var("CIVIC_CONFIG").unwrap_or_else(|_| "civic.toml".to_string());
        let mut config = Self::from_file(path)?;
        config.geocoder = config.geocoder.from_env();
        Ok(config)
    }
}

/// Facing mode requested from the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    Environment,
    User,
}

/// Hard ceiling on the capture queue; `max_photos` can only lower it
pub const MAX_PHOTOS: usize = 3;

/// Camera capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Capture queue ceiling, clamped to [`MAX_PHOTOS`]
    #[serde(default = "default_max_photos")]
    pub max_photos: usize,

    /// Preferred camera
    #[serde(default = "default_facing_mode")]
    pub facing_mode: FacingMode,

    /// JPEG quality, 1-100
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_max_photos() -> usize { 3 }
fn default_facing_mode() -> FacingMode { FacingMode::Environment }
fn default_jpeg_quality() -> u8 { 92 }

impl CameraConfig {
    /// Effective queue limit
    pub fn photo_limit(&self) -> usize {
        self.max_photos.min(MAX_PHOTOS)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            max_photos: default_max_photos(),
            facing_mode: default_facing_mode(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Device geolocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,

    /// Position fix timeout; unset waits for the device
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Accept a cached fix no older than this
    #[serde(default)]
    pub maximum_age_ms: u64,
}

fn default_high_accuracy() -> bool { true }

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: default_high_accuracy(),
            timeout_ms: None,
            maximum_age_ms: 0,
        }
    }
}

impl GeolocationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Map viewport animation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub default_lat: f64,

    #[serde(default = "default_center_lng")]
    pub default_lng: f64,

    #[serde(default = "default_zoom")]
    pub default_zoom: u8,

    #[serde(default = "default_detect_zoom")]
    pub detect_zoom: u8,

    #[serde(default = "default_detect_duration")]
    pub detect_duration_secs: f64,

    #[serde(default = "default_detect_ease")]
    pub detect_ease_linearity: f64,

    #[serde(default = "default_reset_duration")]
    pub reset_duration_secs: f64,

    #[serde(default = "default_reset_ease")]
    pub reset_ease_linearity: f64,

    /// Pause between clearing a flight and starting the reset flight
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

fn default_center_lat() -> f64 { 20.5937 }
fn default_center_lng() -> f64 { 78.9629 }
fn default_zoom() -> u8 { 4 }
fn default_detect_zoom() -> u8 { 16 }
fn default_detect_duration() -> f64 { 2.4 }
fn default_detect_ease() -> f64 { 0.25 }
fn default_reset_duration() -> f64 { 1.4 }
fn default_reset_ease() -> f64 { 0.4 }
fn default_settle_delay() -> u64 { 50 }

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_lat: default_center_lat(),
            default_lng: default_center_lng(),
            default_zoom: default_zoom(),
            detect_zoom: default_detect_zoom(),
            detect_duration_secs: default_detect_duration(),
            detect_ease_linearity: default_detect_ease(),
            reset_duration_secs: default_reset_duration(),
            reset_ease_linearity: default_reset_ease(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

impl MapConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Flight to a freshly detected position
    pub fn detection_target(&self, center: Coordinates) -> LocationTarget {
        LocationTarget {
            center,
            zoom: self.detect_zoom,
            duration_secs: self.detect_duration_secs,
            ease_linearity: self.detect_ease_linearity,
        }
    }

    /// Faster, softer flight back to the world view
    pub fn world_view_target(&self) -> LocationTarget {
        LocationTarget {
            center: Coordinates::new(self.default_lat, self.default_lng),
            zoom: self.default_zoom,
            duration_secs: self.reset_duration_secs,
            ease_linearity: self.reset_ease_linearity,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
