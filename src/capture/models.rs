//! Data models for photo capture

use crate::config::FacingMode;
use crate::location::models::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One captured photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    /// `data:image/jpeg;base64,...`
    pub image_data: String,
    #[serde(default)]
    pub geotag: Option<Coordinates>,
    pub captured_at: DateTime<Utc>,
}

impl Capture {
    pub fn new(image_data: String, geotag: Option<Coordinates>) -> Self {
        Self {
            image_data,
            geotag,
            captured_at: Utc::now(),
        }
    }
}

/// Constraints for opening a camera stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing_mode: FacingMode,
}

/// Raw RGBA frame sampled from a live stream
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes
    pub rgba: Vec<u8>,
    /// Position attached by the device, if any
    pub geotag: Option<Coordinates>,
}
