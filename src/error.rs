//! Error types for the complaint wizard core
//!
//! Every variant except `IndexOutOfRange` is recoverable: the wizard stays
//! in a consistent state and the caller shows `notice()` to the citizen.

use crate::wizard::models::Field;
use thiserror::Error;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, WizardError>;

/// Wizard errors
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Validation failed for fields: {fields:?}")]
    Validation { fields: Vec<Field> },

    #[error("Capture limit exceeded: at most {max} photos")]
    CaptureLimitExceeded { max: usize },

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("GPS denied: {0}")]
    GpsDenied(String),

    #[error("Address not found for ({lat}, {lng})")]
    AddressNotFound { lat: f64, lng: f64 },

    #[error("Index {index} out of range for {len} captures")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

/// Failures reported by device adapters (camera, geolocation)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Frame unavailable: {0}")]
    FrameUnavailable(String),
}

impl WizardError {
    /// Message suitable for showing to the citizen
    pub fn notice(&self) -> String {
        match self {
            Self::Validation { .. } => "Please fill in the highlighted fields".to_string(),
            Self::CaptureLimitExceeded { max } => format!("Maximum {} photos allowed", max),
            Self::CameraUnavailable(_) => {
                "Unable to access camera. Please allow permissions.".to_string()
            }
            Self::GpsDenied(_) => "GPS access denied".to_string(),
            Self::AddressNotFound { .. } => "Address not found".to_string(),
            Self::IndexOutOfRange { .. }
            | Self::Config(_)
            | Self::Logging(_)
            | Self::Metrics(_) => "Something went wrong".to_string(),
        }
    }

    /// Programming defects that the UI should never be able to trigger
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_match_user_facing_copy() {
        assert_eq!(
            WizardError::CaptureLimitExceeded { max: 3 }.notice(),
            "Maximum 3 photos allowed"
        );
        assert_eq!(
            WizardError::GpsDenied("denied".into()).notice(),
            "GPS access denied"
        );
        assert_eq!(
            WizardError::AddressNotFound { lat: 1.0, lng: 2.0 }.notice(),
            "Address not found"
        );
    }

    #[test]
    fn test_only_index_errors_are_defects() {
        assert!(WizardError::IndexOutOfRange { index: 4, len: 1 }.is_defect());
        assert!(!WizardError::CameraUnavailable("busy".into()).is_defect());
        assert!(!WizardError::Validation { fields: vec![Field::Ward] }.is_defect());
    }
}
