//! Citizen complaint wizard core
//!
//! Collects a photo, a location and issue details through a four-step wizard
//! and issues a complaint receipt. Device access (camera, geolocation, map
//! rendering) sits behind traits so the core runs under any UI shell.

pub mod capture;
pub mod config;
pub mod error;
pub mod location;
pub mod metrics;
pub mod observability;
pub mod wizard;

pub use crate::config::AppConfig;
pub use error::{DeviceError, Result, WizardError};
pub use wizard::{AdvanceOutcome, Field, WizardController, WizardSnapshot, WizardStep};
