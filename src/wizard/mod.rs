//! Complaint submission wizard

pub mod controller;
pub mod models;
pub mod submission;
pub mod validation;

pub use controller::{AdvanceOutcome, WizardController, WizardSnapshot};
pub use models::{Field, FormData, ValidationResult, WizardState, WizardStep};
pub use submission::{ComplaintReceipt, ComplaintRecord};
pub use validation::validate;
