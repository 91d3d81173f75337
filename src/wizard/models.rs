//! Data models for the complaint wizard

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Editable form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Ward,
    Landmark,
    Address,
    Category,
    Description,
    Notes,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Ward,
        Field::Landmark,
        Field::Address,
        Field::Category,
        Field::Description,
        Field::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Ward => "ward",
            Field::Landmark => "landmark",
            Field::Address => "address",
            Field::Category => "category",
            Field::Description => "description",
            Field::Notes => "notes",
        }
    }

    /// Parse a form input name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draft complaint contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub ward: String,
    pub landmark: String,
    pub address: String,
    pub category: String,
    pub description: String,
    pub notes: String,
}

impl FormData {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Ward => &self.ward,
            Field::Landmark => &self.landmark,
            Field::Address => &self.address,
            Field::Category => &self.category,
            Field::Description => &self.description,
            Field::Notes => &self.notes,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Ward => &mut self.ward,
            Field::Landmark => &mut self.landmark,
            Field::Address => &mut self.address,
            Field::Category => &mut self.category,
            Field::Description => &mut self.description,
            Field::Notes => &mut self.notes,
        };
        *slot = value;
    }
}

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WizardStep {
    Photo = 1,
    Location = 2,
    Details = 3,
    Review = 4,
}

impl WizardStep {
    pub const TOTAL: u8 = 4;

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Photo),
            2 => Some(Self::Location),
            3 => Some(Self::Details),
            4 => Some(Self::Review),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    /// Progress tracker label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Photo => "Photo",
            Self::Location => "Location",
            Self::Details => "Details",
            Self::Review => "Review",
        }
    }

    /// Fields that must be non-empty before leaving this step
    pub fn required_fields(&self) -> &'static [Field] {
        match self {
            Self::Location => &[Field::Ward, Field::Address],
            Self::Details => &[Field::Category, Field::Description],
            Self::Photo | Self::Review => &[],
        }
    }
}

/// Per-field error flags. An absent field has no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: IndexMap<Field, bool>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(&mut self, field: Field) {
        self.errors.insert(field, true);
    }

    pub fn clear(&mut self, field: Field) -> bool {
        self.errors.shift_remove(&field).is_some()
    }

    pub fn has(&self, field: Field) -> bool {
        self.errors.get(&field).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.errors.keys().copied().collect()
    }

    /// Convert into a hard error for callers that treat failure as fatal
    pub fn into_result(self) -> crate::error::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::error::WizardError::Validation {
                fields: self.fields(),
            })
        }
    }
}

/// Position and data of an in-progress complaint draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardState {
    pub step: WizardStep,
    pub form_data: FormData,
    pub errors: ValidationResult,
    pub submitted: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::Photo,
            form_data: FormData::default(),
            errors: ValidationResult::default(),
            submitted: false,
        }
    }
}

impl WizardState {
    /// Progress bar fill, 0 at the first step and 100 at review
    pub fn progress_percent(&self) -> f32 {
        let done = f32::from(self.step.number() - 1);
        done / f32::from(WizardStep::TOTAL - 1) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_navigation_bounds() {
        assert_eq!(WizardStep::Photo.previous(), None);
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::Location.next(), Some(WizardStep::Details));
        assert_eq!(WizardStep::Details.previous(), Some(WizardStep::Location));
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.as_str()), Some(field));
        }
        assert_eq!(Field::from_name("photo"), None);
    }

    #[test]
    fn test_validation_result_clear() {
        let mut result = ValidationResult::new();
        result.flag(Field::Ward);
        result.flag(Field::Address);

        assert!(result.clear(Field::Ward));
        assert!(!result.clear(Field::Ward));
        assert!(!result.has(Field::Ward));
        assert_eq!(result.fields(), vec![Field::Address]);
    }

    #[test]
    fn test_step_labels_follow_order() {
        let labels: Vec<_> = (1..=WizardStep::TOTAL)
            .filter_map(WizardStep::from_number)
            .map(|step| step.label())
            .collect();
        assert_eq!(labels, vec!["Photo", "Location", "Details", "Review"]);
    }

    #[test]
    fn test_into_result_lists_flagged_fields() {
        assert!(ValidationResult::new().into_result().is_ok());

        let mut result = ValidationResult::new();
        result.flag(Field::Category);
        result.flag(Field::Description);
        match result.into_result() {
            Err(crate::error::WizardError::Validation { fields }) => {
                assert_eq!(fields, vec![Field::Category, Field::Description]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_progress_percent() {
        let mut state = WizardState::default();
        assert_eq!(state.progress_percent(), 0.0);
        state.step = WizardStep::Review;
        assert_eq!(state.progress_percent(), 100.0);
    }
}
