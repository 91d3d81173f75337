//! Step validation

use super::models::{FormData, ValidationResult, WizardStep};

/// Compute the blocking errors for leaving `step` with the given form data.
///
/// A field is valid when it is a non-empty string. Steps without required
/// fields always pass.
pub fn validate(step: WizardStep, form: &FormData) -> ValidationResult {
    let mut result = ValidationResult::new();
    for &field in step.required_fields() {
        if form.get(field).is_empty() {
            result.flag(field);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::models::Field;

    fn filled() -> FormData {
        FormData {
            ward: "Ward 12".into(),
            landmark: String::new(),
            address: "12 Main St".into(),
            category: "Roads".into(),
            description: "Pothole near the bus stop".into(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_photo_and_review_always_pass() {
        let empty = FormData::default();
        assert!(validate(WizardStep::Photo, &empty).is_empty());
        assert!(validate(WizardStep::Review, &empty).is_empty());
    }

    #[test]
    fn test_location_requires_ward_and_address() {
        let mut form = filled();
        form.ward.clear();

        let result = validate(WizardStep::Location, &form);
        assert_eq!(result.fields(), vec![Field::Ward]);

        form.address.clear();
        let result = validate(WizardStep::Location, &form);
        assert!(result.has(Field::Ward));
        assert!(result.has(Field::Address));
    }

    #[test]
    fn test_details_requires_category_and_description() {
        let mut form = filled();
        assert!(validate(WizardStep::Details, &form).is_empty());

        form.category.clear();
        form.description.clear();
        let result = validate(WizardStep::Details, &form);
        assert_eq!(result.fields(), vec![Field::Category, Field::Description]);
    }

    #[test]
    fn test_optional_fields_never_block() {
        let mut form = filled();
        form.landmark.clear();
        form.notes.clear();
        assert!(validate(WizardStep::Location, &form).is_empty());
        assert!(validate(WizardStep::Details, &form).is_empty());
    }

    #[test]
    fn test_whitespace_counts_as_filled() {
        let mut form = filled();
        form.ward = " ".into();
        assert!(validate(WizardStep::Location, &form).is_empty());
    }
}
