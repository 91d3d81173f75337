//! Wizard controller: the single owner of the draft complaint
//!
//! Steps run Photo -> Location -> Details -> Review -> submitted. Forward
//! moves are gated by [`validate`]; backward moves are unconditional. The
//! camera and location subsystems report results here and only the
//! controller writes them into the draft.

use super::models::{Field, FormData, ValidationResult, WizardState, WizardStep};
use super::submission::{ComplaintReceipt, ComplaintRecord};
use super::validation::validate;
use crate::capture::device::CameraDevice;
use crate::capture::manager::MediaCaptureManager;
use crate::capture::models::Capture;
use crate::config::AppConfig;
use crate::error::Result;
use crate::location::device::{GeolocationProvider, MapViewport};
use crate::location::geocoder::ReverseGeocoder;
use crate::location::models::{Coordinates, ResolvedAddress};
use crate::location::resolver::{DetectOutcome, LocationResolver, Resolution, SkipReason};
use crate::metrics::WIZARD_METRICS;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

const LOCATION_FIELDS: [Field; 3] = [Field::Ward, Field::Landmark, Field::Address];

/// Result of an `advance` attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Advanced(WizardStep),
    Blocked(ValidationResult),
    Submitted(ComplaintReceipt),
    AlreadySubmitted,
}

/// Read state for the UI shell
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub step: WizardStep,
    pub step_label: &'static str,
    pub progress_percent: f32,
    pub form_data: FormData,
    pub errors: ValidationResult,
    pub previews: Vec<String>,
    pub max_photos: usize,
    pub is_detecting: bool,
    pub location_locked: bool,
    pub marker: Option<Coordinates>,
    pub is_camera_open: bool,
    pub submitted: bool,
    pub receipt: Option<ComplaintReceipt>,
}

#[derive(Debug, Default)]
struct Draft {
    state: WizardState,
    receipt: Option<ComplaintReceipt>,
}

pub struct WizardController {
    draft: Mutex<Draft>,
    camera: MediaCaptureManager,
    location: LocationResolver,
}

impl WizardController {
    pub fn new(camera: MediaCaptureManager, location: LocationResolver) -> Self {
        Self {
            draft: Mutex::new(Draft::default()),
            camera,
            location,
        }
    }

    /// Wire the subsystems from configuration
    pub fn from_config(
        config: &AppConfig,
        camera: Arc<dyn CameraDevice>,
        geolocation: Arc<dyn GeolocationProvider>,
        geocoder: Arc<dyn ReverseGeocoder>,
        viewport: Arc<dyn MapViewport>,
    ) -> Self {
        let camera = MediaCaptureManager::new(camera, config.camera.clone());
        let location = LocationResolver::new(
            geolocation,
            geocoder,
            viewport,
            config.map.clone(),
            &config.geolocation,
        );
        Self::new(camera, location)
    }

    fn lock(&self) -> MutexGuard<'_, Draft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn step(&self) -> WizardStep {
        self.lock().state.step
    }

    pub fn form_data(&self) -> FormData {
        self.lock().state.form_data.clone()
    }

    pub fn errors(&self) -> ValidationResult {
        self.lock().state.errors.clone()
    }

    pub fn is_submitted(&self) -> bool {
        self.lock().state.submitted
    }

    pub fn receipt(&self) -> Option<ComplaintReceipt> {
        self.lock().receipt.clone()
    }

    pub fn captures(&self) -> Vec<Capture> {
        self.camera.captures()
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let draft = self.lock();
        WizardSnapshot {
            step: draft.state.step,
            step_label: draft.state.step.label(),
            progress_percent: draft.state.progress_percent(),
            form_data: draft.state.form_data.clone(),
            errors: draft.state.errors.clone(),
            previews: self.camera.previews(),
            max_photos: self.camera.max_photos(),
            is_detecting: self.location.is_detecting(),
            location_locked: self.location.is_locked(),
            marker: self.location.marker(),
            is_camera_open: self.camera.is_open(),
            submitted: draft.state.submitted,
            receipt: draft.receipt.clone(),
        }
    }

    /// Write a field and clear its error flag. Never validates.
    pub fn update_field(&self, field: Field, value: impl Into<String>) {
        let mut draft = self.lock();
        draft.state.form_data.set(field, value.into());
        if draft.state.errors.clear(field) {
            debug!("Cleared error on {}", field);
        }
    }

    /// Validate the current step and move forward, or submit from Review.
    /// A blocked step keeps its position and records the errors.
    pub fn advance(&self) -> AdvanceOutcome {
        let mut draft = self.lock();
        if draft.state.submitted {
            return AdvanceOutcome::AlreadySubmitted;
        }

        let from = draft.state.step;
        let errors = validate(from, &draft.state.form_data);
        if !errors.is_empty() {
            debug!("Step {} blocked on {:?}", from.number(), errors.fields());
            WIZARD_METRICS.record_transition(from.number(), "blocked");
            draft.state.errors = errors.clone();
            return AdvanceOutcome::Blocked(errors);
        }

        match from.next() {
            Some(next) => {
                draft.state.step = next;
                WIZARD_METRICS.record_transition(from.number(), "advanced");
                debug!("Advanced to step {}", next.number());
                AdvanceOutcome::Advanced(next)
            }
            None => {
                let record = ComplaintRecord {
                    form: draft.state.form_data.clone(),
                    photos: self.camera.captures(),
                    coordinates: self.location.marker(),
                };
                let receipt = ComplaintReceipt::issue(record);
                draft.state.submitted = true;
                draft.receipt = Some(receipt.clone());
                WIZARD_METRICS.record_transition(from.number(), "submitted");
                WIZARD_METRICS.submissions.inc();
                info!("Complaint submitted as {}", receipt.complaint_id);
                AdvanceOutcome::Submitted(receipt)
            }
        }
    }

    /// Step back without validating or clearing errors
    pub fn retreat(&self) -> WizardStep {
        let mut draft = self.lock();
        if draft.state.submitted {
            return draft.state.step;
        }
        if let Some(previous) = draft.state.step.previous() {
            draft.state.step = previous;
            WIZARD_METRICS.record_transition(previous.number() + 1, "retreated");
        }
        draft.state.step
    }

    pub async fn start_camera(&self) -> Result<()> {
        self.camera.start_camera().await
    }

    pub async fn capture_photo(&self) -> Option<usize> {
        self.camera.capture_photo().await
    }

    pub async fn stop_camera(&self) {
        self.camera.stop_camera().await
    }

    pub fn remove_photo(&self, index: usize) -> Result<Capture> {
        self.camera.remove_photo(index)
    }

    /// Detect the location and merge the resolved address into the draft.
    ///
    /// The location is locked and the address merged under the draft lock,
    /// so a concurrent reset or teardown sees either both or neither.
    pub async fn detect_location(&self) -> Result<DetectOutcome> {
        if self.location.is_detached() {
            debug!("Wizard torn down, ignoring location detection");
            return Ok(DetectOutcome::Skipped(SkipReason::TornDown));
        }

        let captures = self.camera.captures();
        let pending = match self.location.resolve(&captures).await? {
            Resolution::Pending(pending) => pending,
            Resolution::Skipped(reason) => return Ok(DetectOutcome::Skipped(reason)),
        };

        let mut draft = self.lock();
        let outcome = self.location.lock_in(pending);
        if let DetectOutcome::Resolved { address, .. } = &outcome {
            merge_address(&mut draft.state, address);
        }
        Ok(outcome)
    }

    /// Clear the location fields and lock, then fly the map back out
    pub async fn reset_location(&self) {
        let generation = {
            let mut draft = self.lock();
            for field in LOCATION_FIELDS {
                draft.state.form_data.set(field, String::new());
            }
            self.location.clear()
        };
        self.location.return_to_world_view(generation).await;
    }

    /// Discard the draft and captures to start another report
    pub async fn start_new_report(&self) {
        self.camera.stop_camera().await;
        self.camera.clear();
        let generation = {
            let mut draft = self.lock();
            *draft = Draft::default();
            self.location.clear()
        };
        self.location.return_to_world_view(generation).await;
        info!("Started a new report");
    }

    /// Release the camera; location results that arrive later are dropped
    pub async fn teardown(&self) {
        self.location.detach();
        self.camera.stop_camera().await;
        debug!("Wizard torn down");
    }
}

fn merge_address(state: &mut WizardState, address: &ResolvedAddress) {
    state.form_data.ward = address.ward.clone();
    state.form_data.landmark = address.landmark.clone();
    state.form_data.address = address.address.clone();
    for field in LOCATION_FIELDS {
        state.errors.clear(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::device::CameraStream;
    use crate::capture::models::CameraConstraints;
    use crate::error::{DeviceError, WizardError};
    use crate::location::device::NoopViewport;
    use crate::location::geocoder::GeocodeError;
    use crate::location::models::PositionOptions;
    use async_trait::async_trait;

    struct NoCamera;

    #[async_trait]
    impl CameraDevice for NoCamera {
        async fn open(
            &self,
            _constraints: CameraConstraints,
        ) -> std::result::Result<Box<dyn CameraStream>, DeviceError> {
            Err(DeviceError::Unavailable("no camera".into()))
        }
    }

    struct NoGps;

    #[async_trait]
    impl GeolocationProvider for NoGps {
        async fn current_position(
            &self,
            _options: PositionOptions,
        ) -> std::result::Result<Coordinates, DeviceError> {
            Err(DeviceError::PermissionDenied("denied".into()))
        }
    }

    struct NoGeocoder;

    #[async_trait]
    impl ReverseGeocoder for NoGeocoder {
        async fn reverse(
            &self,
            _coords: Coordinates,
        ) -> std::result::Result<ResolvedAddress, GeocodeError> {
            Err(GeocodeError::Disabled)
        }
    }

    fn controller() -> WizardController {
        WizardController::from_config(
            &AppConfig::default(),
            Arc::new(NoCamera),
            Arc::new(NoGps),
            Arc::new(NoGeocoder),
            Arc::new(NoopViewport),
        )
    }

    fn fill_all(wizard: &WizardController) {
        wizard.update_field(Field::Ward, "Ward 12");
        wizard.update_field(Field::Address, "12 Main St");
        wizard.update_field(Field::Category, "Roads");
        wizard.update_field(Field::Description, "Pothole");
    }

    #[test]
    fn test_photo_step_has_no_requirements() {
        let wizard = controller();
        assert_eq!(wizard.advance(), AdvanceOutcome::Advanced(WizardStep::Location));
    }

    #[test]
    fn test_blocked_advance_is_idempotent() {
        let wizard = controller();
        wizard.advance();
        wizard.update_field(Field::Address, "12 Main St");

        let first = wizard.advance();
        let second = wizard.advance();
        assert_eq!(first, second);
        match first {
            AdvanceOutcome::Blocked(errors) => assert_eq!(errors.fields(), vec![Field::Ward]),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(wizard.step(), WizardStep::Location);
        assert!(wizard.errors().has(Field::Ward));
    }

    #[test]
    fn test_update_clears_error_before_next_advance() {
        let wizard = controller();
        wizard.advance();
        wizard.advance();
        assert!(wizard.errors().has(Field::Ward));
        assert!(wizard.errors().has(Field::Address));

        wizard.update_field(Field::Ward, "Ward 13");
        assert!(!wizard.errors().has(Field::Ward));
        assert!(wizard.errors().has(Field::Address));
    }

    #[test]
    fn test_retreat_keeps_errors_and_stops_at_first_step() {
        let wizard = controller();
        wizard.advance();
        wizard.advance();

        assert_eq!(wizard.retreat(), WizardStep::Photo);
        assert_eq!(wizard.retreat(), WizardStep::Photo);
        assert!(wizard.errors().has(Field::Ward));
    }

    #[test]
    fn test_full_walk_submits_once() {
        let wizard = controller();
        fill_all(&wizard);

        assert_eq!(wizard.advance(), AdvanceOutcome::Advanced(WizardStep::Location));
        assert_eq!(wizard.advance(), AdvanceOutcome::Advanced(WizardStep::Details));
        assert_eq!(wizard.advance(), AdvanceOutcome::Advanced(WizardStep::Review));
        let receipt = match wizard.advance() {
            AdvanceOutcome::Submitted(receipt) => receipt,
            other => panic!("unexpected {:?}", other),
        };

        assert!(wizard.is_submitted());
        assert_eq!(wizard.snapshot().step_label, "Review");
        assert_eq!(receipt.record.form.category, "Roads");
        assert_eq!(wizard.advance(), AdvanceOutcome::AlreadySubmitted);
        assert_eq!(wizard.retreat(), WizardStep::Review);
        assert_eq!(wizard.snapshot().receipt, Some(receipt));
    }

    #[tokio::test]
    async fn test_failures_leave_state_resumable() {
        let wizard = controller();
        wizard.update_field(Field::Ward, "Typed ward");

        let err = wizard.start_camera().await.unwrap_err();
        assert!(matches!(err, WizardError::CameraUnavailable(_)));

        let err = wizard.detect_location().await.unwrap_err();
        assert!(matches!(err, WizardError::GpsDenied(_)));

        let snapshot = wizard.snapshot();
        assert_eq!(snapshot.form_data.ward, "Typed ward");
        assert!(!snapshot.is_camera_open);
        assert!(!snapshot.is_detecting);
        assert!(!snapshot.location_locked);
    }

    #[tokio::test]
    async fn test_start_new_report_resets_draft() {
        let wizard = controller();
        fill_all(&wizard);
        for _ in 0..4 {
            wizard.advance();
        }
        assert!(wizard.is_submitted());

        wizard.start_new_report().await;

        let snapshot = wizard.snapshot();
        assert_eq!(snapshot.step, WizardStep::Photo);
        assert_eq!(snapshot.form_data, FormData::default());
        assert!(!snapshot.submitted);
        assert!(snapshot.receipt.is_none());
        assert!(snapshot.previews.is_empty());
    }
}
