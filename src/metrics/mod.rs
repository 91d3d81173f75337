//! Metrics collection for the wizard core

use crate::error::{Result, WizardError};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry, Counter, CounterVec, Encoder, Histogram, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Process-wide metrics
pub static WIZARD_METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Wizard
    pub step_transitions: CounterVec,
    pub submissions: Counter,

    // Camera
    pub camera_sessions: CounterVec,
    pub captures: CounterVec,

    // Location
    pub location_detections: CounterVec,
    pub geocode_requests: CounterVec,
    pub geocode_cache_hits: Counter,
    pub geocode_cache_misses: Counter,
    pub geocode_circuit_open: Counter,
    pub geocode_duration: Histogram,
}

fn metrics_err(e: prometheus::Error) -> WizardError {
    WizardError::Metrics(e.to_string())
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let step_transitions = register_counter_vec_with_registry!(
            Opts::new("wizard_step_transitions_total", "Wizard step transitions by outcome"),
            &["from", "outcome"],
            registry
        )
        .map_err(metrics_err)?;

        let submissions = register_counter_with_registry!(
            Opts::new("wizard_submissions_total", "Complaints submitted"),
            registry
        )
        .map_err(metrics_err)?;

        let camera_sessions = register_counter_vec_with_registry!(
            Opts::new("camera_sessions_total", "Camera session open attempts by outcome"),
            &["outcome"],
            registry
        )
        .map_err(metrics_err)?;

        let captures = register_counter_vec_with_registry!(
            Opts::new("photo_captures_total", "Photo captures by outcome"),
            &["outcome"],
            registry
        )
        .map_err(metrics_err)?;

        let location_detections = register_counter_vec_with_registry!(
            Opts::new("location_detections_total", "Location detections by outcome"),
            &["outcome"],
            registry
        )
        .map_err(metrics_err)?;

        let geocode_requests = register_counter_vec_with_registry!(
            Opts::new("geocode_requests_total", "Reverse-geocode upstream requests by status"),
            &["status"],
            registry
        )
        .map_err(metrics_err)?;

        let geocode_cache_hits = register_counter_with_registry!(
            Opts::new("geocode_cache_hits_total", "Reverse-geocode cache hits"),
            registry
        )
        .map_err(metrics_err)?;

        let geocode_cache_misses = register_counter_with_registry!(
            Opts::new("geocode_cache_misses_total", "Reverse-geocode cache misses"),
            registry
        )
        .map_err(metrics_err)?;

        let geocode_circuit_open = register_counter_with_registry!(
            Opts::new("geocode_circuit_open_total", "Lookups rejected by an open circuit"),
            registry
        )
        .map_err(metrics_err)?;

        let geocode_duration = register_histogram_with_registry!(
            "geocode_request_duration_seconds",
            "Reverse-geocode lookup duration in seconds",
            registry
        )
        .map_err(metrics_err)?;

        Ok(Self {
            registry,
            step_transitions,
            submissions,
            camera_sessions,
            captures,
            location_detections,
            geocode_requests,
            geocode_cache_hits,
            geocode_cache_misses,
            geocode_circuit_open,
            geocode_duration,
        })
    }

    pub fn record_transition(&self, from: u8, outcome: &str) {
        let from = from.to_string();
        self.step_transitions
            .with_label_values(&[from.as_str(), outcome])
            .inc();
    }

    pub fn record_camera_session(&self, outcome: &str) {
        self.camera_sessions.with_label_values(&[outcome]).inc();
    }

    pub fn record_capture(&self, outcome: &str) {
        self.captures.with_label_values(&[outcome]).inc();
    }

    pub fn record_detection(&self, outcome: &str) {
        self.location_detections.with_label_values(&[outcome]).inc();
    }

    pub fn record_geocode(&self, status: &str) {
        self.geocode_requests.with_label_values(&[status]).inc();
    }

    /// Export this registry in Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_err)?;
        String::from_utf8(buffer).map_err(|e| WizardError::Metrics(e.to_string()))
    }
}
