//! In-memory devices shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use civic_report::capture::{CameraConstraints, CameraDevice, CameraStream, VideoFrame};
use civic_report::location::{
    Coordinates, GeocodeError, GeolocationProvider, LocationTarget, MapCommand, MapViewport,
    PositionOptions, ResolvedAddress, ReverseGeocoder,
};
use civic_report::{AppConfig, DeviceError, WizardController};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeCamera {
    pub deny: bool,
    pub geotag: Option<Coordinates>,
    pub opens: AtomicUsize,
    pub stops: Arc<AtomicUsize>,
}

struct FakeStream {
    geotag: Option<Coordinates>,
    stops: Arc<AtomicUsize>,
}

impl CameraStream for FakeStream {
    fn native_resolution(&self) -> (u32, u32) {
        (8, 6)
    }

    fn read_frame(&self) -> Result<VideoFrame, DeviceError> {
        Ok(VideoFrame {
            width: 8,
            height: 6,
            rgba: vec![90; 8 * 6 * 4],
            geotag: self.geotag,
        })
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CameraDevice for FakeCamera {
    async fn open(
        &self,
        _constraints: CameraConstraints,
    ) -> Result<Box<dyn CameraStream>, DeviceError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.deny {
            return Err(DeviceError::PermissionDenied("camera blocked".into()));
        }
        Ok(Box::new(FakeStream {
            geotag: self.geotag,
            stops: self.stops.clone(),
        }))
    }
}

/// Hands out positions in order; the last one repeats. Empty means denied.
#[derive(Default)]
pub struct FakeGps {
    positions: Mutex<VecDeque<Coordinates>>,
    pub calls: AtomicUsize,
}

impl FakeGps {
    pub fn at(positions: &[Coordinates]) -> Self {
        Self {
            positions: Mutex::new(positions.iter().copied().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GeolocationProvider for FakeGps {
    async fn current_position(&self, _options: PositionOptions) -> Result<Coordinates, DeviceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let mut positions = self.positions.lock().unwrap();
        let next = if positions.len() > 1 {
            positions.pop_front()
        } else {
            positions.front().copied()
        };
        next.ok_or_else(|| DeviceError::PermissionDenied("User denied Geolocation".into()))
    }
}

/// Names the ward and road after the coordinates it was asked about
pub struct EchoGeocoder;

#[async_trait]
impl ReverseGeocoder for EchoGeocoder {
    async fn reverse(&self, coords: Coordinates) -> Result<ResolvedAddress, GeocodeError> {
        Ok(ResolvedAddress {
            ward: format!("Ward {}", coords.lat),
            landmark: String::new(),
            address: format!("Road {}", coords.lng),
        })
    }
}

#[derive(Default)]
pub struct RecordingViewport {
    pub commands: Mutex<Vec<MapCommand>>,
}

impl RecordingViewport {
    pub fn flights(&self) -> Vec<LocationTarget> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MapCommand::FlyTo(t) => Some(*t),
                _ => None,
            })
            .collect()
    }
}

impl MapViewport for RecordingViewport {
    fn apply(&self, command: MapCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

pub struct Harness {
    pub wizard: WizardController,
    pub camera: Arc<FakeCamera>,
    pub gps: Arc<FakeGps>,
    pub viewport: Arc<RecordingViewport>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.map.settle_delay_ms = 5;
    config
}

pub fn harness_with(
    camera: FakeCamera,
    gps: FakeGps,
    geocoder: Arc<dyn ReverseGeocoder>,
) -> Harness {
    let camera = Arc::new(camera);
    let gps = Arc::new(gps);
    let viewport = Arc::new(RecordingViewport::default());
    let wizard = WizardController::from_config(
        &test_config(),
        camera.clone(),
        gps.clone(),
        geocoder,
        viewport.clone(),
    );
    Harness {
        wizard,
        camera,
        gps,
        viewport,
    }
}

pub fn harness(gps: FakeGps) -> Harness {
    harness_with(FakeCamera::default(), gps, Arc::new(EchoGeocoder))
}
