//! Location detection, reverse geocoding and viewport targeting
//!
//! The resolver never touches the draft form. It reports a
//! [`DetectOutcome`] and the owning controller merges the address.
//!
//! Detection is guarded by an in-flight flag: overlapping `detect` calls
//! collapse to the first. A new [`LocationTarget`] is pushed to the map only
//! when the resolved coordinates differ from the active target, so repeated
//! triggers at an unchanged position never replay the flight.

use super::device::{GeolocationProvider, MapViewport};
use super::geocoder::ReverseGeocoder;
use super::models::{Coordinates, LocationTarget, MapCommand, PositionOptions, ResolvedAddress};
use crate::capture::models::Capture;
use crate::config::{GeolocationConfig, MapConfig};
use crate::error::{Result, WizardError};
use crate::metrics::WIZARD_METRICS;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where resolved coordinates came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    PhotoGeotag,
    Device,
}

/// Why a detection did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another detection is still running
    InFlight,
    /// An address is already locked in
    Locked,
    /// The location was reset while this detection was running
    Superseded,
    /// The owning wizard was torn down before the result arrived
    TornDown,
}

/// Result of a detection attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DetectOutcome {
    Resolved {
        coordinates: Coordinates,
        source: CoordinateSource,
        address: ResolvedAddress,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Default)]
struct ViewState {
    active_target: Option<LocationTarget>,
    marker: Option<Coordinates>,
    locked: bool,
    /// Bumped on every target change
    generation: u64,
    /// Bumped on every reset
    epoch: u64,
}

/// Clears the in-flight flag when the detection ends, on every path
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Coordinates and address resolved by [`LocationResolver::resolve`], not
/// yet locked in. Holds the in-flight flag until it is locked in or dropped.
pub struct PendingLocation<'a> {
    pub coordinates: Coordinates,
    pub source: CoordinateSource,
    pub address: ResolvedAddress,
    epoch: u64,
    _in_flight: InFlightGuard<'a>,
}

/// First phase of a detection
pub enum Resolution<'a> {
    Pending(PendingLocation<'a>),
    Skipped(SkipReason),
}

/// Resolves the complaint location and drives the map viewport
pub struct LocationResolver {
    geolocation: Arc<dyn GeolocationProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    viewport: Arc<dyn MapViewport>,
    map: MapConfig,
    position: PositionOptions,
    in_flight: AtomicBool,
    detached: AtomicBool,
    state: Mutex<ViewState>,
}

impl LocationResolver {
    pub fn new(
        geolocation: Arc<dyn GeolocationProvider>,
        geocoder: Arc<dyn ReverseGeocoder>,
        viewport: Arc<dyn MapViewport>,
        map: MapConfig,
        geolocation_config: &GeolocationConfig,
    ) -> Self {
        let position = PositionOptions {
            high_accuracy: geolocation_config.high_accuracy,
            timeout: geolocation_config.timeout(),
            maximum_age: Duration::from_millis(geolocation_config.maximum_age_ms),
        };

        Self {
            geolocation,
            geocoder,
            viewport,
            map,
            position,
            in_flight: AtomicBool::new(false),
            detached: AtomicBool::new(false),
            state: Mutex::new(ViewState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_detecting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_locked(&self) -> bool {
        self.lock().locked
    }

    pub fn marker(&self) -> Option<Coordinates> {
        self.lock().marker
    }

    pub fn active_target(&self) -> Option<LocationTarget> {
        self.lock().active_target
    }

    /// Detect the complaint location.
    ///
    /// The first geotagged capture wins; otherwise the device is asked for a
    /// high-accuracy fix. On success the location becomes locked and further
    /// calls are skipped until [`reset`](Self::reset).
    pub async fn detect(&self, captures: &[Capture]) -> Result<DetectOutcome> {
        match self.resolve(captures).await? {
            Resolution::Pending(pending) => Ok(self.lock_in(pending)),
            Resolution::Skipped(reason) => Ok(DetectOutcome::Skipped(reason)),
        }
    }

    /// Find coordinates, aim the map and look up the address, without
    /// locking the location
    pub async fn resolve(&self, captures: &[Capture]) -> Result<Resolution<'_>> {
        if self.is_detached() {
            return Ok(Resolution::Skipped(SkipReason::TornDown));
        }
        if self.is_locked() {
            WIZARD_METRICS.record_detection("skipped_locked");
            return Ok(Resolution::Skipped(SkipReason::Locked));
        }

        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Location detection already in flight");
            WIZARD_METRICS.record_detection("skipped_in_flight");
            return Ok(Resolution::Skipped(SkipReason::InFlight));
        };

        let epoch = self.lock().epoch;

        let (coordinates, source) = match captures.iter().find_map(|c| c.geotag) {
            Some(coords) => (coords, CoordinateSource::PhotoGeotag),
            None => match self.geolocation.current_position(self.position).await {
                Ok(coords) => (coords, CoordinateSource::Device),
                Err(e) => {
                    warn!("Device position unavailable: {}", e);
                    WIZARD_METRICS.record_detection("gps_denied");
                    return Err(WizardError::GpsDenied(e.to_string()));
                }
            },
        };
        debug!(
            "Resolved coordinates ({}, {}) from {:?}",
            coordinates.lat, coordinates.lng, source
        );

        if let Some(reason) = self.stale(&self.lock(), epoch) {
            return Ok(Resolution::Skipped(reason));
        }
        self.aim_at(coordinates);

        let Some(address) = self.reverse_geocode(coordinates).await else {
            WIZARD_METRICS.record_detection("address_not_found");
            return Err(WizardError::AddressNotFound {
                lat: coordinates.lat,
                lng: coordinates.lng,
            });
        };

        Ok(Resolution::Pending(PendingLocation {
            coordinates,
            source,
            address,
            epoch,
            _in_flight: guard,
        }))
    }

    /// Lock the location in, unless it was reset or detached while the
    /// lookup ran. Never suspends, so a caller can hold its own lock across
    /// this and the merge of the address.
    pub fn lock_in(&self, pending: PendingLocation<'_>) -> DetectOutcome {
        {
            let mut state = self.lock();
            if let Some(reason) = self.stale(&state, pending.epoch) {
                return DetectOutcome::Skipped(reason);
            }
            state.locked = true;
        }

        info!("Location locked");
        WIZARD_METRICS.record_detection("resolved");
        DetectOutcome::Resolved {
            coordinates: pending.coordinates,
            source: pending.source,
            address: pending.address,
        }
    }

    fn stale(&self, state: &ViewState, epoch: u64) -> Option<SkipReason> {
        let reason = if self.is_detached() {
            SkipReason::TornDown
        } else if state.epoch != epoch {
            SkipReason::Superseded
        } else {
            return None;
        };
        debug!("Discarding detection result: {:?}", reason);
        WIZARD_METRICS.record_detection(match reason {
            SkipReason::TornDown => "torn_down",
            _ => "superseded",
        });
        Some(reason)
    }

    /// Stop accepting detections. Results still in flight are discarded.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Look up a human address. Any failure yields `None`.
    pub async fn reverse_geocode(&self, coordinates: Coordinates) -> Option<ResolvedAddress> {
        match self.geocoder.reverse(coordinates).await {
            Ok(address) if address.is_usable() => Some(address),
            Ok(_) => {
                warn!("Reverse geocode returned no usable fields");
                None
            }
            Err(e) => {
                warn!("Reverse geocode failed: {}", e);
                None
            }
        }
    }

    /// Move the marker and request a flight, unless the map is already
    /// headed to these exact coordinates
    fn aim_at(&self, coordinates: Coordinates) {
        let target = {
            let mut state = self.lock();
            if state
                .active_target
                .is_some_and(|t| t.center == coordinates)
            {
                debug!("Map already targets these coordinates");
                return;
            }
            let target = self.map.detection_target(coordinates);
            state.active_target = Some(target);
            state.marker = Some(coordinates);
            state.generation += 1;
            target
        };

        self.viewport.apply(MapCommand::SetMarker(Some(coordinates)));
        self.viewport.apply(MapCommand::FlyTo(target));
    }

    /// Unlock the location and fly back to the world view.
    ///
    /// The marker, target and lock are cleared immediately. The return flight
    /// starts after the settle delay, and only if no newer target was set in
    /// the meantime.
    pub async fn reset(&self) {
        let generation = self.clear();
        self.return_to_world_view(generation).await;
    }

    /// Synchronous half of [`reset`](Self::reset). Returns the generation the
    /// world view flight must still match.
    pub(crate) fn clear(&self) -> u64 {
        let generation = {
            let mut state = self.lock();
            state.marker = None;
            state.active_target = None;
            state.locked = false;
            state.epoch += 1;
            state.generation += 1;
            state.generation
        };
        self.viewport.apply(MapCommand::SetMarker(None));
        self.viewport.apply(MapCommand::ClearTarget);
        generation
    }

    pub(crate) async fn return_to_world_view(&self, generation: u64) {
        tokio::time::sleep(self.map.settle_delay()).await;

        let target = self.map.world_view_target();
        {
            let mut state = self.lock();
            if state.generation != generation {
                debug!("Newer map target set during settle delay, skipping world view flight");
                return;
            }
            state.active_target = Some(target);
            state.generation += 1;
        }
        self.viewport.apply(MapCommand::FlyTo(target));
        info!("Location reset");
    }
}
