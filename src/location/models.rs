//! Data models for location resolution and map animation

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// WGS84 latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Bit-exact key, used for cache lookups
    pub(crate) fn cache_key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lng.to_bits())
    }
}

/// Desired map viewport: one flight from the current view to `center`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationTarget {
    pub center: Coordinates,
    pub zoom: u8,
    pub duration_secs: f64,
    /// Leaflet-style ease linearity, 0 (strong easing) to 1 (linear)
    pub ease_linearity: f64,
}

/// Commands pushed to the map-rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapCommand {
    FlyTo(LocationTarget),
    ClearTarget,
    SetMarker(Option<Coordinates>),
}

/// Options for a single current-position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Option<Duration>,
    pub maximum_age: Duration,
}

/// Reverse-geocode result, merged into the draft's location fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub ward: String,
    pub landmark: String,
    pub address: String,
}

impl ResolvedAddress {
    /// A result with no fields at all counts as a failed lookup
    pub fn is_usable(&self) -> bool {
        !(self.ward.is_empty() && self.landmark.is_empty() && self.address.is_empty())
    }
}

/// Reverse-geocode response body (subset)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: AddressDetails,
}

/// Structured address components. All optional; providers vary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressDetails {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub residential: Option<String>,
    pub village: Option<String>,
    pub amenity: Option<String>,
    pub shop: Option<String>,
    pub building: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
}

fn first_present<'a>(candidates: &[Option<&'a String>]) -> &'a str {
    candidates
        .iter()
        .copied()
        .flatten()
        .map(String::as_str)
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

impl ReverseResponse {
    /// Extract ward, landmark and street address by priority chain
    pub fn to_resolved(&self) -> ResolvedAddress {
        let a = &self.address;

        let ward = first_present(&[
            a.neighbourhood.as_ref(),
            a.suburb.as_ref(),
            a.residential.as_ref(),
            a.village.as_ref(),
        ]);

        let landmark = first_present(&[
            self.name.as_ref(),
            a.amenity.as_ref(),
            a.shop.as_ref(),
            a.building.as_ref(),
        ]);

        let street = format!(
            "{} {}",
            a.house_number.as_deref().unwrap_or(""),
            a.road.as_deref().unwrap_or("")
        );
        let locality = first_present(&[a.city.as_ref(), a.town.as_ref(), a.county.as_ref()]);
        let address = [street.trim(), locality]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        ResolvedAddress {
            ward: ward.to_string(),
            landmark: landmark.to_string(),
            address,
        }
    }
}
