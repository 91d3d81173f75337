//! Location resolution
//!
//! - Device position or photo geotag
//! - Reverse geocoding against a Nominatim-compatible service
//! - Map viewport flight commands

pub mod circuit_breaker;
pub mod device;
pub mod geocoder;
pub mod geocoder_config;
pub mod models;
pub mod resolver;

pub use device::{ChannelViewport, GeolocationProvider, MapViewport, NoopViewport};
pub use geocoder::{GeocodeError, NominatimClient, ReverseGeocoder};
pub use geocoder_config::GeocoderConfig;
pub use models::{Coordinates, LocationTarget, MapCommand, PositionOptions, ResolvedAddress};
pub use resolver::{
    CoordinateSource, DetectOutcome, LocationResolver, PendingLocation, Resolution, SkipReason,
};
