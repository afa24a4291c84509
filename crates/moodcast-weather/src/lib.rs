//! Weather service for Moodcast
//!
//! Resolves the device position (with a fixed fallback) and fetches current
//! conditions plus a five-day forecast from OpenWeatherMap.

pub mod location;
pub mod provider;
pub mod types;

pub use location::{
    FixedGeolocator, Geolocator, LocationRequest, LocationResolver, LocationSource,
    PermissionProvider, PermissionState, ResolvedLocation, StaticPermission,
    FALLBACK_COORDINATES,
};
pub use provider::{WeatherClient, WeatherSource, OPENWEATHER_API_BASE};
pub use types::*;
