//! Location resolution that never fails.
//!
//! The permission prompt and the device fix are platform collaborators behind
//! [`PermissionProvider`] and [`Geolocator`]. [`LocationResolver`] wraps them in
//! a single suspension point and degrades to a fixed fallback coordinate pair on
//! denial, timeout or provider error, so the pipeline always has a position.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Coordinates, LocationError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAXIMUM_AGE: Duration = Duration::from_secs(300);

/// Chennai, used whenever no device fix is available.
pub const FALLBACK_COORDINATES: Coordinates = Coordinates::new(13.0827, 80.2707);

/// Outcome of asking the platform for fine location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionState {
    Granted,
    Denied,
    /// The platform grants location without an explicit prompt.
    #[default]
    NotRequired,
}

impl PermissionState {
    pub fn allows_fix(self) -> bool {
        matches!(self, Self::Granted | Self::NotRequired)
    }
}

/// Parameters handed to the geolocation primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub timeout: Duration,
    /// Oldest cached fix the platform may return instead of a fresh one.
    pub maximum_age: Duration,
    pub high_accuracy: bool,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            maximum_age: DEFAULT_MAXIMUM_AGE,
            high_accuracy: false,
        }
    }
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Ask for fine location access. Errors are treated as a denial.
    async fn request_fine_location(&self) -> Result<PermissionState, LocationError>;
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(
        &self,
        request: &LocationRequest,
    ) -> Result<Coordinates, LocationError>;
}

/// Permission provider with a preconfigured answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPermission(pub PermissionState);

#[async_trait]
impl PermissionProvider for StaticPermission {
    async fn request_fine_location(&self) -> Result<PermissionState, LocationError> {
        Ok(self.0)
    }
}

/// Geolocator backed by a configured position.
///
/// With no position configured it behaves like a device without a location
/// service and always reports [`LocationError::ServiceUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    pub fn is_available(&self) -> bool {
        self.position.is_some()
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _request: &LocationRequest,
    ) -> Result<Coordinates, LocationError> {
        self.position.ok_or(LocationError::ServiceUnavailable)
    }
}

/// Where a resolved position came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub source: LocationSource,
}

pub struct LocationResolver {
    permissions: Arc<dyn PermissionProvider>,
    geolocator: Arc<dyn Geolocator>,
    request: LocationRequest,
    fallback: Coordinates,
}

impl LocationResolver {
    pub fn new(permissions: Arc<dyn PermissionProvider>, geolocator: Arc<dyn Geolocator>) -> Self {
        Self {
            permissions,
            geolocator,
            request: LocationRequest::default(),
            fallback: FALLBACK_COORDINATES,
        }
    }

    pub fn with_request(mut self, request: LocationRequest) -> Self {
        self.request = request;
        self
    }

    pub fn with_fallback(mut self, fallback: Coordinates) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> Coordinates {
        self.fallback
    }

    /// Resolve the current position, degrading to the fallback pair.
    pub async fn resolve(&self) -> Coordinates {
        self.resolve_detailed().await.coordinates
    }

    pub async fn resolve_detailed(&self) -> ResolvedLocation {
        match self.locate().await {
            Ok(coordinates) => {
                tracing::info!(
                    "Got location: {:.4}, {:.4}",
                    coordinates.latitude,
                    coordinates.longitude
                );
                ResolvedLocation {
                    coordinates,
                    source: LocationSource::Device,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "{}; using fallback location {:.4}, {:.4}",
                    e,
                    self.fallback.latitude,
                    self.fallback.longitude
                );
                ResolvedLocation {
                    coordinates: self.fallback,
                    source: LocationSource::Fallback,
                }
            }
        }
    }

    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let permission = match self.permissions.request_fine_location().await {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!("Permission request failed: {}", e);
                PermissionState::Denied
            }
        };

        if !permission.allows_fix() {
            return Err(LocationError::PermissionDenied);
        }

        let position = tokio::time::timeout(
            self.request.timeout,
            self.geolocator.current_position(&self.request),
        )
        .await
        .map_err(|_| LocationError::Timeout)??;

        if !position.is_valid() {
            return Err(LocationError::Other(format!(
                "invalid fix {}, {}",
                position.latitude, position.longitude
            )));
        }

        Ok(position)
    }
}
