use crate::error::Result;
use crate::geo::GeoPoint;

/// Single-shot device position lookup. One attempt per call, no retry; a
/// failure ends that request.
pub trait Geolocator: Send + Sync {
    /// The device's current position, or `PermissionDenied` when the user
    /// refused access, or `RemoteUnavailable` when no position source exists.
    fn current_position(&self) -> Result<GeoPoint>;
}

/// Geolocator pinned to one position. Useful for hosts without a position
/// source and for tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticGeolocator {
    position: GeoPoint,
}

impl StaticGeolocator {
    pub fn new(position: GeoPoint) -> Self {
        Self { position }
    }
}

impl Geolocator for StaticGeolocator {
    fn current_position(&self) -> Result<GeoPoint> {
        Ok(self.position)
    }
}
