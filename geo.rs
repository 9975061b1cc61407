use crate::models::PhotoRecord;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius within which a photo counts as "nearby", in kilometers.
pub const DEFAULT_PROXIMITY_RADIUS_KM: f64 = 5.0;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// A point only if both coordinates are present and finite. Partial or
    /// non-finite tagging reads as no position at all.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Self::new(lat, lng))
            }
            _ => None,
        }
    }

    pub fn distance_km(&self, other: GeoPoint) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Great-circle distance between two coordinates, in kilometers, via the
/// haversine formula. NaN inputs propagate NaN.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1) * PI / 180.0;
    let d_lon = (lon2 - lon1) * PI / 180.0;

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + (lat1 * PI / 180.0).cos()
            * (lat2 * PI / 180.0).cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Selects the photos within a radius of a center point.
///
/// A trait so the scan strategy can be swapped out; the bundled
/// [`FullScanFilter`] walks an already-fetched record list on the client,
/// which holds up for small collections but should eventually give way to a
/// store-side geo query behind this same seam.
pub trait ProximityFilter: Send + Sync {
    /// The subsequence of `photos` within `radius_km` of `center`, in input
    /// order. Photos without a valid position are never within radius.
    fn photos_within(
        &self,
        center: GeoPoint,
        radius_km: f64,
        photos: &[PhotoRecord],
    ) -> Vec<PhotoRecord>;
}

/// Client-side linear scan over the candidate list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullScanFilter;

impl ProximityFilter for FullScanFilter {
    fn photos_within(
        &self,
        center: GeoPoint,
        radius_km: f64,
        photos: &[PhotoRecord],
    ) -> Vec<PhotoRecord> {
        photos
            .iter()
            .filter(|photo| match photo.location() {
                Some(location) => center.distance_km(location) <= radius_km,
                None => false,
            })
            .cloned()
            .collect()
    }
}
