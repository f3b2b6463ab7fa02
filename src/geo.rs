//! Great-circle geometry on a spherical Earth.
//!
//! Distances use the haversine formula with the mean Earth radius.
//! Accuracy: ~0.5% against the WGS-84 ellipsoid, plenty for "which library
//! is closest" within a city.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::ranker::{CoordinateField, NearbyError, PointRef};

const DEG: f64 = PI / 180.0;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Tashkent city centre (Alisher Navoiy National Library).
pub const TASHKENT_CENTER: GeoPoint = GeoPoint {
    latitude: 41.311081,
    longitude: 69.280624,
};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, NearbyError> {
        let point = Self { latitude, longitude };
        point.validate(PointRef::Query)?;
        Ok(point)
    }

    /// Check both coordinates, attributing any failure to `which`.
    pub(crate) fn validate(&self, which: PointRef) -> Result<(), NearbyError> {
        check(self.latitude, 90.0, CoordinateField::Latitude, &which)?;
        check(self.longitude, 180.0, CoordinateField::Longitude, &which)
    }
}

fn check(value: f64, bound: f64, field: CoordinateField, which: &PointRef) -> Result<(), NearbyError> {
    if value.is_finite() && (-bound..=bound).contains(&value) {
        Ok(())
    } else {
        Err(NearbyError::InvalidCoordinate {
            point: which.clone(),
            field,
            value,
        })
    }
}

/// Haversine great-circle distance in kilometres. Does not validate input.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude) * DEG;
    let d_lon = (b.longitude - a.longitude) * DEG;

    let h = (d_lat / 2.0).sin().powi(2)
        + (a.latitude * DEG).cos() * (b.latitude * DEG).cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round a distance to one decimal place (0.1 km).
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Format coordinates as e.g. "41.3111°N, 69.2806°E".
pub fn format_coords(lat: f64, lon: f64) -> String {
    let lat_dir = if lat >= 0.0 { "N" } else { "S" };
    let lon_dir = if lon >= 0.0 { "E" } else { "W" };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), lat_dir, lon.abs(), lon_dir)
}
