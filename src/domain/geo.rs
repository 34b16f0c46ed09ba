use serde::{Deserialize, Serialize};

/// Mean Earth radius used for all great-circle math.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fallback origin when the device cannot tell us where it is (Riga).
pub const DEFAULT_LOCATION: Coordinate = Coordinate {
    latitude: 56.9496,
    longitude: 24.1052,
};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_distance(self, other)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        DEFAULT_LOCATION
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Great-circle distance in kilometers.
///
/// NaN components are not rejected; they flow through to a NaN result.
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Human readable distance label: `500m`, `1.3km`, `16km`.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0}m", (km * 1000.0).round())
    } else if km < 10.0 {
        // f64::round is half-away-from-zero, the formatter alone would give 1.2 for 1.25
        format!("{:.1}km", (km * 10.0).round() / 10.0)
    } else {
        format!("{:.0}km", km.round())
    }
}
