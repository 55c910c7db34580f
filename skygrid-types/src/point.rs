use crate::{MAX_LAT, MAX_LNG, MICRODEGREES_PER_DEGREE, MIN_LAT, MIN_LNG};
use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic position in fixed-point micro-degrees.
///
/// Latitude and longitude are stored as `i32` values of degrees × 1e6, the
/// same representation the point store uses for its rows. The valid domain is
/// latitude in `[-90e6, 90e6]` and longitude in `[-180e6, 180e6]`; constructing a
/// point does not enforce it, use [`GeoPoint::is_valid`] or the crate's
/// validation helpers before encoding.
///
/// # Examples
///
/// ```
/// use skygrid_types::point::GeoPoint;
///
/// let koak = GeoPoint::new(37_721_300, -122_221_100);
/// assert_eq!(koak.lat_degrees(), 37.7213);
///
/// let p = koak.to_geo();
/// assert_eq!(p.x(), -122.2211);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: i32,
    lng: i32,
}

impl GeoPoint {
    /// Create a point from micro-degree latitude and longitude.
    pub const fn new(lat: i32, lng: i32) -> Self {
        Self { lat, lng }
    }

    /// Create a point from floating-point degrees, rounding to the nearest
    /// micro-degree.
    ///
    /// Values outside the `i32` range saturate.
    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        Self {
            lat: (lat * MICRODEGREES_PER_DEGREE).round() as i32,
            lng: (lng * MICRODEGREES_PER_DEGREE).round() as i32,
        }
    }

    /// Latitude in micro-degrees.
    pub const fn lat(&self) -> i32 {
        self.lat
    }

    /// Longitude in micro-degrees.
    pub const fn lng(&self) -> i32 {
        self.lng
    }

    /// Latitude in degrees.
    pub fn lat_degrees(&self) -> f64 {
        self.lat as f64 / MICRODEGREES_PER_DEGREE
    }

    /// Longitude in degrees.
    pub fn lng_degrees(&self) -> f64 {
        self.lng as f64 / MICRODEGREES_PER_DEGREE
    }

    /// Whether the point lies inside the coordinate domain.
    pub fn is_valid(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.lat) && (MIN_LNG..=MAX_LNG).contains(&self.lng)
    }

    /// Convert to a `geo` point (x = longitude, y = latitude, in degrees).
    pub fn to_geo(&self) -> Point<f64> {
        Point::new(self.lng_degrees(), self.lat_degrees())
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        p.to_geo()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat_degrees(), self.lng_degrees())
    }
}
