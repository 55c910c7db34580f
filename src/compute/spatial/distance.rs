//! Distance helpers.
//!
//! Two earth models live here on purpose. [`haversine_distance`] is the exact
//! great-circle filter applied to candidates. [`radius_to_half_width`] only
//! bounds the rectangle handed to the coverage search, and must never come out
//! smaller than the true circle, so it uses a smaller earth radius and scales
//! longitude at the poleward edge of the circle. Do not merge them.

use geo::{Distance, Haversine};
use skygrid_types::MICRODEGREES_PER_DEGREE;
use skygrid_types::bbox::GeoRect;
use skygrid_types::point::GeoPoint;

/// Earth radius for the rectangle bound (polar radius, below the mean radius
/// the haversine filter uses).
pub const BOUNDING_EARTH_RADIUS_METERS: f64 = 6_356_752.0;

/// Great-circle distance in meters.
///
/// # Examples
///
/// ```
/// use skygrid::compute::spatial::distance::haversine_distance;
/// use skygrid::GeoPoint;
///
/// let ksfo = GeoPoint::new(37_621_300, -122_379_000);
/// let koak = GeoPoint::new(37_721_300, -122_221_100);
/// let d = haversine_distance(&ksfo, &koak);
/// assert!(d > 17_000.0 && d < 19_000.0);
/// ```
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    Haversine.distance(a.to_geo(), b.to_geo())
}

/// Half-width, in micro-degrees, of a square that encloses the circle of
/// `radius_meters` around `center`.
///
/// The larger of the latitude and longitude extents is used for both axes.
/// The result is rounded up and padded by one unit.
pub fn radius_to_half_width(center: &GeoPoint, radius_meters: f64) -> i64 {
    let meters_per_degree = BOUNDING_EARTH_RADIUS_METERS.to_radians();
    let lat_degrees = radius_meters / meters_per_degree;

    let poleward_lat = center.lat_degrees().abs() + lat_degrees;
    let lng_degrees = if poleward_lat >= 90.0 {
        180.0
    } else {
        let meters_per_degree_lng = meters_per_degree * poleward_lat.to_radians().cos();
        (radius_meters / meters_per_degree_lng).min(180.0)
    };

    let half_width = lat_degrees.max(lng_degrees).min(360.0);
    (half_width * MICRODEGREES_PER_DEGREE).ceil() as i64 + 1
}

/// Square search rectangle for a radius query.
///
/// Not wrapped at the antimeridian nor clipped at the poles.
pub fn bounding_rect(center: &GeoPoint, radius_meters: f64) -> GeoRect {
    GeoRect::around(*center, radius_to_half_width(center, radius_meters))
}
