use crate::point::GeoPoint;
use crate::{MAX_LAT, MAX_LNG, MICRODEGREES_PER_DEGREE, MIN_LAT, MIN_LNG};
use geo::Rect;
use serde::{Deserialize, Serialize};

/// A closed, axis-aligned rectangle in fixed-point micro-degrees.
///
/// Edges are inclusive: a point on the boundary is inside. Edges are held as
/// `i64` so that rectangles derived from a search radius may overhang the
/// coordinate domain near the poles or the antimeridian without overflowing.
/// Such overhang is not wrapped; the part outside the domain simply matches
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoRect {
    /// Southern edge (minimum latitude)
    pub south: i64,
    /// Northern edge (maximum latitude)
    pub north: i64,
    /// Western edge (minimum longitude)
    pub west: i64,
    /// Eastern edge (maximum longitude)
    pub east: i64,
}

impl GeoRect {
    /// Create a rectangle from its four edges.
    ///
    /// Reversed edge pairs are swapped, so `new(10, 0, 5, -5)` and
    /// `new(0, 10, -5, 5)` describe the same rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use skygrid_types::bbox::GeoRect;
    ///
    /// let r = GeoRect::new(10, 0, 5, -5);
    /// assert_eq!((r.south, r.north, r.west, r.east), (0, 10, -5, 5));
    /// ```
    pub fn new(south: i64, north: i64, west: i64, east: i64) -> Self {
        Self {
            south: south.min(north),
            north: south.max(north),
            west: west.min(east),
            east: west.max(east),
        }
    }

    /// The whole coordinate domain.
    pub const fn world() -> Self {
        Self {
            south: MIN_LAT as i64,
            north: MAX_LAT as i64,
            west: MIN_LNG as i64,
            east: MAX_LNG as i64,
        }
    }

    /// A square centred on `center` extending `half_width` units on each side.
    ///
    /// Negative widths are taken by magnitude; edges saturate at the `i64` range.
    pub fn around(center: GeoPoint, half_width: i64) -> Self {
        let half_width = half_width.saturating_abs();
        let lat = center.lat() as i64;
        let lng = center.lng() as i64;
        Self {
            south: lat.saturating_sub(half_width),
            north: lat.saturating_add(half_width),
            west: lng.saturating_sub(half_width),
            east: lng.saturating_add(half_width),
        }
    }

    /// Build a rectangle from degree bounds, rounding outward to whole
    /// micro-degrees.
    pub fn from_degrees(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self::new(
            (south.min(north) * MICRODEGREES_PER_DEGREE).floor() as i64,
            (south.max(north) * MICRODEGREES_PER_DEGREE).ceil() as i64,
            (west.min(east) * MICRODEGREES_PER_DEGREE).floor() as i64,
            (west.max(east) * MICRODEGREES_PER_DEGREE).ceil() as i64,
        )
    }

    /// Latitude span in micro-degrees.
    pub fn height(&self) -> i64 {
        self.north - self.south
    }

    /// Longitude span in micro-degrees.
    pub fn width(&self) -> i64 {
        self.east - self.west
    }

    /// Whether `point` lies inside or on the boundary.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let lat = point.lat() as i64;
        let lng = point.lng() as i64;
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lng)
    }

    /// Whether any part of the rectangle leaves the coordinate domain.
    pub fn exceeds_domain(&self) -> bool {
        self.south < MIN_LAT as i64
            || self.north > MAX_LAT as i64
            || self.west < MIN_LNG as i64
            || self.east > MAX_LNG as i64
    }

    /// Convert to a `geo` rectangle in degrees (x = longitude, y = latitude).
    pub fn to_geo(&self) -> Rect<f64> {
        Rect::new(
            geo::coord! {
                x: self.west as f64 / MICRODEGREES_PER_DEGREE,
                y: self.south as f64 / MICRODEGREES_PER_DEGREE,
            },
            geo::coord! {
                x: self.east as f64 / MICRODEGREES_PER_DEGREE,
                y: self.north as f64 / MICRODEGREES_PER_DEGREE,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let r = GeoRect::new(0, 100, -50, 50);
        assert!(r.contains(&GeoPoint::new(0, -50)));
        assert!(r.contains(&GeoPoint::new(100, 50)));
        assert!(!r.contains(&GeoPoint::new(101, 0)));
        assert!(!r.contains(&GeoPoint::new(50, -51)));
    }

    #[test]
    fn test_around_and_overhang() {
        let pole = GeoPoint::new(MAX_LAT - 10, 0);
        let r = GeoRect::around(pole, 100);
        assert_eq!(r.height(), 200);
        assert_eq!(r.width(), 200);
        assert!(r.exceeds_domain());
        assert!(!GeoRect::world().exceeds_domain());
    }

    #[test]
    fn test_around_extreme_half_width() {
        let center = GeoPoint::new(1_000, -2_000);
        let r = GeoRect::around(center, i64::MIN);
        assert_eq!(r.south, 1_000 - i64::MAX);
        assert_eq!(r.north, i64::MAX);
        assert_eq!(r.west, i64::MIN);
        assert_eq!(r.east, i64::MAX - 2_000);

        assert_eq!(GeoRect::around(center, -5), GeoRect::around(center, 5));
    }

    #[test]
    fn test_from_degrees_rounds_outward() {
        let r = GeoRect::from_degrees(37.0000004, 37.0000006, -122.0000004, -121.9999996);
        assert_eq!(r.south, 37_000_000);
        assert_eq!(r.north, 37_000_001);
        assert_eq!(r.west, -122_000_001);
        assert_eq!(r.east, -121_999_999);
    }

    #[test]
    fn test_to_geo() {
        let r = GeoRect::new(-1_000_000, 2_000_000, -3_000_000, 4_000_000);
        let g = r.to_geo();
        assert_eq!(g.min().x, -3.0);
        assert_eq!(g.min().y, -1.0);
        assert_eq!(g.max().x, 4.0);
        assert_eq!(g.max().y, 2.0);
    }
}
