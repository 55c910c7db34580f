//! Validation for coordinates and query parameters.

use crate::error::{Result, SkyGridError};
use skygrid_types::point::GeoPoint;

/// Validates a point lies in the coordinate domain.
///
/// Latitude: [-90e6, 90e6], Longitude: [-180e6, 180e6] (micro-degrees)
///
/// # Examples
///
/// ```
/// use skygrid::compute::validation::validate_geo_point;
/// use skygrid::GeoPoint;
///
/// let ksfo = GeoPoint::new(37_621_300, -122_379_000);
/// assert!(validate_geo_point(&ksfo).is_ok());
///
/// // Invalid latitude
/// let invalid = GeoPoint::new(95_000_000, 0);
/// assert!(validate_geo_point(&invalid).is_err());
/// ```
pub fn validate_geo_point(point: &GeoPoint) -> Result<()> {
    if !point.is_valid() {
        return Err(SkyGridError::InvalidCoordinate {
            lat: point.lat(),
            lng: point.lng(),
        });
    }
    Ok(())
}

/// Validates multiple points, reporting the index of the first bad one.
pub fn validate_points(points: &[GeoPoint]) -> Result<()> {
    for (idx, point) in points.iter().enumerate() {
        validate_geo_point(point)
            .map_err(|e| SkyGridError::InvalidInput(format!("Point at index {}: {}", idx, e)))?;
    }
    Ok(())
}

/// Validates a search radius in meters.
pub fn validate_radius(radius_meters: f64) -> Result<()> {
    if !radius_meters.is_finite() {
        return Err(SkyGridError::InvalidInput(format!(
            "Radius must be finite, got: {}",
            radius_meters
        )));
    }

    if radius_meters < 0.0 {
        return Err(SkyGridError::InvalidInput(format!(
            "Radius must be non-negative, got: {}",
            radius_meters
        )));
    }

    Ok(())
}

/// Validates a coverage threshold, which must be a fraction in [0, 1].
pub fn validate_coverage_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(SkyGridError::InvalidInput(format!(
            "Coverage threshold out of range [0.0, 1.0]: {}",
            threshold
        )));
    }
    Ok(())
}
