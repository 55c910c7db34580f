//! Configuration for the spatial directory.
//!
//! Settings load from JSON, or from TOML with the `toml` feature. Every field
//! has a default, so an empty document is a valid configuration.

use crate::compute::spatial::coverage::DEFAULT_COVERAGE_THRESHOLD;
use crate::error::{Result, SkyGridError};
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spatial directory configuration
///
/// # Example
///
/// ```rust
/// use skygrid::DirectoryConfig;
///
/// let config = DirectoryConfig::default();
/// assert_eq!(config.coverage_threshold, 0.7);
///
/// let json = r#"{ "coverage_threshold": 0.9, "radius_tolerance_meters": 1.0 }"#;
/// let config = DirectoryConfig::from_json(json).unwrap();
/// assert_eq!(config.coverage_threshold, 0.9);
/// assert!(config.cache_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Fraction of a cell the search rectangle must cover before the coverage
    /// search stops subdividing it (0.0..=1.0)
    #[serde(default = "DirectoryConfig::default_coverage_threshold")]
    pub coverage_threshold: f64,

    /// Largest position change, in micro-degrees per axis, that still counts
    /// as the cached query
    #[serde(default = "DirectoryConfig::default_position_tolerance")]
    pub position_tolerance: f64,

    /// Largest radius change, in meters, that still counts as the cached query
    #[serde(default = "DirectoryConfig::default_radius_tolerance")]
    pub radius_tolerance_meters: f64,

    #[serde(default = "DirectoryConfig::default_cache_enabled")]
    pub cache_enabled: bool,
}

impl DirectoryConfig {
    const fn default_coverage_threshold() -> f64 {
        DEFAULT_COVERAGE_THRESHOLD
    }

    const fn default_position_tolerance() -> f64 {
        0.1
    }

    const fn default_radius_tolerance() -> f64 {
        0.1
    }

    const fn default_cache_enabled() -> bool {
        true
    }

    pub fn with_coverage_threshold(mut self, threshold: f64) -> Self {
        self.coverage_threshold = threshold;
        self
    }

    pub fn with_position_tolerance(mut self, tolerance: f64) -> Self {
        self.position_tolerance = tolerance;
        self
    }

    pub fn with_radius_tolerance(mut self, meters: f64) -> Self {
        self.radius_tolerance_meters = meters;
        self
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.coverage_threshold) {
            return Err(format!(
                "Coverage threshold must be within [0.0, 1.0], got {}",
                self.coverage_threshold
            ));
        }

        if !(self.position_tolerance.is_finite() && self.position_tolerance >= 0.0) {
            return Err(format!(
                "Position tolerance must be a non-negative number, got {}",
                self.position_tolerance
            ));
        }

        if !(self.radius_tolerance_meters.is_finite() && self.radius_tolerance_meters >= 0.0) {
            return Err(format!(
                "Radius tolerance must be a non-negative number, got {}",
                self.radius_tolerance_meters
            ));
        }

        if self.position_tolerance >= 1_000.0 {
            log::warn!(
                "Position tolerance of {} micro-degrees lets a moving position reuse \
                stale results",
                self.position_tolerance
            );
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: DirectoryConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: DirectoryConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a configuration file, choosing the format by extension
    /// (`.json`, or `.toml` with the `toml` feature).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::from_json(&contents)?),
            #[cfg(feature = "toml")]
            Some("toml") => {
                Self::from_toml(&contents).map_err(|e| SkyGridError::Config(e.to_string()))
            }
            other => Err(SkyGridError::Config(format!(
                "Unsupported configuration format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: Self::default_coverage_threshold(),
            position_tolerance: Self::default_position_tolerance(),
            radius_tolerance_meters: Self::default_radius_tolerance(),
            cache_enabled: Self::default_cache_enabled(),
        }
    }
}
