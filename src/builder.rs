//! Directory builder
//!
//! Assembles a [`SpatialDirectory`] from a configuration, which may come from
//! code, a JSON/TOML string or a file on disk, and a point store.

use crate::config::DirectoryConfig;
use crate::directory::SpatialDirectory;
use crate::error::Result;
use crate::store::PointStore;
use std::path::Path;

/// Builder for directory configuration.
#[derive(Debug, Clone, Default)]
pub struct DirectoryBuilder {
    config: DirectoryConfig,
}

impl DirectoryBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a configuration file (see [`DirectoryConfig::load`]).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            config: DirectoryConfig::load(path)?,
        })
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: DirectoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn coverage_threshold(mut self, threshold: f64) -> Self {
        self.config = self.config.with_coverage_threshold(threshold);
        self
    }

    pub fn position_tolerance(mut self, tolerance: f64) -> Self {
        self.config = self.config.with_position_tolerance(tolerance);
        self
    }

    pub fn radius_tolerance(mut self, meters: f64) -> Self {
        self.config = self.config.with_radius_tolerance(meters);
        self
    }

    /// Turn the single-entry result cache on or off.
    pub fn cache(mut self, enabled: bool) -> Self {
        self.config = self.config.with_cache_enabled(enabled);
        self
    }

    /// Build the directory over `store`. Fails if the configuration is invalid.
    pub fn build<S: PointStore>(self, store: S) -> Result<SpatialDirectory<S>> {
        SpatialDirectory::with_config(store, self.config)
    }
}
