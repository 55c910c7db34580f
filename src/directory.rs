//! "What is near me" queries over a cell-indexed point store.
//!
//! A radius query becomes a conservative square, the square becomes cell
//! ranges, the ranges become candidate rows, and the candidates are filtered
//! by great-circle distance. The most recent answer is memoized: a moving map
//! polls with the same position and radius far more often than it moves.
//!
//! # Thread Safety
//!
//! One coarse lock guards the whole query, store round-trips included. A second
//! caller blocks until the first finishes. This fits a single polling client;
//! concurrent callers would want a multi-entry cache with finer locking.

use crate::compute::spatial::coverage::{AreaCoverageSolver, CancellationToken, CellRange};
use crate::compute::spatial::distance::{bounding_rect, haversine_distance};
use crate::compute::validation::{validate_geo_point, validate_radius};
use crate::config::DirectoryConfig;
use crate::error::{Result, SkyGridError};
use crate::store::{PointRecord, PointStore};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use skygrid_types::bbox::GeoRect;
use skygrid_types::point::GeoPoint;
use std::sync::Arc;

/// A point found by a radius query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyPoint {
    pub point: PointRecord,
    /// Great-circle distance from the query position, in meters
    pub distance_meters: f64,
}

/// Counters for a directory's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    /// Radius queries answered, cached or not
    pub queries: u64,
    /// Radius queries answered from the cache
    pub cache_hits: u64,
    /// Batched store lookups issued (one per uncached query)
    pub store_calls: u64,
    /// Number of cell ranges in the most recent store lookup
    pub last_range_count: usize,
}

#[derive(Debug, Clone)]
struct QueryCacheEntry {
    position: GeoPoint,
    radius_meters: f64,
    min_rank: i32,
    results: Arc<[NearbyPoint]>,
}

impl QueryCacheEntry {
    fn matches(
        &self,
        position: &GeoPoint,
        radius_meters: f64,
        min_rank: i32,
        config: &DirectoryConfig,
    ) -> bool {
        let d_lat = (self.position.lat() as f64 - position.lat() as f64).abs();
        let d_lng = (self.position.lng() as f64 - position.lng() as f64).abs();

        self.min_rank == min_rank
            && d_lat <= config.position_tolerance
            && d_lng <= config.position_tolerance
            && (self.radius_meters - radius_meters).abs() <= config.radius_tolerance_meters
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    cache: Option<QueryCacheEntry>,
    stats: DirectoryStats,
}

/// Spatial query front end for a [`PointStore`].
///
/// # Examples
///
/// ```rust
/// use skygrid::{GeoPoint, MemoryPointStore, PointRecord, SpatialDirectory};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryPointStore::from_records([
///     PointRecord::new(1, GeoPoint::new(37_621_300, -122_379_000), 5), // KSFO
///     PointRecord::new(2, GeoPoint::new(37_721_300, -122_221_100), 4), // KOAK
///     PointRecord::new(3, GeoPoint::new(33_942_500, -118_408_100), 5), // KLAX
/// ])?;
/// let directory = SpatialDirectory::new(store);
///
/// let here = GeoPoint::new(37_621_300, -122_379_000);
/// let nearby = directory.points_within_radius(here, 30_000.0, 0)?;
/// assert_eq!(nearby.len(), 2);
/// assert_eq!(nearby[0].point.id, 1);
/// # Ok(())
/// # }
/// ```
pub struct SpatialDirectory<S> {
    store: S,
    solver: AreaCoverageSolver,
    config: DirectoryConfig,
    state: Mutex<DirectoryState>,
}

impl<S: PointStore> SpatialDirectory<S> {
    /// Create a directory with the default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            solver: AreaCoverageSolver::default(),
            config: DirectoryConfig::default(),
            state: Mutex::new(DirectoryState::default()),
        }
    }

    /// Create a directory with `config`, which is validated first.
    pub fn with_config(store: S, config: DirectoryConfig) -> Result<Self> {
        config.validate().map_err(SkyGridError::Config)?;
        let solver = AreaCoverageSolver::new(config.coverage_threshold)?;

        Ok(Self {
            store,
            solver,
            config,
            state: Mutex::new(DirectoryState::default()),
        })
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store. Drops the cached result, which may no
    /// longer reflect the store's contents.
    pub fn store_mut(&mut self) -> &mut S {
        self.state.get_mut().cache = None;
        &mut self.store
    }

    /// Forget the cached result so the next query goes to the store.
    pub fn clear_cache(&self) {
        self.state.lock().cache = None;
    }

    pub fn stats(&self) -> DirectoryStats {
        self.state.lock().stats
    }

    /// All points within `radius_meters` of `position` with rank at least
    /// `min_rank`, nearest first.
    ///
    /// Ties in distance are ordered by point id. Repeating the previous
    /// query (within the configured tolerances) returns the cached result
    /// without touching the store.
    ///
    /// # Errors
    ///
    /// - [`SkyGridError::InvalidCoordinate`] if `position` is outside the domain
    /// - [`SkyGridError::InvalidInput`] if the radius is negative or not finite
    /// - any error returned by the store
    pub fn points_within_radius(
        &self,
        position: GeoPoint,
        radius_meters: f64,
        min_rank: i32,
    ) -> Result<Arc<[NearbyPoint]>> {
        self.query_radius(position, radius_meters, min_rank, None)
    }

    /// Like [`points_within_radius`](Self::points_within_radius), but the
    /// coverage search stops with [`SkyGridError::Aborted`] once `cancel` is
    /// cancelled. An aborted query leaves the cache untouched.
    pub fn points_within_radius_cancellable(
        &self,
        position: GeoPoint,
        radius_meters: f64,
        min_rank: i32,
        cancel: &CancellationToken,
    ) -> Result<Arc<[NearbyPoint]>> {
        self.query_radius(position, radius_meters, min_rank, Some(cancel))
    }

    /// All points inside `rect` with rank at least `min_rank`, ordered by id.
    ///
    /// Meant for filling a map viewport. Not cached.
    pub fn points_in_rect(&self, rect: &GeoRect, min_rank: i32) -> Result<Vec<PointRecord>> {
        let mut guard = self.state.lock();

        let ranges = self.solver.cover(rect)?;
        let candidates = self.fetch(&mut guard, &ranges, min_rank)?;

        let mut seen = FxHashSet::default();
        let mut points: Vec<PointRecord> = candidates
            .into_iter()
            .filter(|p| rect.contains(&p.position) && seen.insert(p.id))
            .collect();
        points.sort_by_key(|p| p.id);
        Ok(points)
    }

    fn query_radius(
        &self,
        position: GeoPoint,
        radius_meters: f64,
        min_rank: i32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Arc<[NearbyPoint]>> {
        validate_geo_point(&position)?;
        validate_radius(radius_meters)?;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.stats.queries += 1;

        if self.config.cache_enabled
            && let Some(entry) = &state.cache
            && entry.matches(&position, radius_meters, min_rank, &self.config)
        {
            let results = Arc::clone(&entry.results);
            state.stats.cache_hits += 1;
            log::debug!(
                "Cache hit for {} r={}m rank>={} ({} points)",
                position,
                radius_meters,
                min_rank,
                results.len()
            );
            return Ok(results);
        }

        let rect = bounding_rect(&position, radius_meters);
        let (ranges, coverage) = self.solver.cover_with_stats(&rect, cancel)?;
        let candidates = self.fetch(state, &ranges, min_rank)?;
        let candidate_count = candidates.len();

        let mut results: Vec<NearbyPoint> = candidates
            .into_iter()
            .filter_map(|point| {
                let distance_meters = haversine_distance(&position, &point.position);
                (distance_meters <= radius_meters).then_some(NearbyPoint {
                    point,
                    distance_meters,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance_meters
                .total_cmp(&b.distance_meters)
                .then(a.point.id.cmp(&b.point.id))
        });

        // Nearest occurrence of a repeated id wins.
        let mut seen = FxHashSet::default();
        results.retain(|nearby| {
            let first = seen.insert(nearby.point.id);
            if !first {
                log::warn!("Point store returned id {} more than once", nearby.point.id);
            }
            first
        });

        log::debug!(
            "Query {} r={}m rank>={}: {} ranges ({} cells visited), {} candidates, {} results",
            position,
            radius_meters,
            min_rank,
            ranges.len(),
            coverage.cells_visited,
            candidate_count,
            results.len()
        );

        let results: Arc<[NearbyPoint]> = results.into();
        if self.config.cache_enabled {
            state.cache = Some(QueryCacheEntry {
                position,
                radius_meters,
                min_rank,
                results: Arc::clone(&results),
            });
        }
        Ok(results)
    }

    fn fetch(
        &self,
        state: &mut DirectoryState,
        ranges: &[CellRange],
        min_rank: i32,
    ) -> Result<Vec<PointRecord>> {
        state.stats.store_calls += 1;
        state.stats.last_range_count = ranges.len();
        self.store.points_in_cell_ranges(ranges, min_rank)
    }
}
