//! Point store abstraction for SkyGrid
//!
//! The directory never owns point data. It asks a [`PointStore`] for every
//! point whose cell id falls in a range, which an ordinary relational table
//! with a single index on its cell-id column can answer. [`MemoryPointStore`]
//! is an in-memory implementation keyed the same way.

use crate::compute::spatial::cell::{CellId, encode_checked};
use crate::compute::spatial::coverage::CellRange;
use crate::compute::validation::validate_points;
use crate::error::Result;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use skygrid_types::point::GeoPoint;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// One stored point: an airport, navaid, runway end or similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointRecord {
    /// Unique identity of the point in the store
    pub id: i64,
    pub position: GeoPoint,
    /// Importance used to thin results at small map scales; higher is more important
    pub rank: i32,
}

impl PointRecord {
    pub fn new(id: i64, position: GeoPoint, rank: i32) -> Self {
        Self { id, position, rank }
    }
}

/// Source of points indexed by cell id.
///
/// Implementations must return every point whose cell id lies in
/// `[min_cell, max_cell)` and whose rank is at least `min_rank`, and nothing
/// else. Order is not significant. Calls may block; errors are passed to the
/// directory's caller unchanged.
pub trait PointStore: Send + Sync {
    /// Points in one cell range.
    fn points_in_cell_range(
        &self,
        min_cell: CellId,
        max_cell: CellId,
        min_rank: i32,
    ) -> Result<Vec<PointRecord>>;

    /// Points in several disjoint ranges, concatenated.
    ///
    /// The directory issues exactly one call to this per uncached query.
    /// Stores that can batch (e.g. one SQL statement with `OR`ed ranges)
    /// should override it.
    fn points_in_cell_ranges(
        &self,
        ranges: &[CellRange],
        min_rank: i32,
    ) -> Result<Vec<PointRecord>> {
        let mut points = Vec::new();
        for range in ranges {
            points.extend(self.points_in_cell_range(range.min, range.max, min_rank)?);
        }
        Ok(points)
    }
}

impl<S: PointStore + ?Sized> PointStore for Arc<S> {
    fn points_in_cell_range(
        &self,
        min_cell: CellId,
        max_cell: CellId,
        min_rank: i32,
    ) -> Result<Vec<PointRecord>> {
        (**self).points_in_cell_range(min_cell, max_cell, min_rank)
    }

    fn points_in_cell_ranges(
        &self,
        ranges: &[CellRange],
        min_rank: i32,
    ) -> Result<Vec<PointRecord>> {
        (**self).points_in_cell_ranges(ranges, min_rank)
    }
}

/// Point store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored points
    pub point_count: usize,
    /// Number of distinct leaf cells holding at least one point
    pub occupied_cells: usize,
    /// Number of single-range lookups served
    pub range_queries: u64,
}

/// In-memory point store using a BTreeMap ordered by cell id.
///
/// # Examples
///
/// ```rust
/// use skygrid::{GeoPoint, MemoryPointStore, PointRecord, PointStore};
///
/// let mut store = MemoryPointStore::new();
/// store.insert(PointRecord::new(1, GeoPoint::new(37_621_300, -122_379_000), 5))?;
///
/// let all = store.points_in_cell_range(0, 1 << 30, 0)?;
/// assert_eq!(all.len(), 1);
/// let ranked = store.points_in_cell_range(0, 1 << 30, 6)?;
/// assert!(ranked.is_empty());
/// # Ok::<(), skygrid::SkyGridError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryPointStore {
    cells: BTreeMap<CellId, Vec<PointRecord>>,
    cell_of: FxHashMap<i64, CellId>,
    range_queries: AtomicU64,
}

impl MemoryPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records.
    ///
    /// Fails without loading anything if any record has an out-of-domain
    /// coordinate; the error names the index of the first bad record.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = PointRecord>,
    {
        let records: Vec<PointRecord> = records.into_iter().collect();
        let positions: Vec<GeoPoint> = records.iter().map(|r| r.position).collect();
        validate_points(&positions)?;

        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Insert or replace a point, assigning its cell id.
    ///
    /// Returns the previous record with the same id, if any.
    pub fn insert(&mut self, record: PointRecord) -> Result<Option<PointRecord>> {
        let cell = encode_checked(&record.position)?;
        let previous = self.remove(record.id);

        self.cells.entry(cell).or_default().push(record);
        self.cell_of.insert(record.id, cell);
        Ok(previous)
    }

    /// Remove a point by id.
    pub fn remove(&mut self, id: i64) -> Option<PointRecord> {
        let cell = self.cell_of.remove(&id)?;
        let bucket = self.cells.get_mut(&cell)?;
        let idx = bucket.iter().position(|p| p.id == id)?;
        let removed = bucket.swap_remove(idx);
        if bucket.is_empty() {
            self.cells.remove(&cell);
        }
        Some(removed)
    }

    pub fn get(&self, id: i64) -> Option<&PointRecord> {
        let cell = self.cell_of.get(&id)?;
        self.cells.get(cell)?.iter().find(|p| p.id == id)
    }

    /// Cell id assigned to a stored point.
    pub fn cell_of(&self, id: i64) -> Option<CellId> {
        self.cell_of.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.cell_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_of.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.cell_of.clear();
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            point_count: self.len(),
            occupied_cells: self.cells.len(),
            range_queries: self.range_queries.load(Ordering::Relaxed),
        }
    }
}

impl PointStore for MemoryPointStore {
    fn points_in_cell_range(
        &self,
        min_cell: CellId,
        max_cell: CellId,
        min_rank: i32,
    ) -> Result<Vec<PointRecord>> {
        self.range_queries.fetch_add(1, Ordering::Relaxed);
        if min_cell >= max_cell {
            return Ok(Vec::new());
        }

        Ok(self
            .cells
            .range(min_cell..max_cell)
            .flat_map(|(_, bucket)| bucket.iter())
            .filter(|p| p.rank >= min_rank)
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::spatial::cell::{CELL_ID_LIMIT, encode};
    use crate::error::SkyGridError;

    fn ksfo() -> PointRecord {
        PointRecord::new(1, GeoPoint::new(37_621_300, -122_379_000), 3)
    }

    fn egll() -> PointRecord {
        PointRecord::new(2, GeoPoint::new(51_470_000, -461_000), 5)
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = MemoryPointStore::new();
        assert!(store.insert(ksfo()).unwrap().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1), Some(&ksfo()));
        assert_eq!(store.cell_of(1), Some(encode(37_621_300, -122_379_000)));
    }

    #[test]
    fn test_insert_replaces_and_moves_cell() {
        let mut store = MemoryPointStore::new();
        store.insert(ksfo()).unwrap();

        let moved = PointRecord::new(1, GeoPoint::new(51_470_000, -461_000), 3);
        let previous = store.insert(moved).unwrap();
        assert_eq!(previous, Some(ksfo()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().occupied_cells, 1);
        assert_eq!(store.cell_of(1), Some(encode(51_470_000, -461_000)));
    }

    #[test]
    fn test_insert_rejects_invalid_coordinate() {
        let mut store = MemoryPointStore::new();
        let bad = PointRecord::new(9, GeoPoint::new(100_000_000, 0), 0);
        assert!(matches!(
            store.insert(bad),
            Err(SkyGridError::InvalidCoordinate { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_range_query_bounds_and_rank() {
        let store = MemoryPointStore::from_records([ksfo(), egll()]).unwrap();
        let ksfo_cell = store.cell_of(1).unwrap();

        let hit = store
            .points_in_cell_range(ksfo_cell, ksfo_cell + 1, 0)
            .unwrap();
        assert_eq!(hit, vec![ksfo()]);

        // Half-open: max is excluded.
        let miss = store.points_in_cell_range(ksfo_cell - 1, ksfo_cell, 0).unwrap();
        assert!(miss.is_empty());

        let ranked = store.points_in_cell_range(0, CELL_ID_LIMIT, 4).unwrap();
        assert_eq!(ranked, vec![egll()]);

        let empty = store.points_in_cell_range(10, 10, 0).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_batched_ranges_and_counter() {
        let store = MemoryPointStore::from_records([ksfo(), egll()]).unwrap();
        let ranges = [
            CellRange::for_prefix(0, 1),
            CellRange::for_prefix(1, 1),
            CellRange::for_prefix(2, 1),
            CellRange::for_prefix(3, 1),
        ];
        let mut all = store.points_in_cell_ranges(&ranges, 0).unwrap();
        all.sort_by_key(|p| p.id);
        assert_eq!(all, vec![ksfo(), egll()]);
        assert_eq!(store.stats().range_queries, 4);
    }

    #[test]
    fn test_from_records_reports_bad_index() {
        let bad = PointRecord::new(3, GeoPoint::new(0, 181_000_000), 0);
        let err = MemoryPointStore::from_records([ksfo(), egll(), bad]).unwrap_err();
        assert!(matches!(err, SkyGridError::InvalidInput(ref msg) if msg.contains("index 2")));
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryPointStore::from_records([ksfo(), egll()]).unwrap();
        assert_eq!(store.remove(1), Some(ksfo()));
        assert_eq!(store.remove(1), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().occupied_cells, 1);

        store.clear();
        assert!(store.is_empty());
    }
}
