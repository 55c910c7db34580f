//! Area coverage search over the quadrant cell tree.
//!
//! Turns a query rectangle into a small set of cell-id ranges whose union
//! contains every point of the rectangle. Each range is one subtree of the cell
//! tree, so a point store indexed on cell id answers it with a single range
//! scan.
//!
//! ## Algorithm
//!
//! ```text
//! queue <- [root]
//! while let Some(cell) = queue.pop_front():
//!     check cancellation
//!     coverage = |cell ∩ rect| / |cell|
//!     coverage == 0                         -> drop
//!     level == MAX_LEVEL || coverage >= τ   -> emit cell's range
//!     otherwise                             -> push NW, NE, SW, SE
//! ```
//!
//! Areas are counted on the integer lattice of coordinates each cell actually
//! owns under the encoder's tie-breaking. A cell is dropped only when no
//! representable point of the rectangle encodes into it, which makes the
//! result sound even for points lying exactly on cell edges and for
//! zero-width rectangles.
//!
//! ## Threshold
//!
//! | τ    | Behaviour |
//! |------|-----------|
//! | 0.0  | stops at the root: one range spanning every cell |
//! | 0.7  | default, a handful of ranges for a typical radius query |
//! | 1.0  | only fully covered cells stop early, boundary descends to leaves |

use super::cell::{CELL_ID_LIMIT, CellBounds, CellId, MAX_LEVEL, Quadrant};
use crate::compute::validation::validate_coverage_threshold;
use crate::error::{Result, SkyGridError};
use skygrid_types::bbox::GeoRect;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default fraction of a cell that must be covered before the search stops
/// subdividing it.
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 0.7;

/// Half-open interval `[min, max)` of cell ids forming one subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRange {
    pub min: CellId,
    pub max: CellId,
}

impl CellRange {
    /// Range of the subtree rooted at quadrant `prefix` on `level`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skygrid::compute::spatial::coverage::CellRange;
    ///
    /// let root = CellRange::for_prefix(0, 0);
    /// assert_eq!((root.min, root.max), (0, 1 << 30));
    ///
    /// let ne = CellRange::for_prefix(1, 1);
    /// assert_eq!((ne.min, ne.max), (1 << 28, 2 << 28));
    /// ```
    pub fn for_prefix(prefix: u32, level: u8) -> Self {
        debug_assert!(level <= MAX_LEVEL);
        let shift = 2 * (MAX_LEVEL - level) as u32;
        Self {
            min: prefix << shift,
            max: (prefix + 1) << shift,
        }
    }

    pub fn contains(&self, cell: CellId) -> bool {
        (self.min..self.max).contains(&cell)
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.min < other.max && other.min < self.max
    }

    /// Number of leaf cells in the range.
    pub fn len(&self) -> u32 {
        self.max - self.min
    }

    pub fn is_empty(&self) -> bool {
        self.max <= self.min
    }
}

/// Shared flag used to stop a running coverage search.
///
/// Clones observe the same flag, so one clone can be handed to another
/// thread and cancelled there.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Counters from one coverage search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageStats {
    /// Cells taken off the work queue
    pub cells_visited: usize,
    /// Ranges in the result
    pub ranges_emitted: usize,
    /// Deepest level at which a range was emitted
    pub deepest_level: u8,
}

/// A cell under consideration. Lives only for one search.
#[derive(Debug, Clone, Copy)]
struct PartialCell {
    level: u8,
    prefix: u32,
    bounds: CellBounds,
}

impl PartialCell {
    fn root() -> Self {
        Self {
            level: 0,
            prefix: 0,
            bounds: CellBounds::WORLD,
        }
    }

    fn range(&self) -> CellRange {
        CellRange::for_prefix(self.prefix, self.level)
    }

    fn children(&self) -> [PartialCell; 4] {
        Quadrant::ALL.map(|quadrant| PartialCell {
            level: self.level + 1,
            prefix: self.prefix * 4 + quadrant.bits(),
            bounds: self.bounds.child(quadrant),
        })
    }

    /// Fraction of the cell's lattice points that fall inside `rect`.
    fn coverage(&self, rect: &GeoRect) -> f64 {
        let lat = self.bounds.owned_lat();
        let lng = self.bounds.owned_lng();

        let lat_overlap = span_overlap(lat, (rect.south, rect.north));
        let lng_overlap = span_overlap(lng, (rect.west, rect.east));
        if lat_overlap == 0 || lng_overlap == 0 {
            return 0.0;
        }

        let height = (lat.1 - lat.0 + 1) as f64;
        let width = (lng.1 - lng.0 + 1) as f64;
        (lat_overlap as f64 * lng_overlap as f64) / (height * width)
    }
}

/// Number of integers shared by two inclusive spans, zero when disjoint.
///
/// Endpoints of each span may be given in either order.
fn span_overlap(a: (i64, i64), b: (i64, i64)) -> i64 {
    let (a_start, a_end) = (a.0.min(a.1), a.0.max(a.1));
    let (b_start, b_end) = (b.0.min(b.1), b.0.max(b.1));
    (a_end.min(b_end) - a_start.max(b_start) + 1).max(0)
}

/// Breadth-first coverage search with a fixed threshold.
///
/// The solver holds no state between calls; one instance may be shared by
/// any number of threads.
///
/// # Examples
///
/// ```rust
/// use skygrid::compute::spatial::coverage::AreaCoverageSolver;
/// use skygrid::GeoRect;
///
/// let solver = AreaCoverageSolver::default();
///
/// let world = solver.cover(&GeoRect::world()).unwrap();
/// assert_eq!(world.len(), 1);
/// assert_eq!((world[0].min, world[0].max), (0, 1 << 30));
///
/// // ~20km square around San Francisco International
/// let rect = GeoRect::new(37_531_000, 37_711_000, -122_492_000, -122_266_000);
/// let ranges = solver.cover(&rect).unwrap();
/// assert!(!ranges.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AreaCoverageSolver {
    threshold: f64,
}

impl AreaCoverageSolver {
    /// Create a solver with coverage threshold `threshold` in `[0, 1]`.
    pub fn new(threshold: f64) -> Result<Self> {
        validate_coverage_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Cover `rect` with disjoint cell ranges, sorted by `min`.
    pub fn cover(&self, rect: &GeoRect) -> Result<Vec<CellRange>> {
        self.run(rect, None).map(|(ranges, _)| ranges)
    }

    /// Like [`cover`](Self::cover), checking `cancel` before each cell.
    ///
    /// Returns [`SkyGridError::Aborted`] once the token is cancelled; a partial
    /// range list is never returned.
    pub fn cover_cancellable(
        &self,
        rect: &GeoRect,
        cancel: &CancellationToken,
    ) -> Result<Vec<CellRange>> {
        self.run(rect, Some(cancel)).map(|(ranges, _)| ranges)
    }

    /// Cover `rect` and report search counters alongside the ranges.
    pub fn cover_with_stats(
        &self,
        rect: &GeoRect,
        cancel: Option<&CancellationToken>,
    ) -> Result<(Vec<CellRange>, CoverageStats)> {
        self.run(rect, cancel)
    }

    fn run(
        &self,
        rect: &GeoRect,
        cancel: Option<&CancellationToken>,
    ) -> Result<(Vec<CellRange>, CoverageStats)> {
        self.run_until(rect, |_| cancel.is_some_and(CancellationToken::is_cancelled))
    }

    /// Search loop; `stop` is polled before every dequeued cell.
    fn run_until<F>(
        &self,
        rect: &GeoRect,
        mut stop: F,
    ) -> Result<(Vec<CellRange>, CoverageStats)>
    where
        F: FnMut(&CoverageStats) -> bool,
    {
        let mut queue = VecDeque::from([PartialCell::root()]);
        let mut ranges = Vec::new();
        let mut stats = CoverageStats::default();

        while let Some(cell) = queue.pop_front() {
            if stop(&stats) {
                log::debug!(
                    "Coverage search aborted after {} cells",
                    stats.cells_visited
                );
                return Err(SkyGridError::Aborted);
            }
            stats.cells_visited += 1;

            let coverage = cell.coverage(rect);
            if coverage == 0.0 {
                continue;
            }

            if cell.level == MAX_LEVEL || coverage >= self.threshold {
                ranges.push(cell.range());
                stats.deepest_level = stats.deepest_level.max(cell.level);
                continue;
            }

            queue.extend(cell.children());
        }

        ranges.sort_unstable();
        stats.ranges_emitted = ranges.len();

        log::trace!(
            "Covered {:?} with {} ranges ({} cells visited, deepest level {})",
            rect,
            stats.ranges_emitted,
            stats.cells_visited,
            stats.deepest_level
        );
        debug_assert!(ranges.iter().all(|r| r.max <= CELL_ID_LIMIT));

        Ok((ranges, stats))
    }
}

impl Default for AreaCoverageSolver {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_COVERAGE_THRESHOLD,
        }
    }
}
