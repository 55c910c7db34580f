pub mod cell;
pub use cell::{CELL_ID_LIMIT, CellId, MAX_LEVEL, Quadrant, cell_bounds, encode, encode_checked};

pub mod coverage;
pub use coverage::{
    AreaCoverageSolver, CancellationToken, CellRange, CoverageStats, DEFAULT_COVERAGE_THRESHOLD,
};

pub mod distance;
pub use distance::{bounding_rect, haversine_distance, radius_to_half_width};
