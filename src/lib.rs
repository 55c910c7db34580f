//! Cell-indexed spatial directory for moving-map "what is near me" queries.
//!
//! Points live in an external store indexed only by an integer cell id. The
//! directory turns a radius query into a few contiguous cell-id ranges, fetches
//! the candidates and keeps those within true great-circle distance.
//!
//! ```rust
//! use skygrid::{GeoPoint, MemoryPointStore, PointRecord, SpatialDirectory};
//!
//! let mut store = MemoryPointStore::new();
//! store.insert(PointRecord::new(1, GeoPoint::new(37_621_300, -122_379_000), 5))?;
//!
//! let directory = SpatialDirectory::new(store);
//! let nearby = directory.points_within_radius(GeoPoint::new(37_621_300, -122_379_000), 10_000.0, 0)?;
//! assert_eq!(nearby[0].point.id, 1);
//! # Ok::<(), skygrid::SkyGridError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod directory;
pub mod error;
pub mod store;

pub use builder::DirectoryBuilder;
pub use config::DirectoryConfig;
pub use directory::{DirectoryStats, NearbyPoint, SpatialDirectory};
pub use error::{Result, SkyGridError};

pub use compute::spatial::{
    AreaCoverageSolver, CELL_ID_LIMIT, CancellationToken, CellId, CellRange, MAX_LEVEL, encode,
    encode_checked,
};

pub use skygrid_types::bbox::GeoRect;
pub use skygrid_types::point::GeoPoint;

pub use store::{MemoryPointStore, PointRecord, PointStore, StoreStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{DirectoryBuilder, DirectoryConfig, Result, SkyGridError, SpatialDirectory};

    pub use crate::{GeoPoint, GeoRect};

    pub use crate::{CancellationToken, CellRange, NearbyPoint};

    pub use crate::{MemoryPointStore, PointRecord, PointStore};
}
