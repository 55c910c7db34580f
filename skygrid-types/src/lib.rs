//! # skygrid-types
//!
//! Value types shared by the SkyGrid spatial directory and the processes that
//! populate its point store.
//!
//! - **Point type**: `GeoPoint`, a latitude/longitude pair in fixed-point
//!   micro-degrees (degrees × 1e6)
//! - **Rectangle type**: `GeoRect`, a closed rectangle in the same unit
//!
//! Fixed-point coordinates keep cell-id assignment bit-exact across machines.
//! Both types convert to the `geo` crate's primitives for distance math.
//!
//! ## Examples
//!
//! ```rust
//! use skygrid_types::point::GeoPoint;
//! use skygrid_types::bbox::GeoRect;
//!
//! let ksfo = GeoPoint::from_degrees(37.6213, -122.379);
//! assert_eq!(ksfo.lat(), 37_621_300);
//!
//! let rect = GeoRect::around(ksfo, 50_000);
//! assert!(rect.contains(&ksfo));
//! ```

pub mod bbox;
pub mod point;

/// Fixed-point units per degree.
pub const MICRODEGREES_PER_DEGREE: f64 = 1e6;

/// Southern limit of the coordinate domain, in micro-degrees.
pub const MIN_LAT: i32 = -90_000_000;
/// Northern limit of the coordinate domain, in micro-degrees.
pub const MAX_LAT: i32 = 90_000_000;
/// Western limit of the coordinate domain, in micro-degrees.
pub const MIN_LNG: i32 = -180_000_000;
/// Eastern limit of the coordinate domain, in micro-degrees.
pub const MAX_LNG: i32 = 180_000_000;
