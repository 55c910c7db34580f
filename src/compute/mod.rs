//! Compute layer: cell encoding, coverage search and distance math.
//!
//! Everything here is pure and independent of where points are stored.

pub mod spatial;
pub mod validation;
