//! Quadrant cell encoding.
//!
//! The world rectangle is bisected [`MAX_LEVEL`] times. Every bisection picks
//! one of four quadrants and appends its 2-bit code to the cell id, so a cell id
//! is the path from the root to a leaf and ids sharing a prefix form one
//! contiguous integer range. That property is what lets an ordinary
//! single-column index answer 2-D area queries.
//!
//! Tie-breaking is fixed: a coordinate equal to a cell's centre belongs to the
//! south (or west) half. Cell ids persisted by earlier runs depend on this, so
//! the comparison operators here must not change.

use crate::compute::validation::validate_geo_point;
use crate::error::Result;
use skygrid_types::bbox::GeoRect;
use skygrid_types::point::GeoPoint;
use skygrid_types::{MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG};

/// Integer address of a leaf cell (or, as a prefix, of a subtree).
pub type CellId = u32;

/// Maximum subdivision depth: `floor(log4(i32::MAX))`.
pub const MAX_LEVEL: u8 = 15;

/// One past the largest leaf cell id (`4^MAX_LEVEL`).
pub const CELL_ID_LIMIT: u32 = 1 << (2 * MAX_LEVEL as u32);

/// One of the four subdivisions of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// All quadrants in code order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// The 2-bit code appended to a cell id.
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decode the low two bits of `bits`.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => Quadrant::NorthWest,
            1 => Quadrant::NorthEast,
            2 => Quadrant::SouthWest,
            _ => Quadrant::SouthEast,
        }
    }

    pub const fn is_north(self) -> bool {
        matches!(self, Quadrant::NorthWest | Quadrant::NorthEast)
    }

    pub const fn is_east(self) -> bool {
        matches!(self, Quadrant::NorthEast | Quadrant::SouthEast)
    }

    fn from_sides(north: bool, east: bool) -> Self {
        match (north, east) {
            (true, false) => Quadrant::NorthWest,
            (true, true) => Quadrant::NorthEast,
            (false, false) => Quadrant::SouthWest,
            (false, true) => Quadrant::SouthEast,
        }
    }
}

/// Edges of a cell during subdivision, in micro-degrees.
///
/// Shared by [`encode`] and the coverage solver so both narrow rectangles with
/// exactly the same arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellBounds {
    pub(crate) south: i64,
    pub(crate) north: i64,
    pub(crate) west: i64,
    pub(crate) east: i64,
}

impl CellBounds {
    pub(crate) const WORLD: CellBounds = CellBounds {
        south: MIN_LAT as i64,
        north: MAX_LAT as i64,
        west: MIN_LNG as i64,
        east: MAX_LNG as i64,
    };

    /// Centre latitude and longitude, rounded up.
    pub(crate) fn center(&self) -> (i64, i64) {
        (
            ceil_half(self.south + self.north),
            ceil_half(self.west + self.east),
        )
    }

    /// Quadrant a coordinate falls into. The centre itself is south/west.
    pub(crate) fn quadrant_of(&self, lat: i64, lng: i64) -> Quadrant {
        let (center_lat, center_lng) = self.center();
        Quadrant::from_sides(lat > center_lat, lng > center_lng)
    }

    pub(crate) fn child(&self, quadrant: Quadrant) -> CellBounds {
        let (center_lat, center_lng) = self.center();
        let (south, north) = if quadrant.is_north() {
            (center_lat, self.north)
        } else {
            (self.south, center_lat)
        };
        let (west, east) = if quadrant.is_east() {
            (center_lng, self.east)
        } else {
            (self.west, center_lng)
        };
        CellBounds {
            south,
            north,
            west,
            east,
        }
    }

    /// Inclusive latitude span of coordinates that encode into this cell.
    ///
    /// The shared southern edge belongs to the southern neighbour, except on
    /// the world's border where there is no neighbour.
    pub(crate) fn owned_lat(&self) -> (i64, i64) {
        let lo = if self.south == MIN_LAT as i64 {
            self.south
        } else {
            self.south + 1
        };
        (lo, self.north)
    }

    /// Inclusive longitude span of coordinates that encode into this cell.
    pub(crate) fn owned_lng(&self) -> (i64, i64) {
        let lo = if self.west == MIN_LNG as i64 {
            self.west
        } else {
            self.west + 1
        };
        (lo, self.east)
    }

    pub(crate) fn to_rect(self) -> GeoRect {
        GeoRect {
            south: self.south,
            north: self.north,
            west: self.west,
            east: self.east,
        }
    }
}

/// `ceil(sum / 2)` for signed values.
fn ceil_half(sum: i64) -> i64 {
    -((-sum).div_euclid(2))
}

/// Encode a coordinate into its leaf cell id.
///
/// Total over the coordinate domain. Coordinates outside it produce an
/// unspecified id; use [`encode_checked`] when the input is not trusted.
///
/// # Examples
///
/// ```
/// use skygrid::compute::spatial::cell::{encode, CELL_ID_LIMIT};
///
/// let id = encode(37_621_300, -122_379_000);
/// assert!(id < CELL_ID_LIMIT);
/// assert_eq!(id, encode(37_621_300, -122_379_000));
/// ```
pub fn encode(lat: i32, lng: i32) -> CellId {
    let (lat, lng) = (lat as i64, lng as i64);
    let mut bounds = CellBounds::WORLD;
    let mut id: CellId = 0;

    for _ in 0..MAX_LEVEL {
        let quadrant = bounds.quadrant_of(lat, lng);
        bounds = bounds.child(quadrant);
        id = id * 4 + quadrant.bits();
    }

    id
}

/// Encode a point after checking it lies inside the coordinate domain.
pub fn encode_checked(point: &GeoPoint) -> Result<CellId> {
    validate_geo_point(point)?;
    Ok(encode(point.lat(), point.lng()))
}

/// Rectangle covered by the cell with the given quadrant `prefix` at `level`.
///
/// `cell_bounds(encode(lat, lng), MAX_LEVEL)` is the leaf holding that
/// coordinate. Edges are shared with neighbours; see the module docs for which
/// side owns them.
///
/// # Panics
///
/// Panics if `level` exceeds [`MAX_LEVEL`].
pub fn cell_bounds(prefix: u32, level: u8) -> GeoRect {
    assert!(level <= MAX_LEVEL, "cell level must be at most {MAX_LEVEL}");

    let mut bounds = CellBounds::WORLD;
    for depth in (0..level).rev() {
        let quadrant = Quadrant::from_bits(prefix >> (2 * depth as u32));
        bounds = bounds.child(quadrant);
    }
    bounds.to_rect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_level_fits_i32() {
        assert_eq!(MAX_LEVEL, 15);
        assert_eq!(CELL_ID_LIMIT, 1 << 30);
        assert!(CELL_ID_LIMIT as u64 <= i32::MAX as u64);
        assert!(CELL_ID_LIMIT as u64 * 4 > i32::MAX as u64);
    }

    #[test]
    fn test_ceil_half() {
        assert_eq!(ceil_half(4), 2);
        assert_eq!(ceil_half(5), 3);
        assert_eq!(ceil_half(-5), -2);
        assert_eq!(ceil_half(-4), -2);
        assert_eq!(ceil_half(0), 0);
    }

    #[test]
    fn test_quadrant_bits() {
        for q in Quadrant::ALL {
            assert_eq!(Quadrant::from_bits(q.bits()), q);
        }
        assert!(Quadrant::NorthEast.is_north() && Quadrant::NorthEast.is_east());
        assert!(!Quadrant::SouthWest.is_north() && !Quadrant::SouthWest.is_east());
    }

    #[test]
    fn test_encode_corners() {
        // North-east corner: NE at every level.
        assert_eq!(encode(MAX_LAT, MAX_LNG), 0x1555_5555);
        // South-west corner: SW at every level.
        assert_eq!(encode(MIN_LAT, MIN_LNG), 0x2AAA_AAAA);
        // South-east corner.
        assert_eq!(encode(MIN_LAT, MAX_LNG), CELL_ID_LIMIT - 1);
        // North-west corner.
        assert_eq!(encode(MAX_LAT, MIN_LNG), 0);
    }

    #[test]
    fn test_centre_tie_breaks_south_west() {
        // One unit north/east of the centre lands in the north-east quadrant.
        assert_eq!(encode(1, 1) >> 28, Quadrant::NorthEast.bits());
        assert_eq!(encode(0, 1) >> 28, Quadrant::SouthEast.bits());
        assert_eq!(encode(1, 0) >> 28, Quadrant::NorthWest.bits());
        assert_eq!(encode(0, 0) >> 28, Quadrant::SouthWest.bits());
    }

    #[test]
    fn test_encode_deterministic() {
        let samples = [
            (37_621_300, -122_379_000),
            (51_470_000, -461_000),
            (-33_946_100, 151_177_200),
            (0, 0),
        ];
        for (lat, lng) in samples {
            assert_eq!(encode(lat, lng), encode(lat, lng));
        }
    }

    #[test]
    fn test_encode_checked_rejects_out_of_domain() {
        assert!(encode_checked(&GeoPoint::new(90_000_001, 0)).is_err());
        assert!(encode_checked(&GeoPoint::new(0, -180_000_001)).is_err());
        assert_eq!(
            encode_checked(&GeoPoint::new(1_000, 2_000)).unwrap(),
            encode(1_000, 2_000)
        );
    }

    #[test]
    fn test_leaf_bounds_contain_point() {
        let samples = [
            (37_621_300, -122_379_000),
            (-89_999_999, 179_999_999),
            (45_000_000, 90_000_000),
            (MIN_LAT, MIN_LNG),
            (MAX_LAT, MAX_LNG),
        ];
        for (lat, lng) in samples {
            let rect = cell_bounds(encode(lat, lng), MAX_LEVEL);
            assert!(
                rect.contains(&GeoPoint::new(lat, lng)),
                "({lat}, {lng}) not inside {rect:?}"
            );
        }
    }

    #[test]
    fn test_leaf_size_near_equator() {
        let rect = cell_bounds(encode(10, 10), MAX_LEVEL);
        // 360e6 / 2^15 ~ 10986 and 180e6 / 2^15 ~ 5493
        assert!((10_986..=10_987).contains(&rect.width()));
        assert!((5_493..=5_494).contains(&rect.height()));
    }

    #[test]
    fn test_root_bounds() {
        assert_eq!(cell_bounds(0, 0), GeoRect::world());
    }

    #[test]
    fn test_child_sizes_sum_to_parent() {
        let parent = CellBounds {
            south: -7,
            north: 8,
            west: 3,
            east: 10,
        };
        let nw = parent.child(Quadrant::NorthWest);
        let se = parent.child(Quadrant::SouthEast);
        assert_eq!(
            (nw.north - nw.south) + (se.north - se.south),
            parent.north - parent.south
        );
        assert_eq!(
            (nw.east - nw.west) + (se.east - se.west),
            parent.east - parent.west
        );
    }

    #[test]
    fn test_owned_spans_partition_parent() {
        let parent = CellBounds::WORLD.child(Quadrant::NorthEast);
        let north = parent.child(Quadrant::NorthEast).owned_lat();
        let south = parent.child(Quadrant::SouthEast).owned_lat();
        assert_eq!(south.1 + 1, north.0);
        assert_eq!(south.0, parent.owned_lat().0);
        assert_eq!(north.1, parent.owned_lat().1);
    }
}
