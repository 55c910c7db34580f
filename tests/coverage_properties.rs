//! Property tests for cell encoding and area coverage.

use proptest::prelude::*;
use skygrid::compute::spatial::cell::cell_bounds;
use skygrid::{AreaCoverageSolver, CELL_ID_LIMIT, CellRange, GeoPoint, GeoRect, MAX_LEVEL, encode};

fn covered(ranges: &[CellRange], lat: i64, lng: i64) -> bool {
    let id = encode(lat as i32, lng as i32);
    ranges.iter().any(|r| r.contains(id))
}

fn rect_strategy() -> impl Strategy<Value = GeoRect> {
    (
        -89_000_000i64..89_000_000,
        -179_000_000i64..179_000_000,
        0i64..2_000_000,
        0i64..2_000_000,
    )
        .prop_map(|(lat, lng, half_h, half_w)| {
            GeoRect::new(lat - half_h, lat + half_h, lng - half_w, lng + half_w)
        })
}

fn clamp_lat(v: i64) -> i64 {
    v.clamp(-90_000_000, 90_000_000)
}

fn clamp_lng(v: i64) -> i64 {
    v.clamp(-180_000_000, 180_000_000)
}

proptest! {
    #[test]
    fn prop_encode_deterministic_and_bounded(
        lat in -90_000_000i32..=90_000_000,
        lng in -180_000_000i32..=180_000_000,
    ) {
        let id = encode(lat, lng);
        prop_assert_eq!(id, encode(lat, lng));
        prop_assert!(id < CELL_ID_LIMIT);
        prop_assert!(cell_bounds(id, MAX_LEVEL).contains(&GeoPoint::new(lat, lng)));
    }

    #[test]
    fn prop_cover_is_sound(
        rect in rect_strategy(),
        threshold in 0.0f64..=1.0,
        fractions in prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0), 1..32),
    ) {
        let ranges = AreaCoverageSolver::new(threshold).unwrap().cover(&rect).unwrap();

        // Corners and edge midpoints hit cell boundaries most often.
        let mid_lat = rect.south + rect.height() / 2;
        let mid_lng = rect.west + rect.width() / 2;
        let fixed = [
            (rect.south, rect.west),
            (rect.south, rect.east),
            (rect.north, rect.west),
            (rect.north, rect.east),
            (mid_lat, rect.west),
            (mid_lat, rect.east),
            (rect.south, mid_lng),
            (rect.north, mid_lng),
        ];
        for (lat, lng) in fixed {
            prop_assert!(covered(&ranges, clamp_lat(lat), clamp_lng(lng)));
        }

        for (fy, fx) in fractions {
            let lat = rect.south + (rect.height() as f64 * fy).round() as i64;
            let lng = rect.west + (rect.width() as f64 * fx).round() as i64;
            prop_assert!(covered(&ranges, clamp_lat(lat), clamp_lng(lng)));
        }
    }

    #[test]
    fn prop_cover_ranges_disjoint_and_aligned(
        rect in rect_strategy(),
        threshold in 0.0f64..=1.0,
    ) {
        let ranges = AreaCoverageSolver::new(threshold).unwrap().cover(&rect).unwrap();
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].max <= pair[1].min);
        }
        for r in &ranges {
            prop_assert!(r.max <= CELL_ID_LIMIT);
            // Each range is one subtree: a power-of-four length, aligned to it.
            let len = r.len();
            prop_assert!(len.is_power_of_two() && len.trailing_zeros() % 2 == 0);
            prop_assert_eq!(r.min % len, 0);
        }
    }

    #[test]
    fn prop_cell_aligned_rect_is_sound(
        lat in -89_000_000i32..89_000_000,
        lng in -179_000_000i32..179_000_000,
        level in 1u8..=MAX_LEVEL,
    ) {
        // A rectangle whose edges coincide exactly with a cell's edges.
        let leaf = encode(lat, lng);
        let prefix = leaf >> (2 * (MAX_LEVEL - level) as u32);
        let rect = cell_bounds(prefix, level);
        let ranges = AreaCoverageSolver::default().cover(&rect).unwrap();

        for (lat, lng) in [
            (rect.south, rect.west),
            (rect.north, rect.east),
            (rect.south, rect.east),
            (rect.north, rect.west),
        ] {
            prop_assert!(covered(&ranges, lat, lng));
        }
    }
}

#[test]
fn test_world_cover_is_single_range() {
    let ranges = AreaCoverageSolver::default().cover(&GeoRect::world()).unwrap();
    assert_eq!(ranges, vec![CellRange { min: 0, max: 1 << 30 }]);
}
