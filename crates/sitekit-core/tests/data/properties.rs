use nalgebra::Vector3;
use proptest::prelude::*;
use sitekit_core::{Geodetic, Position};

proptest! {
    #[test]
    fn geodetic_round_trip(
        lon in -179.9f64..179.9,
        lat in -85.0f64..85.0,
        height in -500.0f64..9000.0,
    ) {
        let back = Position::from_geodetic(&Geodetic::new(lon, lat, height)).to_geodetic();
        prop_assert!((back.longitude - lon).abs() < 1e-7);
        prop_assert!((back.latitude - lat).abs() < 1e-7);
        prop_assert!((back.height - height).abs() < 1e-3);
    }

    #[test]
    fn offset_distance_is_offset_length(
        lon in -179.9f64..179.9,
        lat in -85.0f64..85.0,
        dx in -1e3f64..1e3,
        dy in -1e3f64..1e3,
        dz in -1e2f64..1e2,
    ) {
        let a = Position::from_degrees(lon, lat, 0.0);
        let offset = Vector3::new(dx, dy, dz);
        let b = a.offset_by(&offset);
        prop_assert!((a.distance_to(&b) - offset.norm()).abs() < 1e-6);
    }

    #[test]
    fn centroid_follows_translation(
        points in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3, -1e3f64..1e3), 1..16),
        dx in -1e3f64..1e3,
        dy in -1e3f64..1e3,
    ) {
        let base = Position::from_degrees(11.97, 57.7, 0.0);
        let positions: Vec<Position> = points
            .iter()
            .map(|&(x, y, z)| base.offset_by(&Vector3::new(x, y, z)))
            .collect();
        let shift = Vector3::new(dx, dy, 0.0);
        let shifted: Vec<Position> = positions.iter().map(|p| p.offset_by(&shift)).collect();

        let c = Position::centroid(&positions).expect("non-empty");
        let c_shifted = Position::centroid(&shifted).expect("non-empty");
        prop_assert!(c.offset_by(&shift).approx_eq(&c_shifted, 1e-6));
    }
}
