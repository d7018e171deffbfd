use sitekit_core::{Geodetic, Position, SceneKey, ShapeId};

#[test]
fn test_geodetic_round_trip() {
    let geo = Geodetic::new(-73.9857, 40.7484, 381.0);
    let back = Position::from_geodetic(&geo).to_geodetic();
    assert!((back.longitude - geo.longitude).abs() < 1e-9);
    assert!((back.latitude - geo.latitude).abs() < 1e-9);
    assert!((back.height - geo.height).abs() < 1e-4);
}

#[test]
fn test_equator_prime_meridian() {
    let p = Position::from_degrees(0.0, 0.0, 0.0);
    assert!((p.x - 6_378_137.0).abs() < 1e-6);
    assert!(p.y.abs() < 1e-6);
    assert!(p.z.abs() < 1e-6);
}

#[test]
fn test_offset_and_distance() {
    let a = Position::from_degrees(2.35, 48.85, 35.0);
    let b = a.offset_by(&nalgebra::Vector3::new(3.0, 4.0, 0.0));
    assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    assert!((b.delta_from(&a).norm() - 5.0).abs() < 1e-9);
}

#[test]
fn test_centroid() {
    assert_eq!(Position::centroid(&[]), None);
    let c = Position::centroid(&[Position::new(0.0, 0.0, 0.0), Position::new(2.0, 4.0, 6.0)])
        .expect("centroid");
    assert!(c.approx_eq(&Position::new(1.0, 2.0, 3.0), 1e-12));
}

#[test]
fn test_scene_key_accessors() {
    let key = SceneKey::Shape(ShapeId(4));
    assert_eq!(key.shape(), Some(ShapeId(4)));
    assert_eq!(key.object(), None);
}
