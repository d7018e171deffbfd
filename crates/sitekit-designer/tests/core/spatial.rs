use sitekit_core::Position;
use sitekit_designer::spatial::{
    closest_point_on_segment, closest_point_on_segment_2d, point_in_polygon, polygon_area,
    project_to_local_plane, volume,
};
use sitekit_designer::LocalPoint;

use crate::common::{assert_close, at, local, square};

fn unit_square() -> Vec<LocalPoint> {
    vec![
        LocalPoint::new(0.0, 0.0),
        LocalPoint::new(1.0, 0.0),
        LocalPoint::new(1.0, 1.0),
        LocalPoint::new(0.0, 1.0),
    ]
}

#[test]
fn test_ten_meter_square_area() {
    let (_, points) = project_to_local_plane(&square(0.0, 0.0, 10.0), None);
    assert_close(polygon_area(&points), 100.0, 1e-6);
}

#[test]
fn test_area_independent_of_winding() {
    let mut vertices = square(3.0, -7.0, 10.0);
    vertices.reverse();
    let (_, points) = project_to_local_plane(&vertices, None);
    assert_close(polygon_area(&points), 100.0, 1e-6);
}

#[test]
fn test_area_needs_three_points() {
    let points = unit_square();
    assert_eq!(polygon_area(&points[..2]), 0.0);
    assert_eq!(polygon_area(&[]), 0.0);
}

#[test]
fn test_projection_anchored_at_centroid() {
    let vertices = square(100.0, 100.0, 10.0);
    let (plane, points) = project_to_local_plane(&vertices, None);
    let centroid = points
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x / 4.0, y + p.y / 4.0));
    assert_close(centroid.0, 0.0, 1e-6);
    assert_close(centroid.1, 0.0, 1e-6);
    assert_close(plane.origin().distance_to(&at(105.0, 105.0)), 0.0, 1e-3);
}

#[test]
fn test_projection_with_origin_hint() {
    let hint = at(0.0, 0.0);
    let (plane, points) = project_to_local_plane(&square(0.0, 0.0, 10.0), Some(hint));
    assert_eq!(plane.origin(), hint);
    assert_close(points[2].x, 10.0, 1e-6);
    assert_close(points[2].y, 10.0, 1e-6);
}

#[test]
fn test_volume_requires_height() {
    assert_eq!(volume(100.0, Some(3.0)), Some(300.0));
    assert_eq!(volume(100.0, None), None);
}

#[test]
fn test_point_in_unit_square() {
    let polygon = unit_square();
    assert!(point_in_polygon(&LocalPoint::new(0.5, 0.5), &polygon));
    assert!(!point_in_polygon(&LocalPoint::new(1.5, 0.5), &polygon));
    assert!(!point_in_polygon(&LocalPoint::new(-0.1, 0.5), &polygon));
    assert!(!point_in_polygon(&LocalPoint::new(0.5, 1.5), &polygon));
}

#[test]
fn test_point_in_polygon_edge_convention() {
    let polygon = unit_square();
    // Left and bottom edges are inside, right and top edges outside.
    assert!(point_in_polygon(&LocalPoint::new(0.0, 0.5), &polygon));
    assert!(point_in_polygon(&LocalPoint::new(0.5, 0.0), &polygon));
    assert!(!point_in_polygon(&LocalPoint::new(1.0, 0.5), &polygon));
    assert!(!point_in_polygon(&LocalPoint::new(0.5, 1.0), &polygon));
}

#[test]
fn test_point_in_concave_polygon() {
    // U shape opening north
    let polygon = vec![
        LocalPoint::new(0.0, 0.0),
        LocalPoint::new(3.0, 0.0),
        LocalPoint::new(3.0, 3.0),
        LocalPoint::new(2.0, 3.0),
        LocalPoint::new(2.0, 1.0),
        LocalPoint::new(1.0, 1.0),
        LocalPoint::new(1.0, 3.0),
        LocalPoint::new(0.0, 3.0),
    ];
    assert!(point_in_polygon(&LocalPoint::new(0.5, 2.0), &polygon));
    assert!(!point_in_polygon(&LocalPoint::new(1.5, 2.0), &polygon));
    assert!(point_in_polygon(&LocalPoint::new(1.5, 0.5), &polygon));
}

#[test]
fn test_closest_point_clamped() {
    let a = LocalPoint::new(0.0, 0.0);
    let b = LocalPoint::new(10.0, 0.0);
    assert_eq!(
        closest_point_on_segment_2d(&a, &b, &LocalPoint::new(4.0, 3.0)),
        LocalPoint::new(4.0, 0.0)
    );
    assert_eq!(closest_point_on_segment_2d(&a, &b, &LocalPoint::new(-5.0, 1.0)), a);
    assert_eq!(closest_point_on_segment_2d(&a, &b, &LocalPoint::new(15.0, 1.0)), b);
}

#[test]
fn test_closest_point_on_global_segment() {
    let p = closest_point_on_segment(&at(0.0, 0.0), &at(10.0, 0.0), &at(6.0, 2.0));
    let l = local(&p);
    assert_close(l.x, 6.0, 1e-6);
    assert_close(l.y, 0.0, 1e-6);
}

#[test]
fn test_degenerate_segment() {
    let a = Position::from_degrees(10.0, 10.0, 0.0);
    assert_eq!(closest_point_on_segment(&a, &a, &at(1.0, 1.0)), a);
}
