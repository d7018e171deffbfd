use nalgebra::Vector3;
use sitekit_core::{GeometryError, ObjectId};
use sitekit_designer::{ObjectTransform, PlacedObject};

use crate::common::{assert_close, at, local, plane};

#[test]
fn test_new_object_has_identity_orientation() {
    let object = PlacedObject::new(ObjectId(1), "tree.oak", at(5.0, 5.0));
    assert_eq!(object.heading(), 0.0);
    assert_eq!(object.scale(), 1.0);
    assert_eq!(object.category(), "unassigned");
    assert!(object.position().approx_eq(&at(5.0, 5.0), 1e-9));
}

#[test]
fn test_moving_keeps_heading_and_scale() {
    let transform = ObjectTransform::with(at(0.0, 0.0), 30.0, 2.0).expect("valid transform");
    let mut object = PlacedObject::with_transform(ObjectId(7), "bench", transform);
    object.set_position(at(12.0, -4.0));

    assert_close(object.heading(), 30.0, 1e-9);
    assert_close(object.scale(), 2.0, 1e-12);
    let origin = object.transform().transform_point(&Vector3::zeros());
    let p = local(&origin);
    assert_close(p.x, 12.0, 1e-6);
    assert_close(p.y, -4.0, 1e-6);
}

#[test]
fn test_counterclockwise_rotation_wraps() {
    let mut object = PlacedObject::new(ObjectId(1), "kiosk", at(0.0, 0.0));
    object.rotate(-90.0);
    assert_close(object.heading(), 270.0, 1e-9);
    object.rotate(-300.0);
    assert_close(object.heading(), 330.0, 1e-9);
}

#[test]
fn test_model_axes_follow_heading_and_scale() {
    let origin = at(0.0, 0.0);
    let transform = ObjectTransform::with(origin, 180.0, 2.0).expect("valid transform");

    // Facing south: model north lands 2 m south of the origin
    let tip = transform.transform_point(&Vector3::new(0.0, 1.0, 0.0));
    let enu = plane().to_local3(&tip);
    assert!((enu - Vector3::new(0.0, -2.0, 0.0)).norm() < 1e-5);
}

#[test]
fn test_rejected_scale_leaves_object_unchanged() {
    let mut object = PlacedObject::new(ObjectId(1), "tree", at(0.0, 0.0));
    object.set_scale(1.5).expect("valid scale");
    assert!(matches!(
        object.set_scale(-2.0),
        Err(GeometryError::InvalidScale(_))
    ));
    assert!(object.set_scale(f64::INFINITY).is_err());
    assert_close(object.scale(), 1.5, 1e-12);
}

#[test]
fn test_non_finite_heading_rejected() {
    assert!(matches!(
        ObjectTransform::with(at(0.0, 0.0), f64::NAN, 1.0),
        Err(GeometryError::NonFinite(_))
    ));
}
