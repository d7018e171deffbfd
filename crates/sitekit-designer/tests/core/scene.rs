use std::sync::{Arc, Mutex};

use sitekit_core::{
    EventBus, EventCategory, EventFilter, SceneEvent, SceneKey, ValidationEvent,
};
use sitekit_designer::{EditEngine, Occupancy, Scene, ShapeKind};

use crate::common::{assert_close, at, rect, square};

fn scene_with_boundary() -> Scene {
    let mut scene = Scene::new(EventBus::shared());
    scene
        .set_boundary(rect(0.0, 0.0, 40.0, 25.0))
        .expect("boundary");
    scene
}

#[test]
fn test_boundary_is_protected_and_hidden_from_shapes() {
    let mut scene = scene_with_boundary();
    let boundary = scene.boundary_id().expect("boundary id");
    assert!(scene.is_protected(SceneKey::Shape(boundary)));
    assert_eq!(scene.shapes().count(), 0);

    let err = scene.remove(SceneKey::Shape(boundary)).unwrap_err();
    assert!(err.is_protection_error());
    assert!(scene.contains(SceneKey::Shape(boundary)));
}

#[test]
fn test_degenerate_boundary_rejected() {
    let mut scene = Scene::new(EventBus::shared());
    let line = vec![at(0.0, 0.0), at(10.0, 0.0), at(20.0, 0.0)];
    let err = scene.set_boundary(line).unwrap_err();
    assert!(err.is_geometry_error());
    assert!(scene.boundary().is_none());
}

#[test]
fn test_replacing_boundary_revalidates_shapes() {
    let mut scene = scene_with_boundary();
    let id = scene
        .add_shape(ShapeKind::polygon(), square(50.0, 5.0, 5.0))
        .expect("shape");
    assert_eq!(scene.violation_count(), 1);
    let boundary = scene.boundary_id();

    scene
        .set_boundary(rect(0.0, 0.0, 80.0, 25.0))
        .expect("larger boundary");
    assert_eq!(scene.boundary_id(), boundary);
    assert_eq!(scene.violation_count(), 0);
    assert!(!scene.shape(id).expect("shape").is_outside_boundary());
}

#[test]
fn test_protected_shape_cannot_be_removed_until_unprotected() {
    let mut scene = scene_with_boundary();
    let id = scene
        .add_shape(ShapeKind::polygon(), square(1.0, 1.0, 5.0))
        .expect("shape");
    let key = SceneKey::Shape(id);
    scene.set_protected(key, true).expect("protect");

    assert!(scene.remove(key).is_err());
    scene.set_protected(key, false).expect("unprotect");
    assert_eq!(scene.remove(key).expect("remove"), None);
    assert!(!scene.contains(key));
}

#[test]
fn test_remove_unknown_shape() {
    let mut scene = scene_with_boundary();
    let err = scene.remove(SceneKey::Shape(sitekit_core::ShapeId(999))).unwrap_err();
    assert!(!err.is_protection_error());
}

#[test]
fn test_violation_count_changes_by_one_per_flip() {
    let bus = EventBus::shared();
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = warnings.clone();
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Validation]),
        move |event| {
            if let SceneEvent::Validation(v) = event {
                sink.lock().unwrap().push(v.clone());
            }
        },
    );

    let mut scene = Scene::new(bus.clone());
    scene
        .set_boundary(rect(0.0, 0.0, 40.0, 25.0))
        .expect("boundary");
    let a = scene
        .add_shape(ShapeKind::polygon(), square(1.0, 1.0, 5.0))
        .expect("a");
    scene
        .add_shape(ShapeKind::polygon(), square(50.0, 1.0, 5.0))
        .expect("b");
    assert_eq!(scene.violation_count(), 1);
    assert_eq!(
        scene.violation_message().as_deref(),
        Some("1 shape is outside the site boundary")
    );

    let mut editor = EditEngine::new(bus);
    editor.start_edit(&scene, SceneKey::Shape(a)).expect("edit a");
    // Drag one corner out: the whole shape now violates
    editor.drag_vertex(&mut scene, 2, at(45.0, 6.0)).expect("drag out");
    assert_eq!(scene.violation_count(), 2);
    editor.drag_vertex(&mut scene, 2, at(6.0, 6.0)).expect("drag back");
    assert_eq!(scene.violation_count(), 1);

    let warnings = warnings.lock().unwrap();
    let flips = warnings
        .iter()
        .filter(|w| matches!(w, ValidationEvent::ContainmentChanged { .. }))
        .count();
    assert_eq!(flips, 3);
    assert!(warnings.contains(&ValidationEvent::BoundaryWarning {
        count: 2,
        message: "2 shapes are outside the site boundary".to_string(),
    }));
}

#[test]
fn test_removing_violator_clears_warning() {
    let mut scene = scene_with_boundary();
    let id = scene
        .add_shape(ShapeKind::polygon(), square(50.0, 1.0, 5.0))
        .expect("outside");
    assert_eq!(scene.violation_count(), 1);
    scene.remove(SceneKey::Shape(id)).expect("remove");
    assert_eq!(scene.violation_count(), 0);
    assert_eq!(scene.violation_message(), None);
}

#[test]
fn test_occupancy_is_cached_until_stale() {
    let mut scene = scene_with_boundary();
    assert!(scene.is_occupancy_stale());
    scene
        .add_shape(ShapeKind::polygon(), square(2.0, 2.0, 10.0))
        .expect("shape");

    let first = scene.occupancy().report().expect("computed").percentage;
    assert_close(first, 10.0, 1e-6);
    assert!(!scene.is_occupancy_stale());

    scene
        .add_shape(ShapeKind::polygon(), rect(20.0, 5.0, 30.0, 20.0))
        .expect("shape");
    assert!(scene.is_occupancy_stale());
    assert_close(scene.occupancy().report().expect("computed").percentage, 25.0, 1e-6);
}

#[test]
fn test_occupancy_not_computable_without_boundary() {
    let mut scene = Scene::new(EventBus::shared());
    scene
        .add_shape(ShapeKind::polygon(), square(0.0, 0.0, 10.0))
        .expect("shape");
    assert_eq!(scene.occupancy(), &Occupancy::NotComputable);
    // Without a boundary nothing is flagged
    assert_eq!(scene.violation_count(), 0);
}

#[test]
fn test_clear_drops_everything() {
    let mut scene = scene_with_boundary();
    scene
        .add_shape(ShapeKind::polygon(), square(50.0, 1.0, 5.0))
        .expect("shape");
    scene.add_object("tree", at(3.0, 3.0));
    scene.clear();
    assert!(scene.boundary().is_none());
    assert_eq!(scene.shape_count(), 0);
    assert_eq!(scene.object_count(), 0);
    assert_eq!(scene.violation_count(), 0);
}
