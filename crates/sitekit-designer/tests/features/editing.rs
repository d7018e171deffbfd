use std::sync::{Arc, Mutex};

use nalgebra::Vector3;

use sitekit_core::{
    EditError, EditEvent, Error, EventBus, EventCategory, EventFilter, GeometryError, SceneEvent,
    SceneKey,
};
use sitekit_designer::{EditEngine, EditMode, PlanViewport, Scene, ShapeKind};

use crate::common::{assert_close, at, local, rect, square};

struct Fixture {
    scene: Scene,
    editor: EditEngine,
    square: SceneKey,
}

/// Scene with a 40 × 25 m boundary and a 10 m square at the south-west corner
fn fixture() -> Fixture {
    let bus = EventBus::shared();
    let mut scene = Scene::new(bus.clone());
    scene
        .set_boundary(rect(-5.0, -5.0, 35.0, 20.0))
        .expect("boundary");
    let id = scene
        .add_shape(ShapeKind::polygon(), square(0.0, 0.0, 10.0))
        .expect("square");
    Fixture {
        scene,
        editor: EditEngine::new(bus),
        square: SceneKey::Shape(id),
    }
}

fn editing(mut f: Fixture) -> Fixture {
    f.editor.start_edit(&f.scene, f.square).expect("start edit");
    f
}

fn viewport() -> PlanViewport {
    let mut viewport = PlanViewport::new(at(0.0, 0.0), 800.0, 600.0);
    viewport.set_zoom(10.0);
    viewport
}

fn shape_area(f: &Fixture) -> f64 {
    let SceneKey::Shape(id) = f.square else {
        unreachable!("fixture target is a shape")
    };
    f.scene.shape(id).expect("shape").area()
}

#[test]
fn test_boundary_opens_read_only() {
    let mut f = fixture();
    let boundary = SceneKey::Shape(f.scene.boundary_id().expect("boundary"));
    f.editor.start_edit(&f.scene, boundary).expect("read-only session");

    let session = f.editor.session().expect("session");
    assert!(session.read_only);
    assert!(f.editor.handles().is_empty());

    let err = f.editor.rotate(&mut f.scene, 10.0).unwrap_err();
    assert!(matches!(err, Error::Edit(EditError::ReadOnly { .. })));
    assert_eq!(f.editor.stop_edit(&mut f.scene), None);
}

#[test]
fn test_protected_shape_opens_read_only() {
    let mut f = fixture();
    f.scene.set_protected(f.square, true).expect("protect");
    let area = shape_area(&f);
    f.editor.start_edit(&f.scene, f.square).expect("read-only session");

    assert!(f.editor.session().expect("session").read_only);
    assert!(f.editor.handles().is_empty());

    let err = f
        .editor
        .move_whole(&mut f.scene, &Vector3::new(1.0, 0.0, 0.0))
        .unwrap_err();
    assert!(err.is_protection_error());
    let err = f.editor.delete_vertex(&mut f.scene, 0).unwrap_err();
    assert!(err.is_protection_error());
    let err = f.editor.rotate(&mut f.scene, 15.0).unwrap_err();
    assert!(err.is_protection_error());

    assert_close(shape_area(&f), area, 1e-9);
    let SceneKey::Shape(id) = f.square else {
        unreachable!("fixture target is a shape")
    };
    assert_eq!(f.scene.shape(id).expect("shape").vertex_count(), 4);
    assert_eq!(f.editor.stop_edit(&mut f.scene), None);
}

#[test]
fn test_second_target_rejected_while_editing() {
    let mut f = editing(fixture());
    let other = f
        .scene
        .add_shape(ShapeKind::polygon(), square(20.0, 0.0, 5.0))
        .expect("other");

    let err = f
        .editor
        .start_edit(&f.scene, SceneKey::Shape(other))
        .unwrap_err();
    assert!(matches!(err, Error::Edit(EditError::SessionActive { current }) if current == f.square));
    // Re-selecting the same target is harmless
    f.editor.start_edit(&f.scene, f.square).expect("same target");
    assert_eq!(f.editor.target(), Some(f.square));
}

#[test]
fn test_operations_need_a_session() {
    let mut f = fixture();
    let err = f.editor.delete_vertex(&mut f.scene, 0).unwrap_err();
    assert!(matches!(err, Error::Edit(EditError::NoSession)));
}

#[test]
fn test_insert_on_nearest_edge() {
    let mut f = editing(fixture());
    let viewport = viewport();
    let pointer = at(5.0, -0.5);
    let screen = viewport.world_to_pixel(&pointer);

    let index = f
        .editor
        .insert_vertex_nearest_edge(&mut f.scene, &pointer, screen, &viewport)
        .expect("insert");
    assert_eq!(index, 1);
    assert_eq!(f.editor.handles().len(), 5);

    let inserted = local(&f.editor.handles()[1].position);
    assert_close(inserted.x, 5.0, 1e-4);
    assert_close(inserted.y, 0.0, 1e-4);
    assert_close(shape_area(&f), 100.0, 1e-3);
}

#[test]
fn test_insert_tie_goes_to_first_edge() {
    let mut f = editing(fixture());
    let viewport = viewport();
    // Equidistant from the bottom edge (0) and the closing edge (3)
    let pointer = at(-0.3, -0.3);
    let screen = viewport.world_to_pixel(&pointer);

    let index = f
        .editor
        .insert_vertex_nearest_edge(&mut f.scene, &pointer, screen, &viewport)
        .expect("insert");
    assert_eq!(index, 1);
}

#[test]
fn test_insert_on_closing_edge_appends() {
    let mut f = editing(fixture());
    let viewport = viewport();
    let pointer = at(-0.5, 5.0);
    let screen = viewport.world_to_pixel(&pointer);

    let index = f
        .editor
        .insert_vertex_nearest_edge(&mut f.scene, &pointer, screen, &viewport)
        .expect("insert");
    assert_eq!(index, 4);
    let appended = local(&f.editor.handles()[4].position);
    assert_close(appended.x, 0.0, 1e-4);
    assert_close(appended.y, 5.0, 1e-4);
}

#[test]
fn test_insert_rejected_outside_tolerance() {
    let mut f = editing(fixture());
    let viewport = viewport();
    // Centre of the square: 5 m = 50 px from every edge
    let pointer = at(5.0, 5.0);
    let screen = viewport.world_to_pixel(&pointer);

    let err = f
        .editor
        .insert_vertex_nearest_edge(&mut f.scene, &pointer, screen, &viewport)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Geometry(GeometryError::NoEdgeWithinTolerance { .. })
    ));
    assert_eq!(f.editor.handles().len(), 4);
}

#[test]
fn test_delete_vertex_respects_minimum() {
    let mut f = editing(fixture());
    f.editor.delete_vertex(&mut f.scene, 3).expect("square to triangle");
    assert_eq!(f.editor.handles().len(), 3);
    assert_close(shape_area(&f), 50.0, 1e-3);

    let err = f.editor.delete_vertex(&mut f.scene, 0).unwrap_err();
    assert!(matches!(
        err,
        Error::Geometry(GeometryError::InsufficientVertices { .. })
    ));
    assert_eq!(f.editor.handles().len(), 3);
}

#[test]
fn test_rotate_round_trip() {
    let mut f = editing(fixture());
    let SceneKey::Shape(id) = f.square else {
        unreachable!()
    };
    let before = f.scene.shape(id).expect("shape").vertices().to_vec();

    f.editor.rotate(&mut f.scene, 37.0).expect("rotate");
    f.editor.rotate(&mut f.scene, -37.0).expect("rotate back");

    let after = f.scene.shape(id).expect("shape").vertices();
    for (a, b) in before.iter().zip(after) {
        assert!(a.approx_eq(b, 1e-6));
    }
}

#[test]
fn test_rotate_quarter_turn_counterclockwise() {
    let mut f = editing(fixture());
    f.editor.rotate(&mut f.scene, 90.0).expect("rotate");
    // South-west corner swings to the south-east about the centre
    let corner = local(&f.editor.handles()[0].position);
    assert_close(corner.x, 10.0, 1e-3);
    assert_close(corner.y, 0.0, 1e-3);
    assert_close(shape_area(&f), 100.0, 1e-3);
}

#[test]
fn test_height_clamps_at_zero() {
    let mut f = editing(fixture());
    assert_close(
        f.editor.adjust_extrusion_height(&mut f.scene, 3.0).expect("raise"),
        3.0,
        1e-12,
    );
    assert_close(
        f.editor.adjust_extrusion_height(&mut f.scene, -10.0).expect("lower"),
        0.0,
        1e-12,
    );
}

#[test]
fn test_width_clamps_at_minimum() {
    let mut f = fixture();
    let road = f
        .scene
        .add_shape(
            ShapeKind::Corridor { width: 4.0 },
            vec![at(0.0, 15.0), at(30.0, 15.0)],
        )
        .expect("road");
    f.editor
        .start_edit(&f.scene, SceneKey::Shape(road))
        .expect("edit road");

    let width = f.editor.adjust_corridor_width(&mut f.scene, -10.0).expect("narrow");
    assert_close(width, 0.5, 1e-12);
    assert_close(f.scene.shape(road).expect("road").area(), 15.0, 1e-3);
}

#[test]
fn test_width_on_polygon_is_kind_mismatch() {
    let mut f = editing(fixture());
    let err = f.editor.adjust_corridor_width(&mut f.scene, 1.0).unwrap_err();
    assert!(matches!(
        err,
        Error::Geometry(GeometryError::KindMismatch { .. })
    ));
}

#[test]
fn test_object_rotation_and_scale() {
    let mut f = fixture();
    let tree = f.scene.add_object("tree", at(3.0, 3.0));
    f.editor
        .start_edit(&f.scene, SceneKey::Object(tree))
        .expect("edit object");

    f.editor.rotate(&mut f.scene, 90.0).expect("rotate");
    assert_close(f.scene.object(tree).expect("tree").heading(), 270.0, 1e-9);

    let err = f.editor.set_object_scale(&mut f.scene, 0.0).unwrap_err();
    assert!(matches!(err, Error::Geometry(GeometryError::InvalidScale(_))));
    f.editor.set_object_scale(&mut f.scene, 2.5).expect("scale");
    assert_close(f.scene.object(tree).expect("tree").scale(), 2.5, 1e-12);

    assert_eq!(
        f.editor.stop_edit(&mut f.scene),
        Some(SceneKey::Object(tree))
    );
}

#[test]
fn test_object_drag_follows_pointer() {
    let mut f = fixture();
    let bench = f.scene.add_object("bench", at(10.0, 10.0));
    f.editor
        .start_edit(&f.scene, SceneKey::Object(bench))
        .expect("edit object");

    f.editor
        .begin_object_drag(&f.scene, at(0.0, 0.0))
        .expect("begin drag");
    f.editor
        .drag_object_to(&mut f.scene, at(1.0, 1.0))
        .expect("tick");
    f.editor
        .drag_object_to(&mut f.scene, at(3.0, 4.0))
        .expect("tick");
    f.editor.end_drag();

    let p = local(&f.scene.object(bench).expect("bench").position());
    assert_close(p.x, 13.0, 1e-3);
    assert_close(p.y, 14.0, 1e-3);
    assert_eq!(f.editor.mode(), Some(EditMode::Editing));
}

#[test]
fn test_whole_drag_accumulates_pointer_motion() {
    let mut f = editing(fixture());
    f.editor
        .begin_whole_drag(&f.scene, at(5.0, 5.0))
        .expect("begin drag");
    f.editor.drag_whole_to(&mut f.scene, at(7.0, 5.0)).expect("tick");
    f.editor.drag_whole_to(&mut f.scene, at(7.0, 8.0)).expect("tick");
    f.editor.end_drag();

    let corner = local(&f.editor.handles()[0].position);
    assert_close(corner.x, 2.0, 1e-3);
    assert_close(corner.y, 3.0, 1e-3);
    assert_close(shape_area(&f), 100.0, 1e-3);
    assert_eq!(f.editor.stop_edit(&mut f.scene), Some(f.square));
}

#[test]
fn test_drag_out_of_boundary_flags_shape() {
    let mut f = editing(fixture());
    f.editor
        .drag_vertex(&mut f.scene, 2, at(50.0, 10.0))
        .expect("drag");
    assert_eq!(f.scene.violation_count(), 1);
    assert!(matches!(
        f.editor.mode(),
        Some(EditMode::DraggingVertex { handle: 2 })
    ));

    // Whole drag is not reachable from a vertex drag
    let err = f.editor.begin_whole_drag(&f.scene, at(0.0, 0.0)).unwrap_err();
    assert!(matches!(err, Error::Edit(EditError::InvalidTransition { .. })));
}

#[test]
fn test_rejections_are_published() {
    let f = fixture();
    let rejected = Arc::new(Mutex::new(Vec::new()));
    let sink = rejected.clone();
    f.scene.bus().subscribe(
        EventFilter::Categories(vec![EventCategory::Edit]),
        move |event| {
            if let SceneEvent::Edit(EditEvent::Rejected { target, reason }) = event {
                sink.lock().unwrap().push((*target, reason.clone()));
            }
        },
    );

    let mut f = editing(f);
    let _ = f.editor.adjust_corridor_width(&mut f.scene, 1.0);
    let _ = f.editor.delete_vertex(&mut f.scene, 17);

    let rejected = rejected.lock().unwrap();
    assert_eq!(rejected.len(), 2);
    assert!(rejected.iter().all(|(target, _)| *target == Some(f.square)));
}
