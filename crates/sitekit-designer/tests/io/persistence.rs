use std::sync::Arc;
use std::time::Duration;

use sitekit_core::{ConnectivityError, EventBus, PersistedId, Position, SceneKey};
use sitekit_designer::{
    DrawMode, JsonFileGateway, MemoryGateway, PersistenceGateway, Scene, SceneRecord,
    ShapeKind, ShapeRecord, SiteState, DOCUMENT_VERSION,
};
use tempfile::TempDir;

use crate::common::{assert_close, at, rect, square};

fn shape_record() -> SceneRecord {
    let mut scene = Scene::new(EventBus::shared());
    let id = scene
        .add_shape(ShapeKind::Polygon { height: Some(6.0) }, square(0.0, 0.0, 8.0))
        .expect("shape");
    SceneRecord::capture(&scene, SceneKey::Shape(id)).expect("capture")
}

#[tokio::test]
async fn test_missing_file_is_empty_scene() {
    let dir = TempDir::new().expect("temp dir");
    let gateway = JsonFileGateway::new(dir.path().join("site.json"));
    assert!(gateway.load_all().await.expect("load").is_empty());
}

#[tokio::test]
async fn test_save_assigns_and_keeps_ids() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("site.json");
    let gateway = JsonFileGateway::new(&path);

    let mut record = shape_record();
    let id = gateway.save(&record).await.expect("save");
    assert!(path.exists());

    record.set_persisted_id(Some(id.clone()));
    let again = gateway.save(&record).await.expect("save again");
    assert_eq!(again, id);

    let document = gateway.read_document().await.expect("document");
    assert_eq!(document.version, DOCUMENT_VERSION);
    assert_eq!(document.records.len(), 1);
    assert!(document.records.contains_key(id.as_str()));
}

#[tokio::test]
async fn test_delete_reports_whether_anything_was_removed() {
    let dir = TempDir::new().expect("temp dir");
    let gateway = JsonFileGateway::new(dir.path().join("site.json"));
    let id = gateway.save(&shape_record()).await.expect("save");

    assert!(gateway.delete(&id).await.expect("delete"));
    assert!(!gateway.delete(&id).await.expect("delete again"));
    assert!(!gateway
        .delete(&PersistedId("never-saved".to_string()))
        .await
        .expect("delete unknown"));
}

#[tokio::test]
async fn test_malformed_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("site.json");
    std::fs::write(&path, "{ not json").expect("write");

    let gateway = JsonFileGateway::new(&path);
    let err = gateway.load_all().await.unwrap_err();
    assert!(matches!(err, ConnectivityError::Malformed { .. }));
}

#[tokio::test]
async fn test_future_version_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("site.json");
    std::fs::write(
        &path,
        r#"{"version": 99, "saved_at": "2026-01-01T00:00:00Z", "records": {}}"#,
    )
    .expect("write");

    let err = JsonFileGateway::new(&path).load_all().await.unwrap_err();
    assert!(matches!(err, ConnectivityError::Malformed { .. }));
}

#[tokio::test]
async fn test_site_round_trip_through_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("site.json");

    let mut site = SiteState::new(Arc::new(JsonFileGateway::new(&path)));
    site.set_boundary(rect(0.0, 0.0, 40.0, 25.0))
        .expect("boundary");
    site.set_drawing_category(Some("commercial"));
    site.begin_drawing(DrawMode::Polygon);
    for p in square(2.0, 2.0, 10.0) {
        site.drawing_click(p).expect("click");
    }
    let shape = site.finish_drawing().expect("finish").expect("shape");
    site.select(Some(shape)).expect("select");
    site.height_step(true).expect("raise");
    site.select(None).expect("deselect");

    let bench = site.place_object("bench", at(30.0, 20.0), Some("green_space"));
    site.select(Some(SceneKey::Object(bench))).expect("select bench");
    site.rotate_step(true).expect("rotate");
    site.select(None).expect("deselect");
    site.flush_saves().await;

    let mut reloaded = SiteState::new(Arc::new(JsonFileGateway::new(&path)));
    assert_eq!(reloaded.load_from_gateway().await.expect("load"), 3);

    let restored = reloaded.scene().shapes().next().expect("restored shape");
    assert_eq!(restored.category(), "commercial");
    assert_eq!(restored.height(), Some(1.0));
    assert_close(restored.area(), 100.0, 1e-3);

    let object = reloaded.scene().objects().next().expect("restored object");
    assert_close(object.heading(), 5.0, 1e-9);
    assert_eq!(object.category(), "green_space");

    let report = reloaded.occupancy().report().expect("computed").clone();
    assert_close(report.percentage, 10.0, 1e-3);
}

fn stored_polygon(vertices: Vec<Position>, category: &str, boundary: bool) -> SceneRecord {
    SceneRecord::Shape(ShapeRecord {
        persisted_id: None,
        kind: ShapeKind::polygon(),
        vertices,
        category: category.to_string(),
        name: None,
        protected: false,
        boundary,
        updated_at: None,
    })
}

#[tokio::test]
async fn test_unknown_stored_category_loads_as_unassigned() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.insert(stored_polygon(rect(0.0, 0.0, 40.0, 25.0), "", true));
    gateway.insert(stored_polygon(square(2.0, 2.0, 10.0), "skate-park", false));

    let mut site = SiteState::new(gateway);
    assert_eq!(site.load_from_gateway().await.expect("load"), 2);

    let shape = site.scene().shapes().next().expect("restored shape");
    assert_eq!(shape.category(), "unassigned");
    let report = site.occupancy().report().expect("computed").clone();
    assert_eq!(report.by_category.keys().collect::<Vec<_>>(), vec!["unassigned"]);
}

#[tokio::test]
async fn test_invalid_record_is_skipped_on_load() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.insert(stored_polygon(rect(0.0, 0.0, 40.0, 25.0), "", true));
    gateway.insert(stored_polygon(square(1.0, 1.0, 5.0), "residential", false));
    gateway.insert(stored_polygon(vec![at(0.0, 0.0), at(3.0, 0.0)], "residential", false));
    gateway.insert(stored_polygon(square(10.0, 1.0, 5.0), "residential", false));

    let mut site = SiteState::new(gateway);
    assert_eq!(site.load_from_gateway().await.expect("load"), 3);
    assert!(site.scene().boundary().is_some());
    assert_eq!(site.scene().shape_count(), 2);
}

#[tokio::test]
async fn test_failed_load_keeps_current_scene() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut site = SiteState::new(gateway.clone());
    site.set_boundary(rect(0.0, 0.0, 40.0, 25.0))
        .expect("boundary");
    site.flush_saves().await;

    gateway.set_failing(true);
    let err = site.load_from_gateway().await.unwrap_err();
    assert!(err.is_connectivity_error());
    assert!(site.scene().boundary().is_some());
}

#[tokio::test]
async fn test_replaced_boundary_is_stored_once() {
    let gateway = Arc::new(MemoryGateway::with_latency(Duration::from_millis(20)));
    let mut site = SiteState::new(gateway.clone());

    let first = site
        .set_boundary(rect(0.0, 0.0, 40.0, 25.0))
        .expect("boundary");
    let second = site
        .set_boundary(rect(0.0, 0.0, 60.0, 30.0))
        .expect("replacement");
    assert_eq!(first, second);
    site.flush_saves().await;

    let stored = gateway.load_all().await.expect("load");
    assert_eq!(stored.iter().filter(|r| r.is_boundary()).count(), 1);

    let mut reloaded = SiteState::new(gateway);
    reloaded.load_from_gateway().await.expect("reload");
    let report = reloaded.occupancy().report().expect("computed").clone();
    assert_close(report.boundary_area, 1800.0, 1e-2);
}
