//! Site state manager.
//!
//! Ties the scene, the edit engine, the drawing session, the category
//! catalog, persistence and measurement together behind one API for a
//! rendering host or a command-line driver. Save requests are spawned on
//! the current tokio runtime; their outcomes are applied back to the scene
//! by [`SiteState::apply_save_outcomes`].

mod drawing;
mod persistence;
mod report;

pub use report::{ShapeSummary, SiteReport};

use std::sync::Arc;
use std::time::Duration;

use sitekit_core::{
    CategoryCatalog, EditError, EventBus, MeasurementSystem, ObjectId, Position, Result, SceneError,
    SceneKey, ShapeId,
};
use tokio::sync::mpsc;

use crate::drawing::{DrawingSession, DEFAULT_MIN_SPACING};
use crate::editor::{EditEngine, EditSettings};
use crate::measurement::{
    MeasurementReport, MeasurementRequest, MeasurementService, DEFAULT_DIVERGENCE_TOLERANCE,
    DEFAULT_TIMEOUT,
};
use crate::persistence::{PersistenceGateway, SaveOutcome, SaveQueue};
use crate::scene::Scene;
use crate::validation::Occupancy;

/// Behavior settings of a site session
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSettings {
    pub edit: EditSettings,
    pub min_vertex_spacing_m: f64,
    /// Rotation applied by one rotate step.
    pub rotation_step_deg: f64,
    /// Height change applied by one raise/lower step.
    pub height_step_m: f64,
    pub measurement_timeout: Duration,
    pub divergence_tolerance: f64,
    pub measurement_system: MeasurementSystem,
    pub decimals: usize,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            edit: EditSettings::default(),
            min_vertex_spacing_m: DEFAULT_MIN_SPACING,
            rotation_step_deg: 5.0,
            height_step_m: 1.0,
            measurement_timeout: DEFAULT_TIMEOUT,
            divergence_tolerance: DEFAULT_DIVERGENCE_TOLERANCE,
            measurement_system: MeasurementSystem::Metric,
            decimals: 2,
        }
    }
}

/// Site editing session
#[derive(Debug)]
pub struct SiteState {
    scene: Scene,
    editor: EditEngine,
    drawing: DrawingSession,
    catalog: CategoryCatalog,
    bus: Arc<EventBus>,
    saves: SaveQueue,
    outcomes: mpsc::UnboundedReceiver<SaveOutcome>,
    measurement: MeasurementService,
    settings: SiteSettings,
    /// Category applied to newly drawn shapes.
    drawing_category: Option<String>,
}

impl SiteState {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self::with_settings(
            gateway,
            SiteSettings::default(),
            CategoryCatalog::standard(),
            EventBus::shared(),
        )
    }

    pub fn with_settings(
        gateway: Arc<dyn PersistenceGateway>,
        settings: SiteSettings,
        catalog: CategoryCatalog,
        bus: Arc<EventBus>,
    ) -> Self {
        let (saves, outcomes) = SaveQueue::new(gateway);
        let measurement = MeasurementService::disabled()
            .with_timeout(settings.measurement_timeout)
            .with_divergence_tolerance(settings.divergence_tolerance)
            .with_bus(bus.clone());

        Self {
            scene: Scene::new(bus.clone()),
            editor: EditEngine::with_settings(bus.clone(), settings.edit),
            drawing: DrawingSession::with_bus(bus.clone())
                .with_min_spacing(settings.min_vertex_spacing_m),
            catalog,
            bus,
            saves,
            outcomes,
            measurement,
            settings,
            drawing_category: None,
        }
    }

    /// Use `service` for remote measurements; timeout and tolerance come
    /// from the site settings.
    pub fn set_measurement_service(&mut self, service: MeasurementService) {
        self.measurement = service
            .with_timeout(self.settings.measurement_timeout)
            .with_divergence_tolerance(self.settings.divergence_tolerance)
            .with_bus(self.bus.clone());
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn editor(&self) -> &EditEngine {
        &self.editor
    }

    pub fn drawing(&self) -> &DrawingSession {
        &self.drawing
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn saves(&self) -> &SaveQueue {
        &self.saves
    }

    /// Replace the boundary region (administrative) and persist it.
    pub fn set_boundary(&mut self, vertices: Vec<Position>) -> Result<ShapeId> {
        if self.editor.target() == self.scene.boundary_id().map(SceneKey::Shape) {
            self.editor.reset();
        }
        let id = self.scene.set_boundary(vertices)?;
        self.persist(SceneKey::Shape(id));
        Ok(id)
    }

    /// Select `target` for editing, closing any other session first.
    ///
    /// `None` just closes the current session. A session that changed its
    /// target queues a save.
    pub fn select(&mut self, target: Option<SceneKey>) -> Result<()> {
        if target.is_some() && self.editor.target() == target {
            return Ok(());
        }
        self.stop_editing();
        if let Some(target) = target {
            self.editor.start_edit(&self.scene, target)?;
        }
        Ok(())
    }

    /// Close the edit session, saving the target if it changed
    pub fn stop_editing(&mut self) -> Option<SceneKey> {
        let changed = self.editor.stop_edit(&mut self.scene)?;
        self.persist(changed);
        Some(changed)
    }

    /// Run an edit operation against the scene.
    ///
    /// ```ignore
    /// site.edit(|editor, scene| editor.delete_vertex(scene, 2))?;
    /// ```
    pub fn edit<T>(&mut self, op: impl FnOnce(&mut EditEngine, &mut Scene) -> Result<T>) -> Result<T> {
        op(&mut self.editor, &mut self.scene)
    }

    /// Rotate by one configured step; clockwise when `clockwise` is set
    pub fn rotate_step(&mut self, clockwise: bool) -> Result<()> {
        let step = self.settings.rotation_step_deg;
        let degrees = if clockwise { -step } else { step };
        self.editor.rotate(&mut self.scene, degrees)
    }

    /// Raise (or lower) the edited polygon by one configured step
    pub fn height_step(&mut self, raise: bool) -> Result<f64> {
        let step = self.settings.height_step_m;
        let delta = if raise { step } else { -step };
        self.editor.adjust_extrusion_height(&mut self.scene, delta)
    }

    /// Administrative protection toggle; the change is persisted.
    pub fn set_protected(&mut self, key: SceneKey, protected: bool) -> Result<()> {
        if self.editor.target() == Some(key) {
            self.stop_editing();
        }
        self.scene.set_protected(key, protected)?;
        self.persist(key);
        Ok(())
    }

    /// Assign a category; unknown or missing tags become the fallback.
    ///
    /// Protected targets and the boundary region keep their category.
    pub fn set_category(&mut self, key: SceneKey, tag: Option<&str>) -> Result<()> {
        if self.scene.is_protected(key) {
            tracing::warn!("Refusing to recategorize protected {}", key);
            return Err(EditError::Protected { target: key }.into());
        }
        let tag = self.catalog.canonical_tag(tag);
        match key {
            SceneKey::Shape(id) => {
                self.scene.shape_mut(id)?.set_category(tag);
                self.scene.mark_occupancy_stale();
            }
            SceneKey::Object(id) => self.scene.object_mut(id)?.set_category(tag),
        }
        self.persist(key);
        Ok(())
    }

    /// Place a catalog asset and persist it
    pub fn place_object(
        &mut self,
        asset_key: impl Into<String>,
        position: Position,
        category: Option<&str>,
    ) -> ObjectId {
        let id = self.scene.add_object(asset_key, position);
        let tag = self.catalog.canonical_tag(category);
        if let Ok(object) = self.scene.object_mut(id) {
            object.set_category(tag);
        }
        self.persist(SceneKey::Object(id));
        id
    }

    /// Delete a shape or object and its stored entry.
    ///
    /// Protected targets and the boundary region are refused.
    pub fn delete(&mut self, key: SceneKey) -> Result<()> {
        let persisted = self.scene.remove(key)?;
        if self.editor.target() == Some(key) {
            self.editor.reset();
        }
        self.saves.submit_delete(key, persisted);
        Ok(())
    }

    /// Current occupancy (recomputed when stale)
    pub fn occupancy(&mut self) -> &Occupancy {
        self.scene.occupancy()
    }

    /// Cross-check a shape's local figures with the remote service.
    pub async fn measure(&self, id: ShapeId) -> Result<MeasurementReport> {
        let shape = self.scene.shape(id).ok_or(SceneError::UnknownShape(id))?;
        let request = MeasurementRequest::from_shape(shape);
        Ok(self.measurement.measure(request).await)
    }
}
