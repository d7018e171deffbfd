//! Scene store: shapes, placed objects and the boundary region.
//!
//! The scene owns every entity, the violation tracker and the cached
//! occupancy. Mutating helpers keep the derived state (violation flags,
//! occupancy staleness) consistent; protection is decided in one place,
//! [`Scene::is_protected`].

use std::collections::BTreeMap;
use std::sync::Arc;

use sitekit_core::{
    EditError, EventBus, GeometryError, ObjectId, OccupancyEvent, PersistedId, Position,
    Result, SceneError, SceneEvent, SceneKey, ShapeId,
};

use crate::model::{PlacedObject, Shape, ShapeKind};
use crate::validation::{compute_occupancy, BoundaryFrame, Occupancy, ViolationTracker};

/// Name given to the boundary region shape.
pub const BOUNDARY_NAME: &str = "Site boundary";

#[derive(Debug)]
pub struct Scene {
    shapes: BTreeMap<ShapeId, Shape>,
    objects: BTreeMap<ObjectId, PlacedObject>,
    boundary: Option<ShapeId>,
    next_id: u64,
    tracker: ViolationTracker,
    occupancy: Option<Occupancy>,
    bus: Arc<EventBus>,
}

impl Scene {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            shapes: BTreeMap::new(),
            objects: BTreeMap::new(),
            boundary: None,
            next_id: 1,
            tracker: ViolationTracker::with_bus(bus.clone()),
            occupancy: None,
            bus,
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    fn generate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a shape and validate it against the boundary.
    pub fn add_shape(&mut self, kind: ShapeKind, vertices: Vec<Position>) -> Result<ShapeId> {
        let id = ShapeId(self.generate_id());
        let shape = Shape::new(id, kind, vertices)?;
        self.shapes.insert(id, shape);
        self.shape_changed(id);
        tracing::debug!("Added {} ({})", id, kind.name());
        Ok(id)
    }

    pub fn add_object(&mut self, asset_key: impl Into<String>, position: Position) -> ObjectId {
        let id = ObjectId(self.generate_id());
        self.objects
            .insert(id, PlacedObject::new(id, asset_key, position));
        id
    }

    /// Insert a fully built object (used when loading)
    pub fn insert_object(&mut self, build: impl FnOnce(ObjectId) -> PlacedObject) -> ObjectId {
        let id = ObjectId(self.generate_id());
        self.objects.insert(id, build(id));
        id
    }

    /// Replace the boundary region.
    ///
    /// This is the only way to change the boundary. A replacement keeps the
    /// boundary's id and persisted id, so it stays a single stored entry;
    /// every shape is revalidated.
    pub fn set_boundary(&mut self, vertices: Vec<Position>) -> Result<ShapeId> {
        let id = match self.boundary {
            Some(id) => id,
            None => ShapeId(self.generate_id()),
        };
        let mut shape = Shape::new(id, ShapeKind::polygon(), vertices)?;
        let frame = BoundaryFrame::new(&shape);
        if frame.area() <= crate::spatial::EPSILON {
            return Err(GeometryError::DegeneratePolygon {
                reason: "boundary has no area".to_string(),
            }
            .into());
        }
        shape.protected = true;
        shape.name = Some(BOUNDARY_NAME.to_string());

        if let Some(old) = self.shapes.get(&id) {
            shape.persisted_id = old.persisted_id.clone();
        }
        self.boundary = Some(id);
        self.shapes.insert(id, shape);
        tracing::info!("Boundary region set ({:.1} m²)", frame.area());

        self.revalidate_all();
        self.mark_occupancy_stale();
        Ok(id)
    }

    pub fn boundary_id(&self) -> Option<ShapeId> {
        self.boundary
    }

    pub fn boundary(&self) -> Option<&Shape> {
        self.boundary.and_then(|id| self.shapes.get(&id))
    }

    pub fn boundary_frame(&self) -> Option<BoundaryFrame> {
        self.boundary().map(BoundaryFrame::new)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn get_shape(&self, id: ShapeId) -> std::result::Result<&Shape, SceneError> {
        self.shapes.get(&id).ok_or(SceneError::UnknownShape(id))
    }

    pub(crate) fn shape_mut(&mut self, id: ShapeId) -> std::result::Result<&mut Shape, SceneError> {
        self.shapes.get_mut(&id).ok_or(SceneError::UnknownShape(id))
    }

    pub fn object(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(&id)
    }

    pub fn get_object(&self, id: ObjectId) -> std::result::Result<&PlacedObject, SceneError> {
        self.objects.get(&id).ok_or(SceneError::UnknownObject(id))
    }

    pub(crate) fn object_mut(
        &mut self,
        id: ObjectId,
    ) -> std::result::Result<&mut PlacedObject, SceneError> {
        self.objects.get_mut(&id).ok_or(SceneError::UnknownObject(id))
    }

    /// Every shape except the boundary region
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        let boundary = self.boundary;
        self.shapes
            .values()
            .filter(move |s| Some(s.id()) != boundary)
    }

    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.values()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes().count()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn contains(&self, key: SceneKey) -> bool {
        match key {
            SceneKey::Shape(id) => self.shapes.contains_key(&id),
            SceneKey::Object(id) => self.objects.contains_key(&id),
        }
    }

    /// The single protection predicate: the boundary region and any entity
    /// flagged `protected` cannot be edited or deleted.
    pub fn is_protected(&self, key: SceneKey) -> bool {
        match key {
            SceneKey::Shape(id) => {
                Some(id) == self.boundary || self.shapes.get(&id).is_some_and(|s| s.protected)
            }
            SceneKey::Object(id) => self.objects.get(&id).is_some_and(|o| o.protected),
        }
    }

    /// Administrative protection toggle
    pub fn set_protected(&mut self, key: SceneKey, protected: bool) -> Result<()> {
        match key {
            SceneKey::Shape(id) => self.shape_mut(id)?.protected = protected,
            SceneKey::Object(id) => self.object_mut(id)?.protected = protected,
        }
        Ok(())
    }

    pub fn persisted_id(&self, key: SceneKey) -> Option<PersistedId> {
        match key {
            SceneKey::Shape(id) => self.shapes.get(&id)?.persisted_id.clone(),
            SceneKey::Object(id) => self.objects.get(&id)?.persisted_id.clone(),
        }
    }

    pub fn set_persisted_id(&mut self, key: SceneKey, persisted: PersistedId) -> Result<()> {
        match key {
            SceneKey::Shape(id) => self.shape_mut(id)?.persisted_id = Some(persisted),
            SceneKey::Object(id) => self.object_mut(id)?.persisted_id = Some(persisted),
        }
        Ok(())
    }

    pub fn find_persisted(&self, persisted: &PersistedId) -> Option<SceneKey> {
        self.shapes
            .values()
            .find(|s| s.persisted_id.as_ref() == Some(persisted))
            .map(|s| SceneKey::Shape(s.id()))
            .or_else(|| {
                self.objects
                    .values()
                    .find(|o| o.persisted_id.as_ref() == Some(persisted))
                    .map(|o| SceneKey::Object(o.id()))
            })
    }

    /// Delete a shape or object; blocked for protected targets.
    ///
    /// Returns the persisted id so the caller can delete it remotely.
    pub fn remove(&mut self, key: SceneKey) -> Result<Option<PersistedId>> {
        if self.is_protected(key) {
            tracing::warn!("Refusing to delete protected {}", key);
            return Err(EditError::Protected { target: key }.into());
        }

        let persisted = match key {
            SceneKey::Shape(id) => {
                let shape = self
                    .shapes
                    .remove(&id)
                    .ok_or(SceneError::UnknownShape(id))?;
                self.tracker.forget(id);
                self.mark_occupancy_stale();
                shape.persisted_id
            }
            SceneKey::Object(id) => {
                self.objects
                    .remove(&id)
                    .ok_or(SceneError::UnknownObject(id))?
                    .persisted_id
            }
        };
        tracing::info!("Removed {}", key);
        Ok(persisted)
    }

    /// Recheck one shape against the boundary.
    ///
    /// Returns whether the shape is contained. Without a boundary every
    /// shape counts as contained.
    pub fn revalidate_shape(&mut self, id: ShapeId) -> bool {
        if Some(id) == self.boundary {
            return true;
        }
        let frame = self.boundary_frame();
        let Some(shape) = self.shapes.get_mut(&id) else {
            return true;
        };

        let contained = frame
            .as_ref()
            .is_none_or(|f| f.contains_all(shape.vertices()));
        shape.set_outside_boundary(!contained);
        self.tracker.mark(id, !contained);
        contained
    }

    pub fn revalidate_all(&mut self) {
        let ids: Vec<ShapeId> = self.shapes.keys().copied().collect();
        for id in ids {
            self.revalidate_shape(id);
        }
    }

    /// Rederive everything that depends on a shape's geometry
    pub fn shape_changed(&mut self, id: ShapeId) {
        self.revalidate_shape(id);
        self.mark_occupancy_stale();
    }

    pub fn mark_occupancy_stale(&mut self) {
        self.occupancy = None;
    }

    pub fn is_occupancy_stale(&self) -> bool {
        self.occupancy.is_none()
    }

    /// Current occupancy, recomputed if anything changed since the last call
    pub fn occupancy(&mut self) -> &Occupancy {
        let occupancy = match self.occupancy.take() {
            Some(cached) => cached,
            None => self.recompute_occupancy(),
        };
        self.occupancy.insert(occupancy)
    }

    fn recompute_occupancy(&self) -> Occupancy {
        let occupancy = compute_occupancy(self.boundary(), self.shapes());
        let event = match &occupancy {
            Occupancy::Computed(report) => {
                tracing::debug!(
                    "Occupancy {:.1}% of {:.1} m²",
                    report.percentage,
                    report.boundary_area
                );
                OccupancyEvent::Recomputed {
                    occupied_area: report.occupied_area,
                    boundary_area: report.boundary_area,
                    percentage: report.percentage,
                }
            }
            Occupancy::NotComputable => OccupancyEvent::NotComputable,
        };
        self.bus.publish(SceneEvent::Occupancy(event));
        occupancy
    }

    pub fn violations(&self) -> &ViolationTracker {
        &self.tracker
    }

    pub fn violation_count(&self) -> usize {
        self.tracker.count()
    }

    pub fn violation_message(&self) -> Option<String> {
        self.tracker.message()
    }

    /// Drop every entity, including the boundary
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.objects.clear();
        self.boundary = None;
        self.tracker.clear();
        self.mark_occupancy_stale();
    }
}
