//! Placed objects (trees, furniture, vehicles) positioned by a transform.

use sitekit_core::{GeometryError, ObjectId, PersistedId, Position, UNASSIGNED_CATEGORY};

use crate::transform::ObjectTransform;

/// A catalog asset placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    id: ObjectId,
    /// Catalog key of the visual asset.
    pub asset_key: String,
    category: String,
    pub name: Option<String>,
    pub persisted_id: Option<PersistedId>,
    pub protected: bool,
    transform: ObjectTransform,
}

impl PlacedObject {
    pub fn new(id: ObjectId, asset_key: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            asset_key: asset_key.into(),
            category: UNASSIGNED_CATEGORY.to_string(),
            name: None,
            persisted_id: None,
            protected: false,
            transform: ObjectTransform::new(position),
        }
    }

    pub fn with_transform(
        id: ObjectId,
        asset_key: impl Into<String>,
        transform: ObjectTransform,
    ) -> Self {
        let mut object = Self::new(id, asset_key, transform.position());
        object.transform = transform;
        object
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_category(&mut self, tag: impl Into<String>) {
        self.category = tag.into();
    }

    pub fn transform(&self) -> &ObjectTransform {
        &self.transform
    }

    pub fn position(&self) -> Position {
        self.transform.position()
    }

    /// Heading in `[0, 360)`, clockwise from north
    pub fn heading(&self) -> f64 {
        self.transform.heading()
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale()
    }

    pub fn set_position(&mut self, position: Position) {
        self.transform.set_position(position);
    }

    pub fn rotate(&mut self, delta_degrees: f64) {
        self.transform.rotate(delta_degrees);
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), GeometryError> {
        self.transform.set_scale(scale)
    }
}
