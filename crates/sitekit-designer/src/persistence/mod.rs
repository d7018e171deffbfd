//! Persistence of shapes and placed objects.
//!
//! The scene is saved record by record through a [`PersistenceGateway`].
//! Records are plain data so they can cross task boundaries; the
//! [`SaveQueue`] serializes requests per scene key.

mod gateway;
mod json_file;
mod memory;
mod queue;

pub use gateway::PersistenceGateway;
pub use json_file::{JsonFileGateway, SceneDocument, DOCUMENT_VERSION};
pub use memory::MemoryGateway;
pub use queue::{SaveOutcome, SaveQueue};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitekit_core::{CategoryCatalog, PersistedId, Position, Result, SceneError, SceneKey};

use crate::model::{PlacedObject, ShapeKind};
use crate::scene::Scene;
use crate::transform::ObjectTransform;

/// Stored form of a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted_id: Option<PersistedId>,
    pub kind: ShapeKind,
    pub vertices: Vec<Position>,
    /// Missing or unknown tags restore as `unassigned`.
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub protected: bool,
    /// Marks the site boundary region.
    #[serde(default)]
    pub boundary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Stored form of a placed object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted_id: Option<PersistedId>,
    pub asset_key: String,
    pub position: Position,
    /// Degrees clockwise from north.
    pub heading: f64,
    pub scale: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub protected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum SceneRecord {
    Shape(ShapeRecord),
    Object(ObjectRecord),
}

impl SceneRecord {
    /// Snapshot the current state of `key`.
    pub fn capture(scene: &Scene, key: SceneKey) -> std::result::Result<Self, SceneError> {
        let now = Some(Utc::now());
        match key {
            SceneKey::Shape(id) => {
                let shape = scene.get_shape(id)?;
                Ok(SceneRecord::Shape(ShapeRecord {
                    persisted_id: shape.persisted_id.clone(),
                    kind: shape.kind(),
                    vertices: shape.vertices().to_vec(),
                    category: shape.category().to_string(),
                    name: shape.name.clone(),
                    protected: shape.protected,
                    boundary: scene.boundary_id() == Some(id),
                    updated_at: now,
                }))
            }
            SceneKey::Object(id) => {
                let object = scene.get_object(id)?;
                Ok(SceneRecord::Object(ObjectRecord {
                    persisted_id: object.persisted_id.clone(),
                    asset_key: object.asset_key.clone(),
                    position: object.position(),
                    heading: object.transform().unwrapped_heading(),
                    scale: object.scale(),
                    category: object.category().to_string(),
                    name: object.name.clone(),
                    protected: object.protected,
                    updated_at: now,
                }))
            }
        }
    }

    pub fn persisted_id(&self) -> Option<&PersistedId> {
        match self {
            SceneRecord::Shape(r) => r.persisted_id.as_ref(),
            SceneRecord::Object(r) => r.persisted_id.as_ref(),
        }
    }

    pub fn set_persisted_id(&mut self, id: Option<PersistedId>) {
        match self {
            SceneRecord::Shape(r) => r.persisted_id = id,
            SceneRecord::Object(r) => r.persisted_id = id,
        }
    }

    pub fn is_boundary(&self) -> bool {
        matches!(self, SceneRecord::Shape(r) if r.boundary)
    }

    /// Recreate the record's entity in `scene`.
    ///
    /// Boundary records replace the scene's boundary region. Category tags
    /// are canonicalized against `catalog`.
    pub fn restore_into(self, scene: &mut Scene, catalog: &CategoryCatalog) -> Result<SceneKey> {
        match self {
            SceneRecord::Shape(record) => {
                let id = if record.boundary {
                    scene.set_boundary(record.vertices)?
                } else {
                    scene.add_shape(record.kind, record.vertices)?
                };
                let shape = scene.shape_mut(id)?;
                shape.set_category(catalog.canonical_tag(Some(&record.category)));
                shape.persisted_id = record.persisted_id;
                if !record.boundary {
                    shape.name = record.name;
                    shape.protected = record.protected;
                }
                Ok(SceneKey::Shape(id))
            }
            SceneRecord::Object(record) => {
                let transform =
                    ObjectTransform::with(record.position, record.heading, record.scale)?;
                let category = catalog.canonical_tag(Some(&record.category));
                let id = scene.insert_object(|id| {
                    let mut object = PlacedObject::with_transform(id, record.asset_key, transform);
                    object.set_category(category);
                    object.name = record.name;
                    object.persisted_id = record.persisted_id;
                    object.protected = record.protected;
                    object
                });
                Ok(SceneKey::Object(id))
            }
        }
    }
}
