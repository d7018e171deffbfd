//! Event type definitions for the scene event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};

use crate::data::{ObjectId, PersistedId, SceneKey, ShapeId};

/// Root event enum for all scene events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Edit session lifecycle and geometry edits
    Edit(EditEvent),
    /// Click-by-click drawing
    Drawing(DrawingEvent),
    /// Boundary containment
    Validation(ValidationEvent),
    /// Occupancy recomputation
    Occupancy(OccupancyEvent),
    /// Save/delete outcomes
    Persistence(PersistenceEvent),
    /// Remote measurement outcomes
    Measurement(MeasurementEvent),
}

impl SceneEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            SceneEvent::Edit(_) => EventCategory::Edit,
            SceneEvent::Drawing(_) => EventCategory::Drawing,
            SceneEvent::Validation(_) => EventCategory::Validation,
            SceneEvent::Occupancy(_) => EventCategory::Occupancy,
            SceneEvent::Persistence(_) => EventCategory::Persistence,
            SceneEvent::Measurement(_) => EventCategory::Measurement,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            SceneEvent::Edit(e) => e.description(),
            SceneEvent::Drawing(e) => e.description(),
            SceneEvent::Validation(e) => e.description(),
            SceneEvent::Occupancy(e) => e.description(),
            SceneEvent::Persistence(e) => e.description(),
            SceneEvent::Measurement(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Edit,
    Drawing,
    Validation,
    Occupancy,
    Persistence,
    Measurement,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Edit => write!(f, "Edit"),
            EventCategory::Drawing => write!(f, "Drawing"),
            EventCategory::Validation => write!(f, "Validation"),
            EventCategory::Occupancy => write!(f, "Occupancy"),
            EventCategory::Persistence => write!(f, "Persistence"),
            EventCategory::Measurement => write!(f, "Measurement"),
        }
    }
}

/// Edit session events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditEvent {
    /// A session was opened on a target.
    SessionStarted {
        target: SceneKey,
        /// Protected targets open read-only.
        read_only: bool,
    },
    /// The session was closed.
    SessionStopped {
        target: SceneKey,
        /// Whether the geometry changed during the session.
        changed: bool,
    },
    /// A vertex handle was dragged.
    VertexMoved { shape: ShapeId, index: usize },
    /// A vertex was inserted on an edge.
    VertexInserted { shape: ShapeId, index: usize },
    /// A vertex was removed.
    VertexDeleted { shape: ShapeId, index: usize },
    /// The target was rotated.
    Rotated { target: SceneKey, degrees: f64 },
    /// The whole target was translated.
    Moved { target: SceneKey },
    /// A polygon's extrusion height changed.
    HeightChanged { shape: ShapeId, height: f64 },
    /// A corridor's width changed.
    WidthChanged { shape: ShapeId, width: f64 },
    /// A placed object's scale changed.
    ObjectScaled { object: ObjectId, scale: f64 },
    /// An operation was rejected; state is unchanged.
    Rejected {
        target: Option<SceneKey>,
        reason: String,
    },
}

impl EditEvent {
    fn description(&self) -> String {
        match self {
            EditEvent::SessionStarted { target, read_only } => {
                if *read_only {
                    format!("Editing {} (read-only)", target)
                } else {
                    format!("Editing {}", target)
                }
            }
            EditEvent::SessionStopped { target, changed } => {
                format!(
                    "Stopped editing {}{}",
                    target,
                    if *changed { " (modified)" } else { "" }
                )
            }
            EditEvent::VertexMoved { shape, index } => {
                format!("Moved vertex {} of {}", index, shape)
            }
            EditEvent::VertexInserted { shape, index } => {
                format!("Inserted vertex {} into {}", index, shape)
            }
            EditEvent::VertexDeleted { shape, index } => {
                format!("Deleted vertex {} of {}", index, shape)
            }
            EditEvent::Rotated { target, degrees } => {
                format!("Rotated {} by {:.1}°", target, degrees)
            }
            EditEvent::Moved { target } => format!("Moved {}", target),
            EditEvent::HeightChanged { shape, height } => {
                format!("Height of {} set to {:.2} m", shape, height)
            }
            EditEvent::WidthChanged { shape, width } => {
                format!("Width of {} set to {:.2} m", shape, width)
            }
            EditEvent::ObjectScaled { object, scale } => {
                format!("Scale of {} set to {:.3}", object, scale)
            }
            EditEvent::Rejected { target, reason } => match target {
                Some(t) => format!("Rejected edit on {}: {}", t, reason),
                None => format!("Rejected edit: {}", reason),
            },
        }
    }
}

/// Drawing session events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawingEvent {
    /// Drawing started in the given mode ("polygon" or "corridor").
    Started { mode: String },
    /// A fixed vertex was added.
    PointAdded { count: usize },
    /// The drawing produced a shape.
    Finished { shape: ShapeId },
    /// The drawing had too few vertices and was dropped.
    Discarded { points: usize },
    /// The user cancelled the drawing.
    Cancelled,
}

impl DrawingEvent {
    fn description(&self) -> String {
        match self {
            DrawingEvent::Started { mode } => format!("Started drawing {}", mode),
            DrawingEvent::PointAdded { count } => format!("Drawing has {} vertices", count),
            DrawingEvent::Finished { shape } => format!("Finished drawing {}", shape),
            DrawingEvent::Discarded { points } => {
                format!("Discarded drawing with {} vertices", points)
            }
            DrawingEvent::Cancelled => "Drawing cancelled".to_string(),
        }
    }
}

/// Boundary validation events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationEvent {
    /// A shape's containment flag flipped.
    ContainmentChanged { shape: ShapeId, contained: bool },
    /// The aggregate warning changed.
    BoundaryWarning { count: usize, message: String },
    /// No shapes violate the boundary any more.
    WarningCleared,
}

impl ValidationEvent {
    fn description(&self) -> String {
        match self {
            ValidationEvent::ContainmentChanged { shape, contained } => {
                if *contained {
                    format!("{} is inside the boundary", shape)
                } else {
                    format!("{} left the boundary", shape)
                }
            }
            ValidationEvent::BoundaryWarning { message, .. } => message.clone(),
            ValidationEvent::WarningCleared => "Boundary warning cleared".to_string(),
        }
    }
}

/// Occupancy events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OccupancyEvent {
    /// Occupancy was recomputed.
    Recomputed {
        occupied_area: f64,
        boundary_area: f64,
        percentage: f64,
    },
    /// No boundary is loaded.
    NotComputable,
}

impl OccupancyEvent {
    fn description(&self) -> String {
        match self {
            OccupancyEvent::Recomputed {
                occupied_area,
                boundary_area,
                percentage,
            } => format!(
                "Occupancy {:.1}% ({:.1} of {:.1} m²)",
                percentage, occupied_area, boundary_area
            ),
            OccupancyEvent::NotComputable => "Occupancy not computable".to_string(),
        }
    }
}

/// Persistence events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersistenceEvent {
    /// A save was acknowledged.
    Saved { key: SceneKey, persisted_id: PersistedId },
    /// A save or delete failed.
    Failed { key: SceneKey, error: String },
    /// A record was deleted.
    Deleted { key: SceneKey },
}

impl PersistenceEvent {
    fn description(&self) -> String {
        match self {
            PersistenceEvent::Saved { key, persisted_id } => {
                format!("Saved {} as {}", key, persisted_id)
            }
            PersistenceEvent::Failed { key, error } => {
                format!("Persistence failed for {}: {}", key, error)
            }
            PersistenceEvent::Deleted { key } => format!("Deleted {}", key),
        }
    }
}

/// Remote measurement events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasurementEvent {
    /// The remote service answered.
    Completed {
        shape: ShapeId,
        area: f64,
        volume: Option<f64>,
        /// Remote and local values differ beyond tolerance.
        diverged: bool,
    },
    /// The remote service failed or timed out.
    Unavailable { shape: ShapeId, reason: String },
}

impl MeasurementEvent {
    fn description(&self) -> String {
        match self {
            MeasurementEvent::Completed {
                shape,
                area,
                diverged,
                ..
            } => format!(
                "Remote area for {}: {:.2} m²{}",
                shape,
                area,
                if *diverged { " (diverges from local)" } else { "" }
            ),
            MeasurementEvent::Unavailable { shape, reason } => {
                format!("Measurement unavailable for {}: {}", shape, reason)
            }
        }
    }
}
