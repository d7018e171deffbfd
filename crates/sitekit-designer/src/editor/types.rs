//! Editor type definitions: EditSettings, EditMode, VertexHandle, ScreenProjector.

use sitekit_core::{Position, SceneKey};

/// Maps world positions to screen pixels.
///
/// Implemented by the rendering host; returns `None` for positions that are
/// not visible (behind the camera, outside the view volume).
pub trait ScreenProjector {
    fn project(&self, position: &Position) -> Option<(f64, f64)>;
}

impl<F> ScreenProjector for F
where
    F: Fn(&Position) -> Option<(f64, f64)>,
{
    fn project(&self, position: &Position) -> Option<(f64, f64)> {
        self(position)
    }
}

/// Tunables of the edit engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditSettings {
    /// Maximum screen distance for inserting a vertex on an edge.
    pub insert_tolerance_px: f64,
    /// Lower clamp for corridor width adjustments.
    pub min_corridor_width_m: f64,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            insert_tolerance_px: 12.0,
            min_corridor_width_m: 0.5,
        }
    }
}

/// Interaction mode of an edit session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditMode {
    Editing,
    DraggingVertex {
        handle: usize,
    },
    /// Whole-shape drag; `last` is the pointer position of the previous tick.
    DraggingWhole {
        last: Position,
    },
    DraggingObject {
        anchor: Position,
        start: Position,
    },
}

impl EditMode {
    pub fn name(&self) -> &'static str {
        match self {
            EditMode::Editing => "editing",
            EditMode::DraggingVertex { .. } => "draggingVertex",
            EditMode::DraggingWhole { .. } => "draggingWhole",
            EditMode::DraggingObject { .. } => "draggingObject",
        }
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self, EditMode::Editing)
    }
}

/// Draggable handle at a shape vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexHandle {
    pub index: usize,
    pub position: Position,
}

/// The active edit session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub target: SceneKey,
    pub mode: EditMode,
    /// One handle per vertex; empty for objects and read-only sessions.
    pub handles: Vec<VertexHandle>,
    pub read_only: bool,
    /// Whether the target changed since the session started.
    pub changed: bool,
}
