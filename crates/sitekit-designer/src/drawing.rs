//! Click-by-click drawing of new shapes.
//!
//! While collecting, the last point of the list is a floating preview vertex
//! that follows the pointer. A click promotes it to a fixed vertex and
//! appends a new floating one; finishing drops it.

use std::sync::Arc;

use sitekit_core::{DrawingEvent, EditError, EventBus, Position, SceneEvent};

use crate::model::ShapeKind;
use crate::validation::BoundaryFrame;

/// Default minimum distance between consecutive fixed vertices (meters).
pub const DEFAULT_MIN_SPACING: f64 = 0.05;

/// What a drawing produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawMode {
    Polygon,
    Corridor { width: f64 },
}

impl DrawMode {
    pub fn kind(&self) -> ShapeKind {
        match *self {
            DrawMode::Polygon => ShapeKind::polygon(),
            DrawMode::Corridor { width } => ShapeKind::Corridor { width },
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    Collecting {
        mode: DrawMode,
        /// Fixed vertices followed by the floating preview vertex.
        points: Vec<Position>,
    },
}

/// Live feedback for the preview outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewFeedback {
    pub out_of_bounds: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawingOutcome {
    /// Enough vertices; the caller builds, validates and saves the shape.
    Completed {
        kind: ShapeKind,
        vertices: Vec<Position>,
    },
    /// Too few vertices; nothing was created.
    Discarded { points: usize },
}

#[derive(Debug)]
pub struct DrawingSession {
    state: DrawingState,
    min_spacing: f64,
    bus: Option<Arc<EventBus>>,
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSession {
    pub fn new() -> Self {
        Self {
            state: DrawingState::Idle,
            min_spacing: DEFAULT_MIN_SPACING,
            bus: None,
        }
    }

    pub fn with_bus(bus: Arc<EventBus>) -> Self {
        Self {
            bus: Some(bus),
            ..Self::new()
        }
    }

    pub fn with_min_spacing(mut self, min_spacing: f64) -> Self {
        self.min_spacing = min_spacing.max(0.0);
        self
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.state, DrawingState::Collecting { .. })
    }

    pub fn mode(&self) -> Option<DrawMode> {
        match &self.state {
            DrawingState::Collecting { mode, .. } => Some(*mode),
            DrawingState::Idle => None,
        }
    }

    /// Vertices fixed by clicks so far
    pub fn fixed_points(&self) -> &[Position] {
        match &self.state {
            DrawingState::Collecting { points, .. } if !points.is_empty() => {
                &points[..points.len() - 1]
            }
            _ => &[],
        }
    }

    pub fn floating_point(&self) -> Option<Position> {
        match &self.state {
            DrawingState::Collecting { points, .. } => points.last().copied(),
            DrawingState::Idle => None,
        }
    }

    /// Start collecting points; an unfinished drawing is discarded.
    pub fn begin(&mut self, mode: DrawMode) {
        if self.is_collecting() {
            self.cancel();
        }
        tracing::info!("Drawing {}", mode.name());
        self.state = DrawingState::Collecting {
            mode,
            points: Vec::new(),
        };
        self.publish(DrawingEvent::Started {
            mode: mode.name().to_string(),
        });
    }

    /// Fix a vertex at `position`.
    ///
    /// Clicks closer than the minimum spacing to the last fixed vertex are
    /// ignored. Returns the number of fixed vertices.
    pub fn click(&mut self, position: Position) -> Result<usize, EditError> {
        let min_spacing = self.min_spacing;
        let DrawingState::Collecting { points, .. } = &mut self.state else {
            return Err(EditError::NotDrawing);
        };

        if points.is_empty() {
            points.push(position);
            points.push(position);
        } else {
            let fixed = points.len() - 1;
            if fixed > 0 && points[fixed - 1].distance_to(&position) < min_spacing {
                tracing::debug!("Ignoring click within {} m of the last vertex", min_spacing);
                return Ok(fixed);
            }
            points[fixed] = position;
            points.push(position);
        }

        let count = points.len() - 1;
        self.publish(DrawingEvent::PointAdded { count });
        Ok(count)
    }

    /// Move the floating vertex.
    ///
    /// In polygon mode with a boundary, returns whether the preview outline
    /// leaves it. Nothing is committed.
    pub fn pointer_move(
        &mut self,
        position: Position,
        boundary: Option<&BoundaryFrame>,
    ) -> Option<PreviewFeedback> {
        let DrawingState::Collecting { mode, points } = &mut self.state else {
            return None;
        };
        let floating = points.last_mut()?;
        *floating = position;

        match (mode, boundary) {
            (DrawMode::Polygon, Some(frame)) => Some(PreviewFeedback {
                out_of_bounds: !frame.contains_all(points),
            }),
            _ => None,
        }
    }

    /// Finish gesture: drop the floating vertex and hand back the result.
    pub fn finish(&mut self) -> Result<DrawingOutcome, EditError> {
        let DrawingState::Collecting { mode, mut points } = std::mem::take(&mut self.state) else {
            return Err(EditError::NotDrawing);
        };
        points.pop();

        if points.len() < mode.kind().min_vertices() {
            tracing::info!(
                "Discarding {} drawing with {} point(s)",
                mode.name(),
                points.len()
            );
            self.publish(DrawingEvent::Discarded {
                points: points.len(),
            });
            return Ok(DrawingOutcome::Discarded {
                points: points.len(),
            });
        }

        Ok(DrawingOutcome::Completed {
            kind: mode.kind(),
            vertices: points,
        })
    }

    /// Abandon the drawing
    pub fn cancel(&mut self) {
        if self.is_collecting() {
            self.state = DrawingState::Idle;
            tracing::debug!("Drawing cancelled");
            self.publish(DrawingEvent::Cancelled);
        }
    }

    fn publish(&self, event: DrawingEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(SceneEvent::Drawing(event));
        }
    }
}
