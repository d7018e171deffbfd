//! Mutating operations of the edit engine.

use nalgebra::Vector3;
use sitekit_core::{EditError, EditEvent, GeometryError, Position, Result, SceneKey};

use super::types::{EditMode, ScreenProjector};
use super::EditEngine;
use crate::scene::Scene;
use crate::spatial::{self, LocalPlane};

impl EditEngine {
    /// Move one vertex handle to `position` (one drag tick).
    pub fn drag_vertex(&mut self, scene: &mut Scene, handle: usize, position: Position) -> Result<()> {
        let id = self
            .writable_shape(scene, "drag_vertex")
            .map_err(|e| self.rejected(e))?;
        match self.mode() {
            Some(EditMode::Editing) | Some(EditMode::DraggingVertex { .. }) => {}
            Some(mode) => {
                return Err(self.rejected(EditError::InvalidTransition {
                    current: mode.name().to_string(),
                    requested: "draggingVertex".to_string(),
                }))
            }
            None => return Err(self.rejected(EditError::NoSession)),
        }

        scene
            .shape_mut(id)
            .map_err(|e| self.rejected(e))?
            .set_vertex(handle, position)
            .map_err(|e| self.rejected(e))?;

        scene.shape_changed(id);
        if let Some(session) = self.session_mut() {
            session.mode = EditMode::DraggingVertex { handle };
            session.changed = true;
            if let Some(h) = session.handles.get_mut(handle) {
                h.position = position;
            }
        }
        tracing::debug!("Vertex {} of {} moved", handle, id);
        self.publish(EditEvent::VertexMoved { shape: id, index: handle });
        Ok(())
    }

    /// Insert a vertex on the edge closest to the pointer in screen space.
    ///
    /// Every edge (including the closing edge of polygons) is tested by
    /// projecting the point on it nearest to `pointer`. The first edge wins
    /// ties. Returns the index of the new vertex.
    pub fn insert_vertex_nearest_edge(
        &mut self,
        scene: &mut Scene,
        pointer: &Position,
        pointer_screen: (f64, f64),
        projector: &dyn ScreenProjector,
    ) -> Result<usize> {
        let id = self
            .writable_shape(scene, "insert_vertex")
            .map_err(|e| self.rejected(e))?;
        self.require_editing("insert_vertex")
            .map_err(|e| self.rejected(e))?;

        let shape = scene.get_shape(id).map_err(|e| self.rejected(e))?;
        let vertices = shape.vertices();
        let (sx, sy) = pointer_screen;

        let mut best: Option<(usize, Position)> = None;
        let mut best_distance_sq = f64::INFINITY;
        for (start, end) in shape.edges() {
            let candidate = spatial::closest_point_on_segment(&vertices[start], &vertices[end], pointer);
            let Some((x, y)) = projector.project(&candidate) else {
                continue;
            };
            let distance_sq = (x - sx).powi(2) + (y - sy).powi(2);
            if distance_sq < best_distance_sq {
                best_distance_sq = distance_sq;
                best = Some((start, candidate));
            }
        }

        let tolerance = self.settings().insert_tolerance_px;
        let (start, candidate) = match best {
            Some(found) if best_distance_sq <= tolerance * tolerance => found,
            _ => {
                return Err(self.rejected(GeometryError::NoEdgeWithinTolerance {
                    nearest_px: best_distance_sq.sqrt(),
                    tolerance_px: tolerance,
                }))
            }
        };

        let index = start + 1;
        scene
            .shape_mut(id)
            .map_err(|e| self.rejected(e))?
            .insert_vertex(index, candidate)
            .map_err(|e| self.rejected(e))?;
        self.after_shape_change(scene, id);

        tracing::debug!("Inserted vertex {} on {}", index, id);
        self.publish(EditEvent::VertexInserted { shape: id, index });
        Ok(index)
    }

    /// Remove a vertex; rejected below the kind minimum.
    pub fn delete_vertex(&mut self, scene: &mut Scene, handle: usize) -> Result<Position> {
        let id = self
            .writable_shape(scene, "delete_vertex")
            .map_err(|e| self.rejected(e))?;
        self.require_editing("delete_vertex")
            .map_err(|e| self.rejected(e))?;

        let removed = scene
            .shape_mut(id)
            .map_err(|e| self.rejected(e))?
            .remove_vertex(handle)
            .map_err(|e| self.rejected(e))?;
        self.after_shape_change(scene, id);

        tracing::debug!("Deleted vertex {} of {}", handle, id);
        self.publish(EditEvent::VertexDeleted { shape: id, index: handle });
        Ok(removed)
    }

    /// Rotate the target counterclockwise (seen from above) by `degrees`.
    ///
    /// Shapes turn about their vertex centroid in its tangent plane; objects
    /// turn their heading, which is measured clockwise.
    pub fn rotate(&mut self, scene: &mut Scene, degrees: f64) -> Result<()> {
        let target = self
            .writable(scene)
            .map(|s| s.target)
            .map_err(|e| self.rejected(e))?;
        self.require_editing("rotate")
            .map_err(|e| self.rejected(e))?;
        if !degrees.is_finite() {
            return Err(self.rejected(GeometryError::NonFinite("rotation".to_string())));
        }

        match target {
            SceneKey::Shape(id) => {
                let shape = scene.shape_mut(id).map_err(|e| self.rejected(e))?;
                let plane = LocalPlane::at(shape.centroid());
                let rotated: Vec<Position> = shape
                    .vertices()
                    .iter()
                    .map(|v| plane.to_global3(&spatial::rotate_about_up(&plane.to_local3(v), degrees)))
                    .collect();
                shape.set_vertices(rotated).map_err(|e| self.rejected(e))?;
                self.after_shape_change(scene, id);
            }
            SceneKey::Object(id) => {
                scene
                    .object_mut(id)
                    .map_err(|e| self.rejected(e))?
                    .rotate(-degrees);
                self.mark_changed();
            }
        }

        tracing::debug!("Rotated {} by {}°", target, degrees);
        self.publish(EditEvent::Rotated { target, degrees });
        Ok(())
    }

    /// Translate the whole target by `offset` (global frame, meters).
    pub fn move_whole(&mut self, scene: &mut Scene, offset: &Vector3<f64>) -> Result<()> {
        self.require_editing("move_whole")
            .map_err(|e| self.rejected(e))?;
        self.translate_target(scene, offset)
    }

    /// Start dragging the whole shape from `anchor`
    pub fn begin_whole_drag(&mut self, scene: &Scene, anchor: Position) -> Result<()> {
        self.writable_shape(scene, "begin_whole_drag")
            .map_err(|e| self.rejected(e))?;
        self.require_editing("draggingWhole")
            .map_err(|e| self.rejected(e))?;
        if let Some(session) = self.session_mut() {
            session.mode = EditMode::DraggingWhole { last: anchor };
        }
        Ok(())
    }

    /// Drag tick: translate by the pointer motion since the previous tick
    pub fn drag_whole_to(&mut self, scene: &mut Scene, pointer: Position) -> Result<()> {
        let last = match self.mode() {
            Some(EditMode::DraggingWhole { last }) => last,
            Some(mode) => {
                return Err(self.rejected(EditError::InvalidTransition {
                    current: mode.name().to_string(),
                    requested: "drag_whole_to".to_string(),
                }))
            }
            None => return Err(self.rejected(EditError::NoSession)),
        };

        self.translate_target(scene, &pointer.delta_from(&last))?;
        if let Some(session) = self.session_mut() {
            session.mode = EditMode::DraggingWhole { last: pointer };
        }
        Ok(())
    }

    /// Start dragging a placed object from `anchor`
    pub fn begin_object_drag(&mut self, scene: &Scene, anchor: Position) -> Result<()> {
        let id = self
            .writable_object(scene, "begin_object_drag")
            .map_err(|e| self.rejected(e))?;
        self.require_editing("draggingObject")
            .map_err(|e| self.rejected(e))?;
        let start = scene
            .get_object(id)
            .map_err(|e| self.rejected(e))?
            .position();
        if let Some(session) = self.session_mut() {
            session.mode = EditMode::DraggingObject { anchor, start };
        }
        Ok(())
    }

    /// Drag tick: place the object at its start offset by the pointer motion
    pub fn drag_object_to(&mut self, scene: &mut Scene, pointer: Position) -> Result<()> {
        let id = self
            .writable_object(scene, "drag_object_to")
            .map_err(|e| self.rejected(e))?;
        let (anchor, start) = match self.mode() {
            Some(EditMode::DraggingObject { anchor, start }) => (anchor, start),
            Some(mode) => {
                return Err(self.rejected(EditError::InvalidTransition {
                    current: mode.name().to_string(),
                    requested: "drag_object_to".to_string(),
                }))
            }
            None => return Err(self.rejected(EditError::NoSession)),
        };

        let position = start.offset_by(&pointer.delta_from(&anchor));
        scene
            .object_mut(id)
            .map_err(|e| self.rejected(e))?
            .set_position(position);
        self.mark_changed();
        self.publish(EditEvent::Moved {
            target: SceneKey::Object(id),
        });
        Ok(())
    }

    /// Change a polygon's extrusion height by `delta`, clamped at 0.
    ///
    /// Returns the new height.
    pub fn adjust_extrusion_height(&mut self, scene: &mut Scene, delta: f64) -> Result<f64> {
        let id = self
            .writable_shape(scene, "adjust_extrusion_height")
            .map_err(|e| self.rejected(e))?;
        self.require_editing("adjust_extrusion_height")
            .map_err(|e| self.rejected(e))?;

        let shape = scene.shape_mut(id).map_err(|e| self.rejected(e))?;
        let height = (shape.height().unwrap_or(0.0) + delta).max(0.0);
        shape
            .set_height(Some(height))
            .map_err(|e| self.rejected(e))?;
        self.after_shape_change(scene, id);

        tracing::debug!("Height of {} set to {:.2} m", id, height);
        self.publish(EditEvent::HeightChanged { shape: id, height });
        Ok(height)
    }

    /// Change a corridor's width by `delta`, clamped at the configured minimum.
    pub fn adjust_corridor_width(&mut self, scene: &mut Scene, delta: f64) -> Result<f64> {
        let id = self
            .writable_shape(scene, "adjust_corridor_width")
            .map_err(|e| self.rejected(e))?;
        self.require_editing("adjust_corridor_width")
            .map_err(|e| self.rejected(e))?;

        let min_width = self.settings().min_corridor_width_m;
        let shape = scene.shape_mut(id).map_err(|e| self.rejected(e))?;
        let Some(current) = shape.width() else {
            return Err(self.rejected(GeometryError::KindMismatch {
                attribute: "width".to_string(),
                kind: shape.kind().name().to_string(),
            }));
        };
        let width = (current + delta).max(min_width);
        shape.set_width(width).map_err(|e| self.rejected(e))?;
        self.after_shape_change(scene, id);

        tracing::debug!("Width of {} set to {:.2} m", id, width);
        self.publish(EditEvent::WidthChanged { shape: id, width });
        Ok(width)
    }

    pub fn set_object_scale(&mut self, scene: &mut Scene, scale: f64) -> Result<()> {
        let id = self
            .writable_object(scene, "set_object_scale")
            .map_err(|e| self.rejected(e))?;
        self.require_editing("set_object_scale")
            .map_err(|e| self.rejected(e))?;

        scene
            .object_mut(id)
            .map_err(|e| self.rejected(e))?
            .set_scale(scale)
            .map_err(|e| self.rejected(e))?;
        self.mark_changed();
        self.publish(EditEvent::ObjectScaled { object: id, scale });
        Ok(())
    }

    fn translate_target(&mut self, scene: &mut Scene, offset: &Vector3<f64>) -> Result<()> {
        let target = self
            .writable(scene)
            .map(|s| s.target)
            .map_err(|e| self.rejected(e))?;
        if !offset.iter().all(|c| c.is_finite()) {
            return Err(self.rejected(GeometryError::NonFinite("offset".to_string())));
        }

        match target {
            SceneKey::Shape(id) => {
                scene
                    .shape_mut(id)
                    .map_err(|e| self.rejected(e))?
                    .translate(offset);
                self.after_shape_change(scene, id);
            }
            SceneKey::Object(id) => {
                let object = scene.object_mut(id).map_err(|e| self.rejected(e))?;
                let position = object.position().offset_by(offset);
                object.set_position(position);
                self.mark_changed();
            }
        }

        tracing::debug!("Moved {} by {:.3} m", target, offset.norm());
        self.publish(EditEvent::Moved { target });
        Ok(())
    }
}
