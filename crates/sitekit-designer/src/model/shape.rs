//! Footprint and corridor shapes.

use std::cell::OnceCell;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use sitekit_core::{GeometryError, PersistedId, Position, ShapeId, UNASSIGNED_CATEGORY};

use crate::spatial::{self, LocalPlane, LocalPoint};

/// Minimum vertex count of a polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;
/// Minimum vertex count of a corridor centre line.
pub const MIN_CORRIDOR_VERTICES: usize = 2;

/// Geometry kind of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Closed footprint, optionally extruded to a prism.
    Polygon { height: Option<f64> },
    /// Open centre line with a constant width (roads, paths).
    Corridor { width: f64 },
}

impl ShapeKind {
    pub fn polygon() -> Self {
        ShapeKind::Polygon { height: None }
    }

    pub fn min_vertices(&self) -> usize {
        match self {
            ShapeKind::Polygon { .. } => MIN_POLYGON_VERTICES,
            ShapeKind::Corridor { .. } => MIN_CORRIDOR_VERTICES,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Polygon { .. } => "polygon",
            ShapeKind::Corridor { .. } => "corridor",
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, ShapeKind::Polygon { .. })
    }

    /// Whether the last vertex connects back to the first.
    pub fn is_closed(&self) -> bool {
        self.is_polygon()
    }

    fn validate(&self) -> Result<(), GeometryError> {
        match *self {
            ShapeKind::Polygon { height: Some(h) } if !h.is_finite() || h < 0.0 => {
                Err(GeometryError::InvalidHeight(h))
            }
            ShapeKind::Corridor { width } if !width.is_finite() || width <= 0.0 => {
                Err(GeometryError::InvalidWidth(width))
            }
            _ => Ok(()),
        }
    }
}

/// Derived measurements of a shape, in its own tangent plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeMetrics {
    /// Footprint area (m²); centre-line length × width for corridors.
    pub area: f64,
    /// Perimeter for polygons, centre-line length for corridors (m).
    pub length: f64,
    /// Prism volume (m³) when the polygon has a height.
    pub volume: Option<f64>,
}

/// A polygon footprint or corridor in the scene.
///
/// Vertices are private so that every mutation goes through a method that
/// enforces the vertex minimum and drops the cached metrics.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    vertices: Vec<Position>,
    category: String,
    pub name: Option<String>,
    pub persisted_id: Option<PersistedId>,
    pub protected: bool,
    outside_boundary: bool,
    metrics: OnceCell<ShapeMetrics>,
}

impl Shape {
    /// Create a shape, rejecting too few or non-finite vertices
    pub fn new(id: ShapeId, kind: ShapeKind, vertices: Vec<Position>) -> Result<Self, GeometryError> {
        kind.validate()?;
        check_vertices(&kind, &vertices)?;
        Ok(Self {
            id,
            kind,
            vertices,
            category: UNASSIGNED_CATEGORY.to_string(),
            name: None,
            persisted_id: None,
            protected: false,
            outside_boundary: false,
            metrics: OnceCell::new(),
        })
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex(&self, index: usize) -> Option<Position> {
        self.vertices.get(index).copied()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Set the category tag; callers canonicalize against the catalog
    pub fn set_category(&mut self, tag: impl Into<String>) {
        self.category = tag.into();
    }

    pub fn height(&self) -> Option<f64> {
        match self.kind {
            ShapeKind::Polygon { height } => height,
            ShapeKind::Corridor { .. } => None,
        }
    }

    pub fn width(&self) -> Option<f64> {
        match self.kind {
            ShapeKind::Corridor { width } => Some(width),
            ShapeKind::Polygon { .. } => None,
        }
    }

    /// Derived boundary-violation flag
    pub fn is_outside_boundary(&self) -> bool {
        self.outside_boundary
    }

    pub(crate) fn set_outside_boundary(&mut self, outside: bool) {
        self.outside_boundary = outside;
    }

    /// Vertex centroid (simple average)
    pub fn centroid(&self) -> Position {
        Position::centroid(&self.vertices).unwrap_or(Position::new(0.0, 0.0, 0.0))
    }

    /// Edges as `(start, end)` vertex indices; the closing edge only for polygons
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let n = self.vertices.len();
        let mut edges: Vec<(usize, usize)> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        if self.kind.is_closed() && n >= 3 {
            edges.push((n - 1, 0));
        }
        edges
    }

    /// Vertices projected into `plane`
    pub fn local_points(&self, plane: &LocalPlane) -> Vec<LocalPoint> {
        self.vertices.iter().map(|v| plane.to_local(v)).collect()
    }

    /// Derived metrics, computed on first access after a mutation
    pub fn metrics(&self) -> ShapeMetrics {
        *self.metrics.get_or_init(|| self.compute_metrics())
    }

    pub fn area(&self) -> f64 {
        self.metrics().area
    }

    pub fn volume(&self) -> Option<f64> {
        self.metrics().volume
    }

    pub fn set_vertex(&mut self, index: usize, position: Position) -> Result<(), GeometryError> {
        let len = self.vertices.len();
        if index >= len {
            return Err(GeometryError::UnknownHandle { index, len });
        }
        check_finite(&position)?;
        self.vertices[index] = position;
        self.invalidate();
        Ok(())
    }

    /// Insert a vertex before `index` (`index == len` appends)
    pub fn insert_vertex(&mut self, index: usize, position: Position) -> Result<(), GeometryError> {
        let len = self.vertices.len();
        if index > len {
            return Err(GeometryError::UnknownHandle { index, len });
        }
        check_finite(&position)?;
        self.vertices.insert(index, position);
        self.invalidate();
        Ok(())
    }

    /// Remove a vertex; rejected when it would drop below the kind minimum
    pub fn remove_vertex(&mut self, index: usize) -> Result<Position, GeometryError> {
        let len = self.vertices.len();
        if index >= len {
            return Err(GeometryError::UnknownHandle { index, len });
        }
        if len <= self.kind.min_vertices() {
            return Err(GeometryError::InsufficientVertices {
                kind: self.kind.name().to_string(),
                required: self.kind.min_vertices(),
                actual: len - 1,
            });
        }
        let removed = self.vertices.remove(index);
        self.invalidate();
        Ok(removed)
    }

    /// Replace every vertex at once
    pub fn set_vertices(&mut self, vertices: Vec<Position>) -> Result<(), GeometryError> {
        check_vertices(&self.kind, &vertices)?;
        self.vertices = vertices;
        self.invalidate();
        Ok(())
    }

    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for v in &mut self.vertices {
            *v = v.offset_by(offset);
        }
        self.invalidate();
    }

    /// Set the extrusion height of a polygon
    pub fn set_height(&mut self, height: Option<f64>) -> Result<(), GeometryError> {
        let kind = match self.kind {
            ShapeKind::Polygon { .. } => ShapeKind::Polygon { height },
            ShapeKind::Corridor { .. } => {
                return Err(GeometryError::KindMismatch {
                    attribute: "height".to_string(),
                    kind: self.kind.name().to_string(),
                })
            }
        };
        kind.validate()?;
        self.kind = kind;
        self.invalidate();
        Ok(())
    }

    /// Set the width of a corridor
    pub fn set_width(&mut self, width: f64) -> Result<(), GeometryError> {
        let kind = match self.kind {
            ShapeKind::Corridor { .. } => ShapeKind::Corridor { width },
            ShapeKind::Polygon { .. } => {
                return Err(GeometryError::KindMismatch {
                    attribute: "width".to_string(),
                    kind: self.kind.name().to_string(),
                })
            }
        };
        kind.validate()?;
        self.kind = kind;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.metrics.take();
    }

    fn compute_metrics(&self) -> ShapeMetrics {
        match self.kind {
            ShapeKind::Polygon { height } => {
                let (_, local) = spatial::project_to_local_plane(&self.vertices, None);
                let area = spatial::polygon_area(&local);
                ShapeMetrics {
                    area,
                    length: spatial::ring_perimeter(&self.vertices),
                    volume: spatial::volume(area, height),
                }
            }
            ShapeKind::Corridor { width } => {
                let length = spatial::polyline_length(&self.vertices);
                ShapeMetrics {
                    area: length * width,
                    length,
                    volume: None,
                }
            }
        }
    }
}

fn check_finite(position: &Position) -> Result<(), GeometryError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinite("vertex".to_string()))
    }
}

fn check_vertices(kind: &ShapeKind, vertices: &[Position]) -> Result<(), GeometryError> {
    if vertices.len() < kind.min_vertices() {
        return Err(GeometryError::InsufficientVertices {
            kind: kind.name().to_string(),
            required: kind.min_vertices(),
            actual: vertices.len(),
        });
    }
    vertices.iter().try_for_each(check_finite)
}
