//! Boundary containment and site occupancy.
//!
//! Containment is all-or-nothing: a shape with any vertex outside the
//! boundary region counts as a violation. Occupancy projects the boundary
//! once and measures every polygon in that single plane so the numbers
//! add up consistently.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use sitekit_core::{CategoryCatalog, EventBus, Position, SceneEvent, ShapeId, ValidationEvent};

use crate::model::{Shape, ShapeKind};
use crate::spatial::{self, LocalPlane, LocalPoint, EPSILON};

/// A boundary polygon projected into its own tangent plane.
///
/// Built once per operation and reused for every containment query.
#[derive(Debug, Clone)]
pub struct BoundaryFrame {
    plane: LocalPlane,
    polygon: Vec<LocalPoint>,
}

impl BoundaryFrame {
    pub fn new(boundary: &Shape) -> Self {
        let (plane, polygon) = spatial::project_to_local_plane(boundary.vertices(), None);
        Self { plane, polygon }
    }

    pub fn plane(&self) -> &LocalPlane {
        &self.plane
    }

    pub fn area(&self) -> f64 {
        spatial::polygon_area(&self.polygon)
    }

    pub fn contains(&self, position: &Position) -> bool {
        spatial::point_in_polygon(&self.plane.to_local(position), &self.polygon)
    }

    /// True only if every position is inside
    pub fn contains_all(&self, positions: &[Position]) -> bool {
        !positions.is_empty() && positions.iter().all(|p| self.contains(p))
    }
}

/// Whether every vertex of `shape` lies inside `boundary`.
pub fn is_shape_fully_contained(shape: &Shape, boundary: &Shape) -> bool {
    BoundaryFrame::new(boundary).contains_all(shape.vertices())
}

/// User-facing warning text for `count` violating shapes.
pub fn warning_message(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 shape is outside the site boundary".to_string()),
        n => Some(format!("{} shapes are outside the site boundary", n)),
    }
}

/// Aggregates per-shape violation flags into one warning.
#[derive(Debug, Default)]
pub struct ViolationTracker {
    violators: BTreeSet<ShapeId>,
    bus: Option<Arc<EventBus>>,
}

impl ViolationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bus(bus: Arc<EventBus>) -> Self {
        Self {
            violators: BTreeSet::new(),
            bus: Some(bus),
        }
    }

    /// Record the containment result for a shape.
    ///
    /// Returns true when the shape's flag changed.
    pub fn mark(&mut self, id: ShapeId, violated: bool) -> bool {
        let changed = if violated {
            self.violators.insert(id)
        } else {
            self.violators.remove(&id)
        };

        if changed {
            tracing::debug!("{} containment changed: outside={}", id, violated);
            self.publish(SceneEvent::Validation(ValidationEvent::ContainmentChanged {
                shape: id,
                contained: !violated,
            }));
            self.publish_warning();
        }
        changed
    }

    /// Drop a deleted shape from the aggregate.
    pub fn forget(&mut self, id: ShapeId) {
        if self.violators.remove(&id) {
            self.publish_warning();
        }
    }

    pub fn clear(&mut self) {
        if !self.violators.is_empty() {
            self.violators.clear();
            self.publish_warning();
        }
    }

    pub fn count(&self) -> usize {
        self.violators.len()
    }

    pub fn is_violating(&self, id: ShapeId) -> bool {
        self.violators.contains(&id)
    }

    pub fn message(&self) -> Option<String> {
        warning_message(self.count())
    }

    pub fn violators(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.violators.iter().copied()
    }

    fn publish_warning(&self) {
        let event = match self.message() {
            Some(message) => {
                tracing::warn!("{}", message);
                ValidationEvent::BoundaryWarning {
                    count: self.count(),
                    message,
                }
            }
            None => ValidationEvent::WarningCleared,
        };
        self.publish(SceneEvent::Validation(event));
    }

    fn publish(&self, event: SceneEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }
}

/// Economic roll-up of an occupancy report.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SiteMetrics {
    pub cost: f64,
    pub income: f64,
    pub people: f64,
    /// Area-weighted average livability, 0 when nothing is built.
    pub livability_score: f64,
}

/// Occupied area against the boundary, by category.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyReport {
    pub boundary_area: f64,
    pub occupied_area: f64,
    /// `occupied / boundary * 100`, 0 for a zero-area boundary.
    pub percentage: f64,
    pub by_category: BTreeMap<String, f64>,
    pub shape_count: usize,
}

impl OccupancyReport {
    /// Sum catalog rates (per m²) over the occupied area of each category.
    pub fn site_metrics(&self, catalog: &CategoryCatalog) -> SiteMetrics {
        let mut metrics = SiteMetrics::default();
        let mut weighted_livability = 0.0;

        for (tag, area) in &self.by_category {
            let category = catalog.resolve(Some(tag));
            metrics.cost += category.cost * area;
            metrics.income += category.income * area;
            metrics.people += category.people * area;
            weighted_livability += category.livability_score * area;
        }

        if self.occupied_area > EPSILON {
            metrics.livability_score = weighted_livability / self.occupied_area;
        }
        metrics
    }
}

/// Result of an occupancy computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Occupancy {
    /// No boundary region is loaded.
    NotComputable,
    Computed(OccupancyReport),
}

impl Occupancy {
    pub fn report(&self) -> Option<&OccupancyReport> {
        match self {
            Occupancy::Computed(report) => Some(report),
            Occupancy::NotComputable => None,
        }
    }
}

/// Aggregate the footprint of `shapes` against `boundary`.
///
/// Polygons are measured in the boundary's plane; corridors contribute
/// centre-line length × width. Shapes below their vertex minimum and the
/// boundary itself are skipped.
pub fn compute_occupancy<'a>(
    boundary: Option<&Shape>,
    shapes: impl IntoIterator<Item = &'a Shape>,
) -> Occupancy {
    let Some(boundary) = boundary else {
        return Occupancy::NotComputable;
    };

    let frame = BoundaryFrame::new(boundary);
    let boundary_area = frame.area();
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    let mut occupied_area = 0.0;
    let mut shape_count = 0;

    for shape in shapes {
        if shape.id() == boundary.id() || shape.vertex_count() < shape.kind().min_vertices() {
            continue;
        }

        let area = match shape.kind() {
            ShapeKind::Polygon { .. } => {
                spatial::polygon_area(&shape.local_points(frame.plane()))
            }
            ShapeKind::Corridor { .. } => shape.area(),
        };

        occupied_area += area;
        shape_count += 1;
        *by_category.entry(shape.category().to_string()).or_insert(0.0) += area;
    }

    let percentage = if boundary_area > EPSILON {
        occupied_area / boundary_area * 100.0
    } else {
        0.0
    };

    Occupancy::Computed(OccupancyReport {
        boundary_area,
        occupied_area,
        percentage,
        by_category,
        shape_count,
    })
}
