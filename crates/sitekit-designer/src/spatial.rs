//! Spatial math kernel.
//!
//! Pure functions over Earth-fixed positions and local tangent-plane
//! coordinates. Every measurement in the crate (area, containment, edge
//! picking) goes through here.
//!
//! The local plane is an east/north/up frame anchored at an origin
//! (usually a shape centroid). Over the extent of a building site the
//! flat-plane error is negligible; true geodesic area is not attempted.

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use sitekit_core::Position;

/// Tolerance for degenerate-length checks (meters).
pub const EPSILON: f64 = 1e-9;

/// Origins closer than this to the Earth's center have no usable ENU frame.
const MIN_FRAME_RADIUS: f64 = 1.0;

/// 2D point in a local tangent plane (meters east, meters north).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
}

impl LocalPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &LocalPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &LocalPoint) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// East/north/up frame anchored at an origin position.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlane {
    origin: Position,
    east: Vector3<f64>,
    north: Vector3<f64>,
    up: Vector3<f64>,
}

impl LocalPlane {
    /// Build the tangent frame at `origin`.
    ///
    /// Axes come from the geodetic longitude/latitude of the origin. An
    /// origin at (or near) the Earth's center falls back to the global axes.
    pub fn at(origin: Position) -> Self {
        if origin.vector().norm() < MIN_FRAME_RADIUS {
            return Self {
                origin,
                east: Vector3::x(),
                north: Vector3::y(),
                up: Vector3::z(),
            };
        }

        let geo = origin.to_geodetic();
        let (sin_lon, cos_lon) = geo.longitude.to_radians().sin_cos();
        let (sin_lat, cos_lat) = geo.latitude.to_radians().sin_cos();

        Self {
            origin,
            east: Vector3::new(-sin_lon, cos_lon, 0.0),
            north: Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
            up: Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
        }
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn east(&self) -> Vector3<f64> {
        self.east
    }

    pub fn north(&self) -> Vector3<f64> {
        self.north
    }

    pub fn up(&self) -> Vector3<f64> {
        self.up
    }

    /// Rotation taking local ENU vectors to global vectors (columns are the axes).
    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[self.east, self.north, self.up])
    }

    /// Project onto the plane (drops the up component).
    pub fn to_local(&self, position: &Position) -> LocalPoint {
        let d = position.delta_from(&self.origin);
        LocalPoint::new(d.dot(&self.east), d.dot(&self.north))
    }

    /// Full local ENU coordinates.
    pub fn to_local3(&self, position: &Position) -> Vector3<f64> {
        let d = position.delta_from(&self.origin);
        Vector3::new(d.dot(&self.east), d.dot(&self.north), d.dot(&self.up))
    }

    /// Lift a plane point back to the global frame at zero local height.
    pub fn to_global(&self, local: &LocalPoint) -> Position {
        self.origin
            .offset_by(&(self.east * local.x + self.north * local.y))
    }

    pub fn to_global3(&self, enu: &Vector3<f64>) -> Position {
        self.origin.offset_by(&(self.rotation() * enu))
    }
}

/// Project positions into a tangent plane.
///
/// The plane is anchored at `origin_hint` when given, otherwise at the
/// centroid of `points`.
pub fn project_to_local_plane(
    points: &[Position],
    origin_hint: Option<Position>,
) -> (LocalPlane, Vec<LocalPoint>) {
    let origin = origin_hint
        .or_else(|| Position::centroid(points))
        .unwrap_or(Position::new(0.0, 0.0, 0.0));
    let plane = LocalPlane::at(origin);
    let local = points.iter().map(|p| plane.to_local(p)).collect();
    (plane, local)
}

/// Signed shoelace area, positive for counter-clockwise winding.
pub fn polygon_signed_area(points: &[LocalPoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum / 2.0
}

/// Polygon area (shoelace, including the closing edge). Zero for fewer than 3 points.
pub fn polygon_area(points: &[LocalPoint]) -> f64 {
    polygon_signed_area(points).abs()
}

/// Prism volume. `None` when the shape has no height.
pub fn volume(area: f64, height: Option<f64>) -> Option<f64> {
    height.map(|h| area * h)
}

/// Crossing-number point-in-polygon test.
///
/// Edges are half-open in Y: a vertex exactly at the query's Y counts as
/// below it. For an axis-aligned square this puts points on the left and
/// bottom edges inside and points on the right and top edges outside.
pub fn point_in_polygon(point: &LocalPoint, polygon: &[LocalPoint]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);
        if (yi > point.y) != (yj > point.y) && point.x < xi + (point.y - yi) * (xj - xi) / (yj - yi)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Closest point to `p` on segment `a`-`b` (3D).
pub fn closest_point_on_segment(a: &Position, b: &Position, p: &Position) -> Position {
    let ab = b.delta_from(a);
    let len_sq = ab.norm_squared();
    if len_sq < EPSILON * EPSILON {
        return *a;
    }
    let t = p.delta_from(a).dot(&ab) / len_sq;
    if t <= 0.0 {
        *a
    } else if t >= 1.0 {
        *b
    } else {
        a.offset_by(&(ab * t))
    }
}

/// Closest point to `p` on segment `a`-`b` in a local plane.
pub fn closest_point_on_segment_2d(a: &LocalPoint, b: &LocalPoint, p: &LocalPoint) -> LocalPoint {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < EPSILON * EPSILON {
        return *a;
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    LocalPoint::new(a.x + dx * t, a.y + dy * t)
}

/// Sum of segment lengths along an open polyline.
pub fn polyline_length(points: &[Position]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Perimeter of a closed ring.
pub fn ring_perimeter(points: &[Position]) -> f64 {
    match points {
        [] | [_] => 0.0,
        [first, .., last] => polyline_length(points) + last.distance_to(first),
    }
}

/// Rotate a local ENU vector about the up axis; positive is counter-clockwise.
pub fn rotate_about_up(local: &Vector3<f64>, degrees: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()) * local
}
