//! Data models for positions and scene identifiers
//!
//! This module provides:
//! - Earth-fixed Cartesian positions (ECEF, meters) with WGS84 geodetic conversion
//! - Local scene identifiers for shapes and placed objects
//! - Persisted identifiers assigned by the storage backend
//! - The category catalog

pub mod catalog;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// WGS84 semi-major axis in meters
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 first eccentricity squared
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Geographic coordinate on the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geodetic {
    /// Longitude in degrees, east positive
    pub longitude: f64,
    /// Latitude in degrees, north positive
    pub latitude: f64,
    /// Height above the ellipsoid in meters
    pub height: f64,
}

impl Geodetic {
    /// Create a geodetic coordinate from degrees and meters
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }
}

impl fmt::Display for Geodetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.7}°, {:.7}°, {:.2}m)",
            self.longitude, self.latitude, self.height
        )
    }
}

/// A point in the global Earth-fixed Cartesian frame (meters)
///
/// Positions are immutable values; every edit produces a new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Create a position from Earth-fixed coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create a position from longitude/latitude in degrees and height in meters
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::from_geodetic(&Geodetic::new(longitude, latitude, height))
    }

    /// Convert a geodetic coordinate to Earth-fixed Cartesian
    pub fn from_geodetic(geo: &Geodetic) -> Self {
        let lon = geo.longitude.to_radians();
        let lat = geo.latitude.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

        Self {
            x: (n + geo.height) * cos_lat * cos_lon,
            y: (n + geo.height) * cos_lat * sin_lon,
            z: (n * (1.0 - WGS84_E2) + geo.height) * sin_lat,
        }
    }

    /// Convert to longitude/latitude/height
    ///
    /// Uses a fixed-point iteration on latitude; converges to sub-millimeter
    /// accuracy within a handful of steps for terrestrial points.
    pub fn to_geodetic(&self) -> Geodetic {
        let p = (self.x * self.x + self.y * self.y).sqrt();
        let longitude = self.y.atan2(self.x).to_degrees();

        if p < 1e-9 {
            // On the polar axis (or the Earth's center)
            let b = WGS84_A * (1.0 - WGS84_F);
            let latitude = if self.z > 0.0 {
                90.0
            } else if self.z < 0.0 {
                -90.0
            } else {
                0.0
            };
            let height = if self.z == 0.0 { -WGS84_A } else { self.z.abs() - b };
            return Geodetic::new(0.0, latitude, height);
        }

        let mut lat = self.z.atan2(p * (1.0 - WGS84_E2));
        let mut height = 0.0;
        for _ in 0..8 {
            let sin_lat = lat.sin();
            let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
            height = p / lat.cos() - n;
            lat = self.z.atan2(p * (1.0 - WGS84_E2 * n / (n + height)));
        }

        Geodetic::new(longitude, lat.to_degrees(), height)
    }

    /// Coordinates as a vector
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Build a position from a vector
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Translate by an offset vector
    pub fn offset_by(&self, offset: &Vector3<f64>) -> Self {
        Self::from_vector(&(self.vector() + offset))
    }

    /// Vector from `other` to `self`
    pub fn delta_from(&self, other: &Position) -> Vector3<f64> {
        self.vector() - other.vector()
    }

    /// Straight-line distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.delta_from(other).norm()
    }

    /// Check all components are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component-wise comparison within a tolerance (meters)
    pub fn approx_eq(&self, other: &Position, tolerance: f64) -> bool {
        self.distance_to(other) <= tolerance
    }

    /// Simple average of a set of positions
    ///
    /// Returns `None` for an empty slice.
    pub fn centroid(points: &[Position]) -> Option<Position> {
        if points.is_empty() {
            return None;
        }
        let sum = points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.vector());
        Some(Self::from_vector(&(sum / points.len() as f64)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}, {:.3}]", self.x, self.y, self.z)
    }
}

/// Local identifier of a shape within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// Local identifier of a placed object within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Anything that can be edited or persisted on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SceneKey {
    Shape(ShapeId),
    Object(ObjectId),
}

impl SceneKey {
    /// The shape id, if this key names a shape
    pub fn shape(&self) -> Option<ShapeId> {
        match self {
            SceneKey::Shape(id) => Some(*id),
            SceneKey::Object(_) => None,
        }
    }

    /// The object id, if this key names a placed object
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            SceneKey::Object(id) => Some(*id),
            SceneKey::Shape(_) => None,
        }
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneKey::Shape(id) => id.fmt(f),
            SceneKey::Object(id) => id.fmt(f),
        }
    }
}

impl From<ShapeId> for SceneKey {
    fn from(id: ShapeId) -> Self {
        SceneKey::Shape(id)
    }
}

impl From<ObjectId> for SceneKey {
    fn from(id: ObjectId) -> Self {
        SceneKey::Object(id)
    }
}

/// Identifier assigned by the persistence backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersistedId(pub String);

impl PersistedId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
