//! Placed-object transform controller.
//!
//! The effective transform is always recomposed from the canonical
//! `(position, heading, scale)` triple; it is never updated incrementally.

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use sitekit_core::{GeometryError, Position};

use crate::spatial::LocalPlane;

/// Wrap an angle in degrees to `[0, 360)`.
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Position, heading and uniform scale of a placed object.
///
/// Heading is in degrees clockwise from north, stored unwrapped so that
/// repeated small rotations stay continuous.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTransform {
    position: Position,
    heading: f64,
    scale: f64,
    matrix: Matrix4<f64>,
}

impl ObjectTransform {
    /// Identity orientation at `position`
    pub fn new(position: Position) -> Self {
        let mut t = Self {
            position,
            heading: 0.0,
            scale: 1.0,
            matrix: Matrix4::identity(),
        };
        t.recompose();
        t
    }

    pub fn with(position: Position, heading: f64, scale: f64) -> Result<Self, GeometryError> {
        if !heading.is_finite() {
            return Err(GeometryError::NonFinite("heading".to_string()));
        }
        Self::check_scale(scale)?;
        let mut t = Self {
            position,
            heading,
            scale,
            matrix: Matrix4::identity(),
        };
        t.recompose();
        Ok(t)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Heading wrapped to `[0, 360)` for display
    pub fn heading(&self) -> f64 {
        wrap_degrees(self.heading)
    }

    /// Running heading without wrapping
    pub fn unwrapped_heading(&self) -> f64 {
        self.heading
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Model-to-world matrix (ECEF meters)
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        self.recompose();
    }

    pub fn set_heading(&mut self, degrees: f64) {
        self.heading = degrees;
        self.recompose();
    }

    /// Add to the heading; positive turns clockwise seen from above
    pub fn rotate(&mut self, delta_degrees: f64) {
        self.heading += delta_degrees;
        self.recompose();
    }

    /// Set the uniform scale; must be finite and positive
    pub fn set_scale(&mut self, scale: f64) -> Result<(), GeometryError> {
        Self::check_scale(scale)?;
        self.scale = scale;
        self.recompose();
        Ok(())
    }

    /// Map a model-space point (east/north/up meters before scaling) to the world
    pub fn transform_point(&self, model: &Vector3<f64>) -> Position {
        let p = self.matrix.transform_point(&Point3::from(*model));
        Position::new(p.x, p.y, p.z)
    }

    fn check_scale(scale: f64) -> Result<(), GeometryError> {
        if scale.is_finite() && scale > 0.0 {
            Ok(())
        } else {
            Err(GeometryError::InvalidScale(scale))
        }
    }

    fn recompose(&mut self) {
        let frame = LocalPlane::at(self.position).rotation();
        // Clockwise-from-north heading is a negative turn about up
        let heading =
            Rotation3::from_axis_angle(&Vector3::z_axis(), -self.heading.to_radians());

        let translation = Matrix4::new_translation(&self.position.vector());
        let orientation = (frame * heading.matrix()).to_homogeneous();
        let scale = Matrix4::new_scaling(self.scale);

        self.matrix = translation * orientation * scale;
    }
}
