//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use sitekit_designer::{LocalPlane, LocalPoint};
use sitekit_core::Position;

/// Göteborg, roughly.
pub const ORIGIN_LON: f64 = 11.97;
pub const ORIGIN_LAT: f64 = 57.7;

pub fn plane() -> LocalPlane {
    LocalPlane::at(Position::from_degrees(ORIGIN_LON, ORIGIN_LAT, 0.0))
}

/// Position `x` m east and `y` m north of the origin
pub fn at(x: f64, y: f64) -> Position {
    plane().to_global(&LocalPoint::new(x, y))
}

/// Local coordinates of a position in the fixture plane
pub fn local(position: &Position) -> LocalPoint {
    plane().to_local(position)
}

/// Axis-aligned rectangle, counterclockwise from the south-west corner
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Position> {
    vec![at(x0, y0), at(x1, y0), at(x1, y1), at(x0, y1)]
}

pub fn square(x: f64, y: f64, side: f64) -> Vec<Position> {
    rect(x, y, x + side, y + side)
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}
