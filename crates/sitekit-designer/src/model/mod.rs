//! Scene entities: shapes and placed objects.

mod placed_object;
mod shape;

pub use placed_object::PlacedObject;
pub use shape::{Shape, ShapeKind, ShapeMetrics, MIN_CORRIDOR_VERTICES, MIN_POLYGON_VERTICES};
