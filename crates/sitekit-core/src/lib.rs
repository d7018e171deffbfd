//! # SiteKit Core
//!
//! Core types and utilities shared by the SiteKit crates.
//! Provides Earth-fixed positions, scene identifiers, the category
//! catalog, unit formatting, the error taxonomy and the scene event bus.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod units;

pub use data::{
    catalog::{Category, CategoryCatalog, UNASSIGNED_CATEGORY},
    Geodetic, ObjectId, PersistedId, Position, SceneKey, ShapeId,
};

pub use error::{ConnectivityError, EditError, Error, GeometryError, Result, SceneError};

pub use event_bus::{
    DrawingEvent, EditEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    MeasurementEvent, OccupancyEvent, PersistenceEvent, SceneEvent, SubscriptionId,
    ValidationEvent,
};

pub use units::{format_area, format_length, format_volume, MeasurementSystem};
