//! # SiteKit
//!
//! Geometry editing for site plans on the globe.
//!
//! ## Architecture
//!
//! SiteKit is organized as a workspace with multiple crates:
//!
//! 1. **sitekit-core** - Positions, ids, category catalog, units, errors, events
//! 2. **sitekit-designer** - Spatial kernel, scene, edit engine, drawing,
//!    validation, occupancy, persistence and measurement services
//! 3. **sitekit-settings** - Configuration files
//! 4. **sitekit** - This crate: wiring, logging and the command-line report
//!
//! ## Features
//!
//! - **Geodesic-safe measurement**: areas and volumes in a local tangent plane
//! - **Interactive editing**: vertex drag/insert/delete, rotate, move, extrude
//! - **Site rules**: boundary containment and occupancy by land-use category
//! - **Persistence**: per-entity serialized saves through a gateway

use std::sync::Arc;
use std::time::Duration;

pub use sitekit_designer as designer;
pub use sitekit_settings as settings;

pub use sitekit_core::{
    Category, CategoryCatalog, EditError, Error, EventBus, GeometryError, MeasurementSystem,
    ObjectId, Position, Result, SceneEvent, SceneKey, ShapeId,
};
pub use sitekit_designer::{
    DrawMode, EditEngine, JsonFileGateway, MemoryGateway, Occupancy, PersistenceGateway,
    PlanViewport, Scene, Shape, ShapeKind, SiteReport, SiteSettings, SiteState,
};
pub use sitekit_settings::SiteConfig;

use sitekit_designer::EditSettings;

/// Map a configuration onto the designer's session settings
pub fn site_settings(config: &SiteConfig) -> SiteSettings {
    let editing = &config.editing;
    SiteSettings {
        edit: EditSettings {
            insert_tolerance_px: editing.insert_tolerance_px,
            min_corridor_width_m: editing.min_corridor_width_m,
        },
        min_vertex_spacing_m: editing.min_vertex_spacing_m,
        rotation_step_deg: editing.rotation_step_deg,
        height_step_m: editing.height_step_m,
        measurement_timeout: Duration::from_millis(config.measurement.timeout_ms),
        divergence_tolerance: config.measurement.divergence_tolerance,
        measurement_system: config.display.measurement_system,
        decimals: config.display.decimals,
    }
}

/// Site session backed by the configured data file
pub fn open_site(config: &SiteConfig) -> SiteState {
    let gateway: Arc<dyn PersistenceGateway> =
        Arc::new(JsonFileGateway::new(&config.persistence.data_file));
    SiteState::with_settings(
        gateway,
        site_settings(config),
        config.catalog(),
        EventBus::shared(),
    )
}

/// Initialize logging with tracing
///
/// Sets up structured logging with:
/// - Console output with target, level and line numbers
/// - RUST_LOG environment variable support (default level INFO)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
