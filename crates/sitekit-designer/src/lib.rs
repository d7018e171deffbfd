//! # SiteKit Designer
//!
//! Interactive editing of site plans on the globe: footprint polygons,
//! corridors (roads, paths) and placed objects, checked against a site
//! boundary and rolled up into an occupancy report.
//!
//! ## Core Components
//!
//! ### Geometry
//! - **Spatial kernel**: tangent-plane projection, shoelace area, prism
//!   volume, point-in-polygon, closest point on a segment
//! - **Shapes**: polygons (optionally extruded) and corridors with cached metrics
//! - **Transforms**: position/heading/scale of placed objects, rebuilt on every change
//!
//! ### Interaction
//! - **Edit engine**: one target at a time; vertex drag, insert, delete,
//!   rotate, move, height and width adjustments
//! - **Drawing session**: click-by-click creation with a floating preview vertex
//! - **Plan viewport**: top-down screen projection
//!
//! ### Site rules
//! - **Validation**: all-or-nothing containment in the boundary region
//! - **Occupancy**: occupied area per category and economic roll-up
//!
//! ### Services
//! - **Persistence**: gateway port, memory and JSON file backends, per-key save queue
//! - **Measurement**: advisory remote cross-check with a timeout
//!
//! ## Architecture
//!
//! ```text
//! SiteState
//!   ├── Scene (shapes, objects, boundary, violations, occupancy)
//!   ├── EditEngine ──> Scene
//!   ├── DrawingSession ──> Scene
//!   ├── SaveQueue ──> PersistenceGateway
//!   └── MeasurementService ──> MeasurementDelegate
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitekit_designer::{DrawMode, MemoryGateway, SiteState};
//!
//! let mut site = SiteState::new(Arc::new(MemoryGateway::new()));
//! site.set_boundary(boundary_vertices)?;
//!
//! site.begin_drawing(DrawMode::Polygon);
//! for p in clicks {
//!     site.drawing_click(p)?;
//! }
//! let shape = site.finish_drawing()?;
//! println!("{}", site.report());
//! ```

pub mod drawing;
pub mod editor;
pub mod measurement;
pub mod model;
pub mod persistence;
pub mod scene;
pub mod site;
pub mod spatial;
pub mod transform;
pub mod validation;
pub mod viewport;

pub use drawing::{DrawMode, DrawingOutcome, DrawingSession, DrawingState, PreviewFeedback};
pub use editor::{EditEngine, EditMode, EditSession, EditSettings, ScreenProjector, VertexHandle};
pub use measurement::{
    MeasurementDelegate, MeasurementReport, MeasurementRequest, MeasurementService,
    RemoteMeasurement,
};
pub use model::{PlacedObject, Shape, ShapeKind, ShapeMetrics};
pub use persistence::{
    JsonFileGateway, MemoryGateway, ObjectRecord, PersistenceGateway, SaveOutcome, SaveQueue,
    SceneDocument, SceneRecord, ShapeRecord, DOCUMENT_VERSION,
};
pub use scene::Scene;
pub use site::{ShapeSummary, SiteReport, SiteSettings, SiteState};
pub use spatial::{LocalPlane, LocalPoint};
pub use transform::ObjectTransform;
pub use validation::{
    compute_occupancy, is_shape_fully_contained, BoundaryFrame, Occupancy, OccupancyReport,
    SiteMetrics, ViolationTracker,
};
pub use viewport::PlanViewport;
