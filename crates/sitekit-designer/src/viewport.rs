//! Top-down plan viewport.
//!
//! Maps between screen pixels and world positions through a local tangent
//! plane. Manages zoom (pixels per meter) and pan.

use std::fmt;

use sitekit_core::Position;

use crate::editor::ScreenProjector;
use crate::spatial::{LocalPlane, LocalPoint};

const MIN_ZOOM: f64 = 0.01;
const MAX_ZOOM: f64 = 1000.0;
const ZOOM_STEP: f64 = 1.2;
/// Positions further below the plane than this are on the far side of the globe.
const DEPTH_CLIP: f64 = 100_000.0;

/// Orthographic view of a site, north up.
#[derive(Debug, Clone)]
pub struct PlanViewport {
    plane: LocalPlane,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    canvas_width: f64,
    canvas_height: f64,
}

impl PlanViewport {
    /// Creates a viewport centred on `origin` at 1 px/m.
    pub fn new(origin: Position, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            plane: LocalPlane::at(origin),
            zoom: 1.0,
            pan_x: canvas_width / 2.0,
            pan_y: canvas_height / 2.0,
            canvas_width,
            canvas_height,
        }
    }

    pub fn plane(&self) -> &LocalPlane {
        &self.plane
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    /// Pixels per meter
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level; values outside the supported range are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > MIN_ZOOM && zoom < MAX_ZOOM {
            self.zoom = zoom;
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Converts pixel coordinates (origin top-left, Y down) to plane meters.
    ///
    /// ```text
    /// east  = (pixel_x - pan_x) / zoom
    /// north = (canvas_height - pixel_y - pan_y) / zoom
    /// ```
    pub fn pixel_to_local(&self, pixel_x: f64, pixel_y: f64) -> LocalPoint {
        LocalPoint::new(
            (pixel_x - self.pan_x) / self.zoom,
            (self.canvas_height - pixel_y - self.pan_y) / self.zoom,
        )
    }

    pub fn local_to_pixel(&self, local: &LocalPoint) -> (f64, f64) {
        (
            local.x * self.zoom + self.pan_x,
            self.canvas_height - (local.y * self.zoom + self.pan_y),
        )
    }

    /// The ground position under a pixel
    pub fn pixel_to_world(&self, pixel_x: f64, pixel_y: f64) -> Position {
        self.plane.to_global(&self.pixel_to_local(pixel_x, pixel_y))
    }

    pub fn world_to_pixel(&self, position: &Position) -> (f64, f64) {
        self.local_to_pixel(&self.plane.to_local(position))
    }

    /// Fit `positions` into the canvas, reserving `padding` (0.0 - 0.5) on each side.
    pub fn fit_to_positions(&mut self, positions: &[Position], padding: f64) {
        let locals: Vec<LocalPoint> = positions.iter().map(|p| self.plane.to_local(p)).collect();
        let (min_x, min_y, max_x, max_y) = locals.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        );
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let padding_factor = 1.0 - padding.clamp(0.0, 0.49) * 2.0;
        let zoom_x = self.canvas_width * padding_factor / (max_x - min_x);
        let zoom_y = self.canvas_height * padding_factor / (max_y - min_y);
        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);
        self.center_on(&LocalPoint::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0));
    }

    /// Keep `local` at the canvas centre
    pub fn center_on(&mut self, local: &LocalPoint) {
        self.pan_x = self.canvas_width / 2.0 - local.x * self.zoom;
        self.pan_y = self.canvas_height / 2.0 - local.y * self.zoom;
    }
}

impl ScreenProjector for PlanViewport {
    fn project(&self, position: &Position) -> Option<(f64, f64)> {
        let enu = self.plane.to_local3(position);
        if !enu.iter().all(|c| c.is_finite()) || enu.z < -DEPTH_CLIP {
            return None;
        }
        Some(self.local_to_pixel(&LocalPoint::new(enu.x, enu.y)))
    }
}

impl fmt::Display for PlanViewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2} px/m | Pan: ({:.1}, {:.1})",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}
