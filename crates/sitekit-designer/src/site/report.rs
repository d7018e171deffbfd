//! Plain-text site summary.

use std::fmt;

use sitekit_core::{format_area, format_length, format_volume, MeasurementSystem, ShapeId};

use super::SiteState;
use crate::validation::{Occupancy, SiteMetrics};

/// Per-shape line of a report
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSummary {
    pub id: ShapeId,
    pub name: Option<String>,
    pub kind: &'static str,
    pub category: String,
    pub area: f64,
    pub length: f64,
    pub volume: Option<f64>,
    pub outside_boundary: bool,
}

/// Snapshot of a site's measurements
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReport {
    pub occupancy: Occupancy,
    pub metrics: Option<SiteMetrics>,
    pub shapes: Vec<ShapeSummary>,
    pub objects: usize,
    pub warning: Option<String>,
    pub system: MeasurementSystem,
    pub decimals: usize,
}

impl SiteState {
    pub fn report(&mut self) -> SiteReport {
        let occupancy = self.scene.occupancy().clone();
        let metrics = occupancy.report().map(|r| r.site_metrics(&self.catalog));
        let shapes = self
            .scene
            .shapes()
            .map(|shape| {
                let m = shape.metrics();
                ShapeSummary {
                    id: shape.id(),
                    name: shape.name.clone(),
                    kind: shape.kind().name(),
                    category: shape.category().to_string(),
                    area: m.area,
                    length: m.length,
                    volume: m.volume,
                    outside_boundary: shape.is_outside_boundary(),
                }
            })
            .collect();

        SiteReport {
            occupancy,
            metrics,
            shapes,
            objects: self.scene.object_count(),
            warning: self.scene.violation_message(),
            system: self.settings.measurement_system,
            decimals: self.settings.decimals,
        }
    }
}

impl fmt::Display for SiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (system, decimals) = (self.system, self.decimals);
        match &self.occupancy {
            Occupancy::NotComputable => writeln!(f, "Occupancy: no site boundary loaded")?,
            Occupancy::Computed(report) => {
                writeln!(
                    f,
                    "Boundary: {}",
                    format_area(report.boundary_area, system, decimals)
                )?;
                writeln!(
                    f,
                    "Occupied: {} ({:.1}%)",
                    format_area(report.occupied_area, system, decimals),
                    report.percentage
                )?;
                for (category, area) in &report.by_category {
                    writeln!(f, "  {:<14} {}", category, format_area(*area, system, decimals))?;
                }
            }
        }

        if let Some(m) = &self.metrics {
            writeln!(
                f,
                "Cost: {:.0}  Income: {:.0}  People: {:.0}  Livability: {:.2}",
                m.cost, m.income, m.people, m.livability_score
            )?;
        }

        for shape in &self.shapes {
            write!(
                f,
                "{} {} [{}] area {} length {}",
                shape.id,
                shape.kind,
                shape.category,
                format_area(shape.area, system, decimals),
                format_length(shape.length, system, decimals)
            )?;
            if let Some(volume) = shape.volume {
                write!(f, " volume {}", format_volume(volume, system, decimals))?;
            }
            if shape.outside_boundary {
                write!(f, " (outside boundary)")?;
            }
            writeln!(f)?;
        }

        if self.objects > 0 {
            writeln!(f, "Placed objects: {}", self.objects)?;
        }
        if let Some(warning) = &self.warning {
            writeln!(f, "Warning: {}", warning)?;
        }
        Ok(())
    }
}
