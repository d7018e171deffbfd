//! Unit formatting utilities
//!
//! All quantities are stored in SI units (meters, square meters, cubic
//! meters). Display converts to the selected measurement system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const FEET_PER_METER: f64 = 1.0 / 0.3048;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (m, m², m³)
    #[default]
    Metric,
    /// Imperial system (ft, ft², ft³)
    Imperial,
}

impl MeasurementSystem {
    /// Length unit label
    pub fn length_label(&self) -> &'static str {
        match self {
            Self::Metric => "m",
            Self::Imperial => "ft",
        }
    }

    /// Area unit label
    pub fn area_label(&self) -> &'static str {
        match self {
            Self::Metric => "m²",
            Self::Imperial => "ft²",
        }
    }

    /// Volume unit label
    pub fn volume_label(&self) -> &'static str {
        match self {
            Self::Metric => "m³",
            Self::Imperial => "ft³",
        }
    }

    fn length_factor(&self) -> f64 {
        match self {
            Self::Metric => 1.0,
            Self::Imperial => FEET_PER_METER,
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "m" | "si" => Ok(Self::Metric),
            "imperial" | "ft" | "feet" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Format a length given in meters
pub fn format_length(meters: f64, system: MeasurementSystem, decimals: usize) -> String {
    let value = meters * system.length_factor();
    format!("{:.*} {}", decimals, value, system.length_label())
}

/// Format an area given in square meters
pub fn format_area(square_meters: f64, system: MeasurementSystem, decimals: usize) -> String {
    let value = square_meters * system.length_factor().powi(2);
    format!("{:.*} {}", decimals, value, system.area_label())
}

/// Format a volume given in cubic meters
pub fn format_volume(cubic_meters: f64, system: MeasurementSystem, decimals: usize) -> String {
    let value = cubic_meters * system.length_factor().powi(3);
    format!("{:.*} {}", decimals, value, system.volume_label())
}
