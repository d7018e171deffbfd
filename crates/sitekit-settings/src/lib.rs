//! SiteKit Settings Crate
//!
//! Loads, validates and saves the site editor configuration.

pub mod config;
pub mod error;

pub use config::{
    DisplaySettings, EditingSettings, MeasurementSettings, PersistenceSettings, SiteConfig,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
