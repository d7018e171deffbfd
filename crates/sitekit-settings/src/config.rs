//! Configuration for the site editor
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats; the default file lives in the platform config
//! directory.
//!
//! Configuration is organized into sections:
//! - Editing (pointer tolerances, step sizes, minimum spacings)
//! - Measurement (remote cross-check timeout and tolerance)
//! - Persistence (scene data file)
//! - Display (measurement system, decimals)
//! - Extra land-use categories

pub use sitekit_core::MeasurementSystem;
use serde::{Deserialize, Serialize};
use sitekit_core::{Category, CategoryCatalog};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

const APP_DIR: &str = "sitekit";
const CONFIG_FILE: &str = "config.toml";
const DATA_FILE: &str = "site.json";

/// Editing behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingSettings {
    /// Screen distance within which a click inserts a vertex on an edge
    pub insert_tolerance_px: f64,
    /// Clicks closer than this to the previous vertex are ignored while drawing
    pub min_vertex_spacing_m: f64,
    pub rotation_step_deg: f64,
    pub height_step_m: f64,
    pub min_corridor_width_m: f64,
}

impl Default for EditingSettings {
    fn default() -> Self {
        Self {
            insert_tolerance_px: 12.0,
            min_vertex_spacing_m: 0.05,
            rotation_step_deg: 5.0,
            height_step_m: 1.0,
            min_corridor_width_m: 0.5,
        }
    }
}

/// Remote measurement cross-check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementSettings {
    pub enabled: bool,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Relative difference above which remote figures count as diverged
    pub divergence_tolerance: f64,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 1500,
            divergence_tolerance: 0.01,
        }
    }
}

/// Where the scene is stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    pub data_file: PathBuf,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        let dir = dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_file: dir.join(DATA_FILE),
        }
    }
}

/// Report formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub measurement_system: MeasurementSystem,
    pub decimals: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            measurement_system: MeasurementSystem::Metric,
            decimals: 2,
        }
    }
}

/// Complete site editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
/// Missing sections and keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub editing: EditingSettings,
    pub measurement: MeasurementSettings,
    pub persistence: PersistenceSettings,
    pub display: DisplaySettings,
    /// Entries merged over the standard catalog
    pub categories: Vec<Category>,
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

impl SiteConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config file, e.g. `~/.config/sitekit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| {
                ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into()
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No configuration at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let editing = &self.editing;
        positive("editing.insert_tolerance_px", editing.insert_tolerance_px)?;
        positive("editing.rotation_step_deg", editing.rotation_step_deg)?;
        positive("editing.height_step_m", editing.height_step_m)?;
        positive("editing.min_corridor_width_m", editing.min_corridor_width_m)?;
        if !(editing.min_vertex_spacing_m.is_finite() && editing.min_vertex_spacing_m >= 0.0) {
            return Err(out_of_range(
                "editing.min_vertex_spacing_m",
                editing.min_vertex_spacing_m,
            ));
        }

        if self.measurement.timeout_ms == 0 {
            return Err(out_of_range("measurement.timeout_ms", 0));
        }
        positive(
            "measurement.divergence_tolerance",
            self.measurement.divergence_tolerance,
        )?;

        if self.persistence.data_file.as_os_str().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "persistence.data_file".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.display.decimals > 6 {
            return Err(out_of_range("display.decimals", self.display.decimals));
        }

        for category in &self.categories {
            if category.key.trim().is_empty() {
                return Err(ConfigError::InvalidCategory {
                    key: category.key.clone(),
                    reason: "empty key".to_string(),
                }
                .into());
            }
            for (field, value) in [
                ("cost", category.cost),
                ("income", category.income),
                ("people", category.people),
                ("livability_score", category.livability_score),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidCategory {
                        key: category.key.clone(),
                        reason: format!("{} must be a non-negative number", field),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Standard catalog with the configured categories merged over it
    pub fn catalog(&self) -> CategoryCatalog {
        let mut catalog = CategoryCatalog::standard();
        for category in &self.categories {
            catalog.insert(category.clone());
        }
        catalog
    }
}

fn positive(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(key, value))
    }
}

fn out_of_range(key: &str, value: impl ToString) -> SettingsError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}
