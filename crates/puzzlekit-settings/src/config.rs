//! Configuration management
//!
//! Layout defaults are read once when a layout is created. Lengths are stored
//! in millimetres; the layout engine converts them to its pixel resolution.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use puzzlekit_core::Unit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sheet margins in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetMargins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl SheetMargins {
    /// Same margin on every side
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

impl Default for SheetMargins {
    fn default() -> Self {
        Self::uniform(5.0)
    }
}

/// Defaults applied to a new layout and its sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDefaults {
    /// Display unit
    pub unit: Unit,
    /// Gap kept between neighbouring pieces, in mm
    pub pieces_gap: f64,
    /// Paper width in mm
    pub sheet_width: f64,
    /// Paper height in mm
    pub sheet_height: f64,
    /// Paper margins in mm
    pub sheet_margins: SheetMargins,
    /// Use the full paper instead of the margins rectangle
    pub ignore_margins: bool,
    /// Flag pieces that overlap each other
    pub warning_superposition: bool,
    /// Flag pieces that leave the usable sheet area
    pub warning_out_of_bound: bool,
    /// Flag pieces that sit closer than the pieces gap
    pub warning_gap_position: bool,
    /// Snap dragged pieces to their neighbours
    pub sticky_edges: bool,
    /// Also snap dragged pieces to the sheet border
    pub sticky_sheet_edges: bool,
    /// Rotate placed pieces to the sheet grainline
    pub follow_grainline: bool,
    /// Horizontal scale baked into every piece
    pub horizontal_scale: f64,
    /// Vertical scale baked into every piece
    pub vertical_scale: f64,
}

impl Default for LayoutDefaults {
    fn default() -> Self {
        Self {
            unit: Unit::Cm,
            pieces_gap: 0.0,
            sheet_width: 210.0,
            sheet_height: 297.0,
            sheet_margins: SheetMargins::default(),
            ignore_margins: false,
            warning_superposition: false,
            warning_out_of_bound: false,
            warning_gap_position: false,
            sticky_edges: false,
            sticky_sheet_edges: false,
            follow_grainline: false,
            horizontal_scale: 1.0,
            vertical_scale: 1.0,
        }
    }
}

impl LayoutDefaults {
    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_non_negative(self.pieces_gap) {
            return Err(ConfigError::out_of_range("layout.pieces_gap", self.pieces_gap));
        }
        if !is_positive(self.sheet_width) {
            return Err(ConfigError::out_of_range("layout.sheet_width", self.sheet_width));
        }
        if !is_positive(self.sheet_height) {
            return Err(ConfigError::out_of_range("layout.sheet_height", self.sheet_height));
        }

        let margins = &self.sheet_margins;
        for (key, value) in [
            ("layout.sheet_margins.left", margins.left),
            ("layout.sheet_margins.top", margins.top),
            ("layout.sheet_margins.right", margins.right),
            ("layout.sheet_margins.bottom", margins.bottom),
        ] {
            if !is_non_negative(value) {
                return Err(ConfigError::out_of_range(key, value));
            }
        }

        if !is_positive(self.horizontal_scale) {
            return Err(ConfigError::out_of_range(
                "layout.horizontal_scale",
                self.horizontal_scale,
            ));
        }
        if !is_positive(self.vertical_scale) {
            return Err(ConfigError::out_of_range(
                "layout.vertical_scale",
                self.vertical_scale,
            ));
        }
        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value >= 0.0
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Layout defaults
    pub layout: LayoutDefaults,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML, chosen by extension)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML, chosen by extension)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_for(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.layout.validate().map_err(SettingsError::from)
    }
}

/// Platform location of the configuration file
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| {
        ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
    })?;
    Ok(dir.join("puzzlekit").join("config.toml"))
}
