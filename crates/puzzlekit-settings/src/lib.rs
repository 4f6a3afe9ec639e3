//! PuzzleKit Settings Crate
//!
//! Supplies the defaults a layout consumes once at creation time and handles
//! loading and saving them as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{default_config_path, Config, LayoutDefaults, SheetMargins};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
