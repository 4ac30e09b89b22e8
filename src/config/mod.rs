//! Shim settings with JSON persistence.

pub mod settings;

pub use settings::{SettingsError, ShimSettings, get_config_path};
