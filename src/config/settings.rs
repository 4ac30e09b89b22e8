//! Shim settings with XDG Base Directory compliance.
//!
//! The shim carries almost no configuration by design: the target-origin
//! policy for outbound envelopes and the reload watcher's behavior. Settings
//! load from a JSON file and fall back to defaults when the file is absent.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::{Path, PathBuf},
};

use {
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

use crate::reload::ReloadConfig;

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write the settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
}

/// Serializable shim settings with default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShimSettings {
    /// Origin the parent link must carry for envelopes to be posted.
    ///
    /// `None` preserves the historical wildcard behavior: any attached
    /// parent receives envelopes.
    pub target_origin: Option<String>,
    /// Reload watcher behavior.
    pub reload: ReloadConfig,
}

impl ShimSettings {
    /// Loads settings from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the settings file.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let contents = read_to_string(path.as_ref())?;
        Ok(from_str(&contents)?)
    }

    /// Loads settings from a JSON file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` only for an existing but unreadable or
    /// malformed file.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if path.exists() {
            debug!("Loading shim settings from: {:?}", path);
            Self::load(path)
        } else {
            debug!("No settings file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Saves the settings to a JSON file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        debug!("Saving shim settings to: {:?}", path);
        write(path, to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Default settings file path under the XDG config home.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("syntic");
    config_dir.push("shim.json");
    config_dir
}

/// Gets the XDG config home directory following XDG Base Directory specification.
///
/// Uses `XDG_CONFIG_HOME` environment variable if set, otherwise defaults to $HOME/.config
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    // Fallback to current directory if HOME is not set (shouldn't happen on Unix)
    PathBuf::from(".")
}
