//! Component configuration at `<home>/.areacom/config.yaml`.
//!
//! Every function has two forms, as elsewhere in this crate:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::hive::FileHive;
use crate::registration::{RegistrationStrategy, DEFAULT_TYPELIB_EXTENSION};

const CONFIG_FILE: &str = "config.yaml";

/// Tunables for registration. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ComponentConfig {
    pub strategy: RegistrationStrategy,
    /// Extension substituted onto the module path to locate the type library.
    pub typelib_extension: String,
    /// Overrides `<home>/.areacom/hive.yaml` for the file-backed hive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hive_path: Option<PathBuf>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            strategy: RegistrationStrategy::default(),
            typelib_extension: DEFAULT_TYPELIB_EXTENSION.to_owned(),
            hive_path: None,
        }
    }
}

impl ComponentConfig {
    /// File hive location: `hive_path` if set, else the default under `home`.
    pub fn hive_path_at(&self, home: &Path) -> PathBuf {
        self.hive_path
            .clone()
            .unwrap_or_else(|| FileHive::default_path_at(home))
    }
}

/// `<home>/.areacom/`: pure, no I/O.
pub fn areacom_dir_at(home: &Path) -> PathBuf {
    home.join(".areacom")
}

/// `<home>/.areacom/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    areacom_dir_at(home).join(CONFIG_FILE)
}

/// Load the configuration, or defaults if the file does not exist.
///
/// Returns `RegistryError::Parse` (with path + line context) if malformed.
pub fn load_at(home: &Path) -> Result<ComponentConfig, RegistryError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(ComponentConfig::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| {
        RegistryError::RegistryUnavailable {
            location: path.clone(),
            source,
        }
    })?;
    if contents.trim().is_empty() {
        return Ok(ComponentConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| RegistryError::Parse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<ComponentConfig, RegistryError> {
    load_at(&home()?)
}

/// The current user's home directory.
pub fn home() -> Result<PathBuf, RegistryError> {
    dirs::home_dir().ok_or(RegistryError::HomeNotFound)
}
