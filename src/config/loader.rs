// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CatalogError, Result};

/// File looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "catalog-gen.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for
/// the semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        CatalogError::ConfigError(format!("cannot read config file {:?}: {e}", path))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// An explicitly passed file must exist. Without one, `catalog-gen.toml` in
/// `project_root` is used when present and built-in defaults otherwise.
pub fn load_for_project(explicit: Option<&Path>, project_root: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let candidate = default_config_path(project_root);
    if candidate.is_file() {
        debug!(path = %candidate.display(), "loading config file");
        load_and_validate(&candidate)
    } else {
        debug!("no config file found, using defaults");
        Ok(ConfigFile::default())
    }
}

pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(DEFAULT_CONFIG_FILE)
}
