// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CatalogError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::CatalogError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.build))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_debounce(cfg)?;
    validate_paths(cfg)?;
    validate_excludes(cfg)?;
    Ok(())
}

fn validate_debounce(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.debounce_ms == 0 {
        return Err(CatalogError::ConfigError(
            "[build].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let fields = [
        ("watch_root", &cfg.build.watch_root),
        ("output_path", &cfg.build.output_path),
        ("index_component_path", &cfg.build.index_component_path),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            if value.trim().is_empty() {
                return Err(CatalogError::ConfigError(format!(
                    "[build].{key} must not be empty"
                )));
            }
        }
    }
    Ok(())
}

fn validate_excludes(cfg: &RawConfigFile) -> Result<()> {
    for pattern in &cfg.build.exclude {
        Glob::new(pattern).map_err(|e| {
            CatalogError::ConfigError(format!(
                "[build].exclude contains invalid glob '{pattern}': {e}"
            ))
        })?;
    }
    Ok(())
}
