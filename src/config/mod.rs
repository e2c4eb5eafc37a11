// src/config/mod.rs

//! Configuration loading and validation for catalog-gen.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Merge file values with CLI overrides into absolute `Settings`
//!   (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_and_validate, load_for_project, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::{
    default_excludes, BuildSection, ConfigFile, RawConfigFile, DEFAULT_DEBOUNCE_MS,
    DEFAULT_INDEX_COMPONENT,
};
pub use settings::{Overrides, Settings};
