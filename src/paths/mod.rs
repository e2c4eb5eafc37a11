// src/paths/mod.rs

//! Pure path arithmetic: where a catalog file's pages go, how they import
//! the source back, and which URL the output directory is served under.
//!
//! Nothing in here touches the file system (except the canonicalize fallback
//! in [`path_utils::relative_str`]).

pub mod mapper;
pub mod path_utils;
pub mod route;

pub use mapper::{
    is_catalog_file_name, relative_specifier, strip_catalog_suffix, strip_script_extension,
    PathMapper, PAGE_FILE_NAME,
};
pub use path_utils::{display_relative, normalize, relative_path, relative_str, to_slash};
pub use route::{catalog_path_for, normalize_app_path};
