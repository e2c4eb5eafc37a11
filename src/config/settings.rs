// src/config/settings.rs

//! Resolution of config file values and CLI overrides into the absolute
//! paths a build session runs with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::{BuildSection, ConfigFile, DEFAULT_INDEX_COMPONENT};
use crate::errors::{CatalogError, Result};
use crate::paths::{
    catalog_path_for, normalize, relative_path, relative_specifier, strip_script_extension,
    to_slash, PathMapper,
};

const DEFAULT_OUTPUT_SUFFIX: &str = "app/dev/catalog/(nextjs-component-catalog-gen)/";

/// Values given on the command line. `None` defers to the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_root: Option<PathBuf>,
    pub watch_root: Option<String>,
    pub output_path: Option<String>,
    pub index_component_path: Option<String>,
    pub quiet: bool,
}

/// Fully resolved session settings. All paths are absolute.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_root: PathBuf,
    pub watch_root: PathBuf,
    pub output_root: PathBuf,
    /// URL prefix the output directory is served under, e.g. `/dev/catalog`.
    pub catalog_path: String,
    /// Import specifier used by the index page.
    pub index_import: String,
    pub quiet: bool,
    pub debounce: Duration,
    pub exclude: Vec<String>,
}

impl Settings {
    pub fn resolve(cfg: &ConfigFile, overrides: &Overrides) -> Result<Self> {
        let requested_root = match &overrides.project_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        let project_root = requested_root.canonicalize().map_err(|e| {
            CatalogError::ConfigError(format!(
                "project root {:?} cannot be resolved: {e}",
                requested_root
            ))
        })?;

        let build: &BuildSection = &cfg.build;
        let has_src_dir = project_root.join("src").is_dir();

        let watch_root_rel = overrides
            .watch_root
            .clone()
            .or_else(|| build.watch_root.clone())
            .unwrap_or_else(|| if has_src_dir { "src/" } else { "./" }.to_string());
        let output_rel = overrides
            .output_path
            .clone()
            .or_else(|| build.output_path.clone())
            .unwrap_or_else(|| {
                let prefix = if has_src_dir { "src/" } else { "" };
                format!("{prefix}{DEFAULT_OUTPUT_SUFFIX}")
            });

        let watch_root = normalize(&project_root.join(&watch_root_rel));
        if !watch_root.is_dir() {
            return Err(CatalogError::ConfigError(format!(
                "watch root {:?} is not a directory",
                watch_root
            )));
        }

        let output_root = normalize(&project_root.join(&output_rel));
        validate_roots(&project_root, &watch_root, &output_root)?;

        let catalog_path =
            catalog_path_for(&to_slash(&relative_path(&project_root, &output_root)))?;

        let index_component = overrides
            .index_component_path
            .as_deref()
            .or(build.index_component_path.as_deref());
        let index_import = index_import_for(index_component, &project_root, &output_root);

        Ok(Settings {
            project_root,
            watch_root,
            output_root,
            catalog_path,
            index_import,
            quiet: overrides.quiet || build.quiet,
            debounce: Duration::from_millis(build.debounce_ms),
            exclude: build.exclude.clone(),
        })
    }

    pub fn mapper(&self) -> PathMapper {
        PathMapper::new(&self.watch_root, &self.output_root)
    }
}

fn validate_roots(project_root: &Path, watch_root: &Path, output_root: &Path) -> Result<()> {
    if !output_root.starts_with(project_root) {
        return Err(CatalogError::InvalidPath {
            path: output_root.to_path_buf(),
            root: project_root.to_path_buf(),
        });
    }
    if output_root == watch_root {
        return Err(CatalogError::ConfigError(format!(
            "output path {:?} must differ from the watch root",
            output_root
        )));
    }
    if watch_root.starts_with(output_root) {
        return Err(CatalogError::ConfigError(format!(
            "watch root {:?} must not be inside the output path {:?}",
            watch_root, output_root
        )));
    }
    Ok(())
}

/// `./` and `../` values are files in the project and become imports
/// relative to the output root. Everything else is used as given.
fn index_import_for(configured: Option<&str>, project_root: &Path, output_root: &Path) -> String {
    let Some(value) = configured else {
        return DEFAULT_INDEX_COMPONENT.to_string();
    };
    if !(value.starts_with("./") || value.starts_with("../")) {
        return value.to_string();
    }

    let file = normalize(&project_root.join(value));
    let file_str = file.to_string_lossy();
    let stripped = PathBuf::from(strip_script_extension(&file_str).as_ref());
    relative_specifier(&relative_path(output_root, &stripped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn project(with_src: bool) -> TempDir {
        let dir = tempdir().unwrap();
        if with_src {
            fs::create_dir(dir.path().join("src")).unwrap();
        }
        dir
    }

    fn overrides_for(dir: &TempDir) -> Overrides {
        Overrides {
            project_root: Some(dir.path().to_path_buf()),
            ..Overrides::default()
        }
    }

    #[test]
    fn defaults_use_src_dir_when_present() {
        let dir = project(true);
        let s = Settings::resolve(&ConfigFile::default(), &overrides_for(&dir)).unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert_eq!(s.watch_root, root.join("src"));
        assert_eq!(
            s.output_root,
            root.join("src/app/dev/catalog/(nextjs-component-catalog-gen)")
        );
        assert_eq!(s.catalog_path, "/dev/catalog");
        assert_eq!(s.index_import, DEFAULT_INDEX_COMPONENT);
        assert_eq!(s.debounce, Duration::from_millis(250));
    }

    #[test]
    fn defaults_without_src_dir_use_project_root() {
        let dir = project(false);
        let s = Settings::resolve(&ConfigFile::default(), &overrides_for(&dir)).unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert_eq!(s.watch_root, root);
        assert_eq!(
            s.output_root,
            root.join("app/dev/catalog/(nextjs-component-catalog-gen)")
        );
        assert_eq!(s.catalog_path, "/dev/catalog");
    }

    #[test]
    fn overrides_win_over_config_file() {
        let dir = project(true);
        fs::create_dir(dir.path().join("lib")).unwrap();
        let mut cfg = ConfigFile::default();
        cfg.build.watch_root = Some("src/".into());
        cfg.build.output_path = Some("src/app/x".into());

        let mut ov = overrides_for(&dir);
        ov.watch_root = Some("lib".into());
        ov.output_path = Some("app/catalog/".into());
        let s = Settings::resolve(&cfg, &ov).unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert_eq!(s.watch_root, root.join("lib"));
        assert_eq!(s.output_root, root.join("app/catalog"));
        assert_eq!(s.catalog_path, "/catalog");
    }

    #[test]
    fn output_outside_project_is_rejected() {
        let dir = project(true);
        let mut ov = overrides_for(&dir);
        ov.output_path = Some("../elsewhere/app".into());
        let err = Settings::resolve(&ConfigFile::default(), &ov).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath { .. }));
    }

    #[test]
    fn output_equal_to_watch_root_is_rejected() {
        let dir = project(true);
        let mut ov = overrides_for(&dir);
        ov.output_path = Some("src".into());
        let err = Settings::resolve(&ConfigFile::default(), &ov).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigError(_)));
    }

    #[test]
    fn watch_root_inside_output_is_rejected() {
        let dir = project(true);
        let mut ov = overrides_for(&dir);
        ov.output_path = Some("./".into());
        let err = Settings::resolve(&ConfigFile::default(), &ov).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigError(_)));
    }

    #[test]
    fn missing_watch_root_is_rejected() {
        let dir = project(false);
        let mut ov = overrides_for(&dir);
        ov.watch_root = Some("missing".into());
        let err = Settings::resolve(&ConfigFile::default(), &ov).unwrap_err();
        assert!(matches!(err, CatalogError::ConfigError(msg) if msg.contains("watch root")));
    }

    #[test]
    fn relative_index_component_becomes_output_relative_import() {
        let dir = project(true);
        let mut ov = overrides_for(&dir);
        ov.index_component_path = Some("./src/components/CatalogIndex.tsx".into());
        let s = Settings::resolve(&ConfigFile::default(), &ov).unwrap();
        assert_eq!(s.index_import, "../../../../components/CatalogIndex");
    }

    #[test]
    fn package_index_component_is_kept_verbatim() {
        let dir = project(true);
        let mut cfg = ConfigFile::default();
        cfg.build.index_component_path = Some("@acme/catalog/Index".into());
        let s = Settings::resolve(&cfg, &overrides_for(&dir)).unwrap();
        assert_eq!(s.index_import, "@acme/catalog/Index");
    }
}
