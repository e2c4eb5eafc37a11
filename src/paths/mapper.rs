// src/paths/mapper.rs

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{CatalogError, Result};
use crate::paths::path_utils::{relative_path, to_slash};

/// File name of every generated page, per-symbol and index alike.
pub const PAGE_FILE_NAME: &str = "page.tsx";

static CATALOG_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.catalog\.[jt]sx?$").expect("static regex"));

static SCRIPT_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.[jt]sx?$").expect("static regex"));

/// Whether a file name carries the catalog suffix (`.catalog.ts`,
/// `.catalog.tsx`, `.catalog.js`, `.catalog.jsx`, any case).
pub fn is_catalog_file_name(name: &str) -> bool {
    CATALOG_SUFFIX.is_match(name)
}

pub fn strip_catalog_suffix(name: &str) -> Cow<'_, str> {
    CATALOG_SUFFIX.replace(name, "")
}

pub fn strip_script_extension(path: &str) -> Cow<'_, str> {
    SCRIPT_EXTENSION.replace(path, "")
}

/// Maps catalog source files to their generated locations.
///
/// A source `<watch_root>/components/Button.catalog.tsx` exporting `Primary`
/// owns the directory `<output_root>/components/Button`, and its page lives at
/// `<output_root>/components/Button/Primary/page.tsx`.
#[derive(Debug, Clone)]
pub struct PathMapper {
    watch_root: PathBuf,
    output_root: PathBuf,
}

impl PathMapper {
    pub fn new(watch_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            watch_root: watch_root.into(),
            output_root: output_root.into(),
        }
    }

    pub fn watch_root(&self) -> &Path {
        &self.watch_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Directory holding every per-symbol subdirectory of `source`.
    pub fn target_dir_for(&self, source: &Path) -> Result<PathBuf> {
        let invalid = || CatalogError::InvalidPath {
            path: source.to_path_buf(),
            root: self.watch_root.clone(),
        };

        let rel = source.strip_prefix(&self.watch_root).map_err(|_| invalid())?;
        let file_name = rel.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        let stem = strip_catalog_suffix(file_name);

        let mut target = self.output_root.clone();
        if let Some(parent) = rel.parent() {
            target.push(parent);
        }
        if !stem.is_empty() {
            target.push(stem.as_ref());
        }
        Ok(target)
    }

    pub fn artifact_dir(&self, source: &Path, symbol: &str) -> Result<PathBuf> {
        Ok(self.target_dir_for(source)?.join(symbol))
    }

    pub fn artifact_file(&self, source: &Path, symbol: &str) -> Result<PathBuf> {
        Ok(self.artifact_dir(source, symbol)?.join(PAGE_FILE_NAME))
    }

    pub fn index_file(&self) -> PathBuf {
        self.output_root.join(PAGE_FILE_NAME)
    }

    /// Link of an artifact relative to the output root, e.g.
    /// `components/Button/Primary`.
    pub fn link_for(&self, source: &Path, symbol: &str) -> Result<String> {
        let dir = self.artifact_dir(source, symbol)?;
        Ok(to_slash(&relative_path(&self.output_root, &dir)))
    }

    /// Import specifier leading from `artifact_dir` back to `source`, with the
    /// script extension removed.
    pub fn import_path_for(&self, artifact_dir: &Path, source: &Path) -> String {
        let source_str = source.to_string_lossy();
        let stripped = PathBuf::from(strip_script_extension(&source_str).as_ref());
        relative_specifier(&relative_path(artifact_dir, &stripped))
    }
}

/// Turn a relative path into an import specifier that cannot be mistaken for
/// a package name.
pub fn relative_specifier(rel: &Path) -> String {
    let rel = to_slash(rel);
    if rel.starts_with("../") || rel.starts_with("./") {
        rel
    } else {
        format!("./{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> PathMapper {
        PathMapper::new("/p/src", "/p/src/app/dev/catalog/(gen)")
    }

    #[test]
    fn catalog_suffix_is_case_insensitive() {
        assert!(is_catalog_file_name("Button.catalog.tsx"));
        assert!(is_catalog_file_name("Button.CATALOG.JSX"));
        assert!(is_catalog_file_name("a.catalog.js"));
        assert!(is_catalog_file_name("a.catalog.ts"));
        assert!(!is_catalog_file_name("a.catalog.mjs"));
        assert!(!is_catalog_file_name("catalog.tsx"));
        assert!(!is_catalog_file_name("a.catalog.tsx.bak"));
    }

    #[test]
    fn target_dir_strips_suffix_and_keeps_relative_dirs() {
        let target = mapper()
            .target_dir_for(Path::new("/p/src/components/Button.catalog.tsx"))
            .unwrap();
        assert_eq!(
            target,
            PathBuf::from("/p/src/app/dev/catalog/(gen)/components/Button")
        );
    }

    #[test]
    fn target_dir_outside_watch_root_is_invalid() {
        let err = mapper()
            .target_dir_for(Path::new("/elsewhere/Button.catalog.tsx"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath { .. }));
    }

    #[test]
    fn link_is_relative_to_output_root() {
        let link = mapper()
            .link_for(Path::new("/p/src/components/Button.catalog.tsx"), "Primary")
            .unwrap();
        assert_eq!(link, "components/Button/Primary");
    }

    #[test]
    fn import_path_points_back_at_extensionless_source() {
        let m = mapper();
        let source = Path::new("/p/src/components/Button.catalog.tsx");
        let dir = m.artifact_dir(source, "Primary").unwrap();
        assert_eq!(
            m.import_path_for(&dir, source),
            "../../../../../../../components/Button.catalog"
        );
    }

    #[test]
    fn specifier_gets_dot_slash_prefix() {
        assert_eq!(relative_specifier(Path::new("a/b")), "./a/b");
        assert_eq!(relative_specifier(Path::new("../a")), "../a");
    }
}
