#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog_gen::config::{default_excludes, Settings, DEFAULT_INDEX_COMPONENT};

/// Project root used by mock-filesystem tests.
pub const MOCK_PROJECT: &str = "/p";
/// Watch root used by mock-filesystem tests.
pub const MOCK_WATCH_ROOT: &str = "/p/src";
/// Output root used by mock-filesystem tests. Served under `/catalog`.
pub const MOCK_OUTPUT_ROOT: &str = "/p/src/app/catalog";

/// Builder for `Settings` that skips the canonicalization and directory
/// checks of `Settings::resolve`, so tests can point it at paths that only
/// exist in a `MockFileSystem`.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// `/p` project, `/p/src` watch root, `/p/src/app/catalog` output.
    pub fn new() -> Self {
        Self::rooted_at(MOCK_PROJECT)
    }

    /// Same layout below an arbitrary project root, e.g. a temp dir.
    pub fn rooted_at(project_root: impl AsRef<Path>) -> Self {
        let project_root = project_root.as_ref().to_path_buf();
        Self {
            settings: Settings {
                watch_root: project_root.join("src"),
                output_root: project_root.join("src").join("app").join("catalog"),
                project_root,
                catalog_path: "/catalog".to_string(),
                index_import: DEFAULT_INDEX_COMPONENT.to_string(),
                quiet: false,
                debounce: Duration::from_millis(20),
                exclude: default_excludes(),
            },
        }
    }

    pub fn output_root(mut self, path: impl Into<PathBuf>, catalog_path: &str) -> Self {
        self.settings.output_root = path.into();
        self.settings.catalog_path = catalog_path.to_string();
        self
    }

    pub fn index_import(mut self, import: &str) -> Self {
        self.settings.index_import = import.to_string();
        self
    }

    pub fn debounce(mut self, window: Duration) -> Self {
        self.settings.debounce = window;
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.settings.exclude.push(pattern.to_string());
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
