// src/config/model.rs

use serde::Deserialize;

/// Import used for the index page when no component is configured.
pub const DEFAULT_INDEX_COMPONENT: &str = "@koharakazuya/nextjs-component-catalog/IndexPage";

/// Quiet window of the write debouncer, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [build]
/// watch_root = "src/"
/// output_path = "src/app/dev/catalog/(nextjs-component-catalog-gen)/"
/// index_component_path = "./src/components/CatalogIndex.tsx"
/// quiet = false
/// debounce_ms = 250
/// exclude = ["**/node_modules/**"]
/// ```
///
/// Every key is optional. Path values are relative to the project root.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub build: BuildSection,
}

/// A validated configuration file.
///
/// Construct through `ConfigFile::try_from(raw)` so the checks in
/// `validate.rs` always run.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub build: BuildSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(build: BuildSection) -> Self {
        Self { build }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Directory searched for catalog files. Defaults to `src/` when the
    /// project has one, `./` otherwise.
    #[serde(default)]
    pub watch_root: Option<String>,

    /// Directory receiving the generated pages. Must sit inside the
    /// project root.
    #[serde(default)]
    pub output_path: Option<String>,

    /// Component rendered by the index page. `./` and `../` values name a
    /// file in the project, anything else is an import specifier.
    #[serde(default)]
    pub index_component_path: Option<String>,

    #[serde(default)]
    pub quiet: bool,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Globs (relative to the watch root) that are never scanned.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

pub fn default_excludes() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/.git/**".to_string(),
        "**/.next/**".to_string(),
    ]
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            watch_root: None,
            output_path: None,
            index_component_path: None,
            quiet: false,
            debounce_ms: default_debounce_ms(),
            exclude: default_excludes(),
        }
    }
}
