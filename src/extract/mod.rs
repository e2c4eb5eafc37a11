// src/extract/mod.rs

//! Symbol extraction: which names a catalog file exports.
//!
//! - `SymbolExtractor` is the parsing seam (tree-sitter in production, a
//!   fake in tests).
//! - `SymbolCache` remembers results per file content hash.
//! - `SymbolReader` glues both to a `FileSystem` and is what the build
//!   orchestrator calls.

pub mod cache;
pub mod typescript;

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{CatalogError, Result};
use crate::fs::FileSystem;

pub use cache::{compute_content_hash, SymbolCache};
pub use typescript::TypeScriptExtractor;

/// Lists the top-level exported names of a source text.
pub trait SymbolExtractor: Send + Sync + Debug {
    /// Returns names in a deterministic order, or `ParseError` for
    /// malformed input.
    fn extract(&self, source: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct SymbolReader {
    fs: Arc<dyn FileSystem>,
    extractor: Arc<dyn SymbolExtractor>,
    cache: Arc<SymbolCache>,
}

impl SymbolReader {
    pub fn new(fs: Arc<dyn FileSystem>, extractor: Arc<dyn SymbolExtractor>) -> Self {
        Self {
            fs,
            extractor,
            cache: Arc::new(SymbolCache::new()),
        }
    }

    /// Read `path` and return its exported symbols, parsing only when the
    /// content differs from the last successful extraction.
    ///
    /// Any failure is reported as `ExtractionError` for `path`.
    pub fn symbols_for(&self, path: &Path) -> Result<Vec<String>> {
        let failed = |message: String| CatalogError::ExtractionError {
            path: path.to_path_buf(),
            message,
        };

        let bytes = self.fs.read(path).map_err(|e| failed(format!("{e:#}")))?;
        let hash = compute_content_hash(&bytes);
        if let Some(symbols) = self.cache.get(path, &hash) {
            return Ok(symbols);
        }

        debug!("cache miss: extracting symbols from {:?}", path);
        let text = String::from_utf8(bytes).map_err(|e| failed(format!("invalid UTF-8: {e}")))?;
        let symbols = self
            .extractor
            .extract(&text)
            .map_err(|e| failed(e.to_string()))?;
        self.cache.insert(path, hash, symbols.clone());
        Ok(symbols)
    }

    /// [`symbols_for`](Self::symbols_for) on the blocking thread pool.
    pub async fn symbols_for_async(&self, path: PathBuf) -> Result<Vec<String>> {
        let reader = self.clone();
        let joined = tokio::task::spawn_blocking(move || reader.symbols_for(&path)).await;
        match joined {
            Ok(result) => result,
            Err(e) => Err(CatalogError::Other(anyhow::anyhow!(
                "symbol extraction task failed: {e}"
            ))),
        }
    }

    pub fn invalidate(&self, path: &Path) {
        self.cache.invalidate(path);
    }

    pub fn cache(&self) -> &SymbolCache {
        &self.cache
    }
}
