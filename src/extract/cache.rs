// src/extract/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use blake3::Hasher;
use tracing::debug;

/// Hash of a file's bytes.
pub fn compute_content_hash(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize().to_hex().to_string()
}

#[derive(Debug, Clone)]
struct CachedSymbols {
    hash: String,
    symbols: Vec<String>,
}

/// In-memory cache of extracted symbol lists, keyed by file path and
/// validated by content hash.
///
/// Index regeneration re-derives symbols for every catalog file on every
/// update. With the cache only files whose bytes actually changed are
/// parsed again.
#[derive(Debug, Default)]
pub struct SymbolCache {
    entries: Mutex<HashMap<PathBuf, CachedSymbols>>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached symbols for `path`, if they were extracted from content with
    /// the same `hash`.
    pub fn get(&self, path: &Path, hash: &str) -> Option<Vec<String>> {
        let entries = self.entries.lock().ok()?;
        match entries.get(path) {
            Some(cached) if cached.hash == hash => Some(cached.symbols.clone()),
            Some(_) => {
                debug!("cache stale: content of {:?} changed", path);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, path: &Path, hash: String, symbols: Vec<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(path.to_path_buf(), CachedSymbols { hash, symbols });
        }
    }

    /// Invalidate the cached symbols for a file (e.g. on removal).
    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(path).is_some() {
                debug!("invalidated symbol cache for {:?}", path);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_requires_matching_hash() {
        let cache = SymbolCache::new();
        let path = Path::new("/w/a.catalog.tsx");
        let h1 = compute_content_hash(b"export const A = 1;");
        let h2 = compute_content_hash(b"export const B = 1;");

        cache.insert(path, h1.clone(), vec!["A".into()]);

        assert_eq!(cache.get(path, &h1), Some(vec!["A".to_string()]));
        assert_eq!(cache.get(path, &h2), None);
    }

    #[test]
    fn invalidate_drops_entry() {
        let cache = SymbolCache::new();
        let path = Path::new("/w/a.catalog.tsx");
        cache.insert(path, "h".into(), vec![]);
        cache.invalidate(path);
        assert!(cache.is_empty());
    }

    #[test]
    fn hash_is_stable_hex() {
        let h = compute_content_hash(b"abc");
        assert_eq!(h, compute_content_hash(b"abc"));
        assert_eq!(h.len(), 64);
    }
}
