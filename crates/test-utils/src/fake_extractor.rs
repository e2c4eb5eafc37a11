use std::sync::atomic::{AtomicUsize, Ordering};

use catalog_gen::errors::{CatalogError, Result};
use catalog_gen::extract::SymbolExtractor;

/// Marker line that makes [`FakeExtractor`] report a parse error.
pub const PARSE_ERROR_MARKER: &str = "@@syntax-error";

/// A line-based stand-in for the tree-sitter extractor:
/// - every line of the form `export <Name>` yields `Name`
/// - a line equal to [`PARSE_ERROR_MARKER`] fails the whole file
/// - everything else is ignored
///
/// It counts calls so tests can observe the symbol cache.
#[derive(Debug, Default)]
pub struct FakeExtractor {
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SymbolExtractor for FakeExtractor {
    fn extract(&self, source: &str) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut names = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let line = line.trim();
            if line == PARSE_ERROR_MARKER {
                return Err(CatalogError::ParseError(format!(
                    "unexpected token at line {}",
                    index + 1
                )));
            }
            if let Some(name) = line.strip_prefix("export ") {
                let name = name.trim();
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

/// Source text the [`FakeExtractor`] reads as exporting `names`.
pub fn fake_source(names: &[&str]) -> String {
    names.iter().map(|name| format!("export {name}\n")).collect()
}
