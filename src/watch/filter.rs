// src/watch/filter.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;
use crate::paths::{is_catalog_file_name, relative_str};

/// Whether a raw path reported by the file system should reach the build
/// engine.
///
/// True iff `candidate` is a file, its name carries the catalog suffix, and
/// it does not live inside `output_root` (generated files must never feed
/// back into generation).
pub fn is_relevant(candidate: &Path, is_file: bool, output_root: &Path) -> bool {
    if !is_file {
        return false;
    }
    let Some(name) = candidate.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    is_catalog_file_name(name) && !candidate.starts_with(output_root)
}

/// [`is_relevant`] plus the configured `exclude` globs, evaluated relative
/// to the watch root.
#[derive(Clone)]
pub struct CatalogFilter {
    watch_root: PathBuf,
    output_root: PathBuf,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for CatalogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogFilter")
            .field("watch_root", &self.watch_root)
            .field("output_root", &self.output_root)
            .finish_non_exhaustive()
    }
}

impl CatalogFilter {
    pub fn new(
        watch_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        exclude: &[String],
    ) -> Result<Self> {
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };
        Ok(Self {
            watch_root: watch_root.into(),
            output_root: output_root.into(),
            exclude_set,
        })
    }

    pub fn watch_root(&self) -> &Path {
        &self.watch_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn is_inside_output(&self, path: &Path) -> bool {
        path.starts_with(&self.output_root)
    }

    /// Should a change at `path` (a file when `is_file`) be forwarded.
    pub fn accepts(&self, path: &Path, is_file: bool) -> bool {
        is_relevant(path, is_file, &self.output_root)
            && path.starts_with(&self.watch_root)
            && !self.is_excluded(path)
    }

    /// Should a directory scan enter `dir`.
    ///
    /// Excluded globs usually end in `/**`, which only matches paths below
    /// the directory, so a probe entry directly inside `dir` is tested.
    pub fn should_descend(&self, dir: &Path) -> bool {
        if self.is_inside_output(dir) || !dir.starts_with(&self.watch_root) {
            return false;
        }
        !self.is_excluded(dir) && !self.is_excluded(&dir.join("_"))
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(exclude) = &self.exclude_set else {
            return false;
        };
        match relative_str(&self.watch_root, path) {
            Some(rel) if !rel.is_empty() => exclude.is_match(&rel),
            _ => false,
        }
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
