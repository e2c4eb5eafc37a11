// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

pub mod mock;

/// Abstract filesystem interface.
///
/// Everything the build engine does to disk goes through this trait so that
/// the engine can be driven against [`mock::MockFileSystem`] in tests.
pub trait FileSystem: Send + Sync + Debug {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the file at `path` with `contents`, creating parent
    /// directories. Readers never observe a partially written file.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Recursively delete a directory. A missing directory is not an error.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Delete `path` if it is an empty directory. Returns whether it was
    /// removed.
    fn remove_dir_if_empty(&self, path: &Path) -> Result<bool>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_context(|| format!("reading file {:?}", path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;

        // Write next to the destination and rename over it.
        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("creating temp file in {:?}", parent))?;
        tmp.write_all(contents)
            .with_context(|| format!("writing temp file for {:?}", path))?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("renaming temp file onto {:?}", path))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing dir {:?}", path)),
        }
    }

    fn remove_dir_if_empty(&self, path: &Path) -> Result<bool> {
        let mut entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e).with_context(|| format!("reading dir {:?}", path)),
        };
        if entries.next().is_some() {
            return Ok(false);
        }
        match fs::remove_dir(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing dir {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_creates_parents_and_replaces_content() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a").join("b").join("page.tsx");
        let fs = RealFileSystem;

        fs.write(&file, b"one").unwrap();
        fs.write(&file, b"two").unwrap();

        assert_eq!(fs.read_to_string(&file).unwrap(), "two");
        // No temp files left behind.
        assert_eq!(fs.read_dir(file.parent().unwrap()).unwrap(), vec![file.clone()]);
    }

    #[test]
    fn remove_dir_all_tolerates_missing_dir() {
        let dir = tempdir().unwrap();
        RealFileSystem
            .remove_dir_all(&dir.path().join("missing"))
            .unwrap();
    }

    #[test]
    fn remove_dir_if_empty_keeps_populated_dirs() {
        let dir = tempdir().unwrap();
        let fs = RealFileSystem;
        let full = dir.path().join("full");
        fs.write(&full.join("x"), b"x").unwrap();
        let empty = dir.path().join("empty");
        std::fs::create_dir(&empty).unwrap();

        assert!(!fs.remove_dir_if_empty(&full).unwrap());
        assert!(fs.remove_dir_if_empty(&empty).unwrap());
        assert!(!empty.exists());
        assert!(!fs.remove_dir_if_empty(&empty).unwrap());
    }
}
