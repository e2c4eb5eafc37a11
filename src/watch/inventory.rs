// src/watch/inventory.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::types::{ChangeKind, FileEvent};

pub type SharedInventory = Arc<Mutex<Inventory>>;

/// Live set of catalog files, grouped by containing directory.
///
/// Every mutation bumps a global revision. The revision stored per file is
/// the one of its latest add/change, so a handler holding an older event can
/// tell that it has been overtaken.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    dirs: BTreeMap<PathBuf, BTreeMap<String, u64>>,
    revision: u64,
}

/// Point-in-time copy of the inventory used for index regeneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub files: Vec<PathBuf>,
    pub revision: u64,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedInventory {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.dirs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.revision_of(path).is_some()
    }

    /// Revision of the latest add/change of `path`.
    pub fn revision_of(&self, path: &Path) -> Option<u64> {
        let (dir, name) = split(path)?;
        self.dirs.get(dir)?.get(name).copied()
    }

    /// Record that `path` appeared or was written. Returns `Added` for an
    /// unknown file and `Changed` otherwise.
    pub fn upsert(&mut self, path: &Path) -> FileEvent {
        self.revision += 1;
        let revision = self.revision;
        let kind = match split(path) {
            Some((dir, name)) => {
                let names = self.dirs.entry(dir.to_path_buf()).or_default();
                match names.insert(name.to_string(), revision) {
                    Some(_) => ChangeKind::Changed,
                    None => ChangeKind::Added,
                }
            }
            None => ChangeKind::Added,
        };
        FileEvent::new(path, kind, revision)
    }

    /// Forget `path`. Returns the `Removed` event if it was known.
    pub fn remove(&mut self, path: &Path) -> Option<FileEvent> {
        let (dir, name) = split(path)?;
        let names = self.dirs.get_mut(dir)?;
        names.remove(name)?;
        if names.is_empty() {
            self.dirs.remove(dir);
        }
        self.revision += 1;
        Some(FileEvent::new(path, ChangeKind::Removed, self.revision))
    }

    /// Forget `path` and, when it was a directory, every file below it.
    pub fn remove_under(&mut self, path: &Path) -> Vec<FileEvent> {
        let doomed: Vec<PathBuf> = self
            .files()
            .into_iter()
            .filter(|file| file.starts_with(path))
            .collect();
        doomed.iter().filter_map(|file| self.remove(file)).collect()
    }

    /// All files, directories and names in sorted order.
    pub fn files(&self) -> Vec<PathBuf> {
        self.dirs
            .iter()
            .flat_map(|(dir, names)| names.keys().map(move |name| dir.join(name)))
            .collect()
    }

    /// Files grouped by containing directory.
    pub fn grouped(&self) -> impl Iterator<Item = (&Path, Vec<&str>)> {
        self.dirs
            .iter()
            .map(|(dir, names)| (dir.as_path(), names.keys().map(String::as_str).collect()))
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            files: self.files(),
            revision: self.revision,
        }
    }
}

fn split(path: &Path) -> Option<(&Path, &str)> {
    let dir = path.parent()?;
    let name = path.file_name()?.to_str()?;
    Some((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_is_added_then_changed() {
        let mut inv = Inventory::new();
        let a = Path::new("/w/a.catalog.tsx");

        let first = inv.upsert(a);
        let second = inv.upsert(a);

        assert_eq!(first.kind, ChangeKind::Added);
        assert_eq!(second.kind, ChangeKind::Changed);
        assert!(second.revision > first.revision);
        assert_eq!(inv.revision_of(a), Some(second.revision));
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut inv = Inventory::new();
        assert!(inv.remove(Path::new("/w/x.catalog.tsx")).is_none());
        assert_eq!(inv.revision(), 0);
    }

    #[test]
    fn remove_under_directory_removes_every_file_below() {
        let mut inv = Inventory::new();
        inv.upsert(Path::new("/w/d/a.catalog.tsx"));
        inv.upsert(Path::new("/w/d/e/b.catalog.tsx"));
        inv.upsert(Path::new("/w/dd/c.catalog.tsx"));

        let removed = inv.remove_under(Path::new("/w/d"));

        let paths: Vec<_> = removed.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/w/d/a.catalog.tsx"),
                PathBuf::from("/w/d/e/b.catalog.tsx")
            ]
        );
        assert!(removed.iter().all(|e| e.kind == ChangeKind::Removed));
        assert_eq!(inv.files(), vec![PathBuf::from("/w/dd/c.catalog.tsx")]);
    }

    #[test]
    fn files_are_sorted_by_dir_then_name() {
        let mut inv = Inventory::new();
        inv.upsert(Path::new("/w/b/z.catalog.tsx"));
        inv.upsert(Path::new("/w/a/y.catalog.tsx"));
        inv.upsert(Path::new("/w/b/a.catalog.tsx"));

        assert_eq!(
            inv.files(),
            vec![
                PathBuf::from("/w/a/y.catalog.tsx"),
                PathBuf::from("/w/b/a.catalog.tsx"),
                PathBuf::from("/w/b/z.catalog.tsx"),
            ]
        );
        let grouped: Vec<_> = inv.grouped().collect();
        assert_eq!(grouped[1], (Path::new("/w/b"), vec!["a.catalog.tsx", "z.catalog.tsx"]));
    }
}
