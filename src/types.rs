use std::fmt;
use std::path::PathBuf;

/// What happened to a catalog file, as seen by the watcher.
///
/// - `Added`: the file appeared (initial scan, creation, rename into the tree).
/// - `Changed`: a file already in the inventory was written again.
/// - `Removed`: the file (or a directory containing it) disappeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Added => "added",
            ChangeKind::Changed => "changed",
            ChangeKind::Removed => "removed",
        };
        f.write_str(s)
    }
}

/// A single relevant change delivered to the build engine.
///
/// `revision` is the inventory revision assigned to this change. Handlers use
/// it to detect that a newer event for the same path has already been
/// observed, in which case the older handler stops before writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub revision: u64,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind, revision: u64) -> Self {
        Self {
            path: path.into(),
            kind,
            revision,
        }
    }
}
