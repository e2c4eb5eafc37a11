// src/paths/path_utils.rs

//! Utility functions for path handling.

use std::path::{Component, Path, PathBuf};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
/// - Only if both attempts fail do we give up.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    // Notably on macOS, the same directory can show up under different
    // absolute prefixes (/var vs /private/var).
    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(to_slash(rel));
        }
    }

    None
}

/// Render a path relative to `root` for log output, falling back to the
/// full path when it lies elsewhere.
pub fn display_relative(root: &Path, path: &Path) -> String {
    relative_str(root, path).unwrap_or_else(|| path.display().to_string())
}

/// Join path components with `/` regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lexically normalize a path: drop `.` components and resolve `..` against
/// preceding normal components. Does not touch the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Compute the path that leads from directory `base` to `target`, using `..`
/// where `target` is not below `base`.
///
/// Both paths are expected to be absolute and normalized. Equal paths yield an
/// empty path.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component<'_>> = base.components().collect();
    let target: Vec<Component<'_>> = target.components().collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }
    rel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_walks_up_and_down() {
        let rel = relative_path(
            Path::new("/p/src/app/catalog/components/Button/Primary"),
            Path::new("/p/src/components/Button.catalog"),
        );
        assert_eq!(to_slash(&rel), "../../../../components/Button.catalog");
    }

    #[test]
    fn relative_path_of_descendant_has_no_parent_markers() {
        let rel = relative_path(Path::new("/p/out"), Path::new("/p/out/a/b"));
        assert_eq!(to_slash(&rel), "a/b");
    }

    #[test]
    fn relative_path_of_same_dir_is_empty() {
        let rel = relative_path(Path::new("/p/out"), Path::new("/p/out"));
        assert_eq!(rel, PathBuf::new());
    }

    #[test]
    fn normalize_drops_cur_dir_and_resolves_parent() {
        assert_eq!(
            normalize(Path::new("/p/./src/../app/dev/")),
            PathBuf::from("/p/app/dev")
        );
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn relative_str_strips_root() {
        assert_eq!(
            relative_str(Path::new("/p/src"), Path::new("/p/src/a/b.catalog.tsx")).as_deref(),
            Some("a/b.catalog.tsx")
        );
    }
}
