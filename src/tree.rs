// src/tree.rs

//! Directory tree construction with path compaction.
//!
//! A flat list of link paths such as `["a/b/c/f1", "a/b/c/f2", "x"]` turns
//! into a hierarchy where single-child chains collapse into one node named
//! `a/b/c`. The synthetic root is never merged away, and a directory whose
//! only child is a leaf keeps that leaf as a separate level.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Full paths of every leaf, depth first, in child order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<String>) {
        for child in &self.children {
            if child.is_leaf() {
                out.push(child.path.clone());
            } else {
                child.collect_leaves(out);
            }
        }
    }
}

/// Build the compacted tree for `items`.
pub fn construct_tree<S: AsRef<str>>(items: &[S]) -> TreeNode {
    // Arena of (name, path, child indices); index 0 is the root.
    let mut names: Vec<String> = vec![String::new()];
    let mut paths: Vec<String> = vec![String::new()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new()];
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for item in items {
        let item = item.as_ref();
        let full = if item.starts_with('/') {
            item.to_string()
        } else {
            format!("/{item}")
        };

        let mut current = 0;
        let mut path = String::new();
        for name in full.split('/').skip(1) {
            path.push('/');
            path.push_str(name);

            current = match by_path.get(&path) {
                Some(&idx) => idx,
                None => {
                    let idx = names.len();
                    names.push(name.to_string());
                    paths.push(path.clone());
                    children.push(Vec::new());
                    children[current].push(idx);
                    by_path.insert(path.clone(), idx);
                    idx
                }
            };
        }
    }

    let arena = Arena {
        names,
        paths,
        children,
    };
    let mut root = TreeNode::new("", "");
    root.children = arena.children[0]
        .iter()
        .map(|&idx| compact(arena.materialize(idx)))
        .collect();
    root
}

struct Arena {
    names: Vec<String>,
    paths: Vec<String>,
    children: Vec<Vec<usize>>,
}

impl Arena {
    fn materialize(&self, idx: usize) -> TreeNode {
        TreeNode {
            name: self.names[idx].clone(),
            path: self.paths[idx].clone(),
            children: self.children[idx]
                .iter()
                .map(|&child| self.materialize(child))
                .collect(),
        }
    }
}

/// Merge `node` with its only child for as long as that child is itself a
/// directory. A lone leaf stays a separate level.
fn compact(mut node: TreeNode) -> TreeNode {
    while node.children.len() == 1 && !node.children[0].is_leaf() {
        let Some(child) = node.children.pop() else {
            break;
        };
        node = TreeNode {
            name: format!("{}/{}", node.name, child.name),
            path: child.path,
            children: child.children,
        };
    }
    node.children = node.children.into_iter().map(compact).collect();
    node
}

impl fmt::Display for TreeNode {
    /// Indented outline, one node per line, root omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_level(f: &mut fmt::Formatter<'_>, node: &TreeNode, depth: usize) -> fmt::Result {
            for child in &node.children {
                writeln!(f, "{}{}", "  ".repeat(depth), child.name)?;
                write_level(f, child, depth + 1)?;
            }
            Ok(())
        }
        write_level(f, self, 0)
    }
}
