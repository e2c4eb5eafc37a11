// tests/tree_compaction.rs

use std::collections::BTreeSet;

use catalog_gen::tree::{construct_tree, TreeNode};
use proptest::prelude::*;

// Link-like paths of 1..=4 segments drawn from a small alphabet, so chains
// and shared prefixes actually occur. Paths that are a directory of another
// path are dropped: a link never names a directory.
fn link_set() -> impl Strategy<Value = Vec<String>> {
    let segment = prop::sample::select(vec!["a", "b", "c", "Button", "Card"]);
    let path = prop::collection::vec(segment, 1..=4).prop_map(|segs| segs.join("/"));
    prop::collection::btree_set(path, 0..12).prop_map(|set| {
        let all: Vec<String> = set.into_iter().collect();
        all.iter()
            .filter(|p| !all.iter().any(|other| other.starts_with(&format!("{p}/"))))
            .cloned()
            .collect()
    })
}

fn max_depth_of_single_dir_chain(node: &TreeNode) -> bool {
    // No non-root node may have exactly one child that is a directory.
    node.children.iter().all(|child| {
        let merged_away = child.children.len() == 1 && !child.children[0].is_leaf();
        !merged_away && max_depth_of_single_dir_chain(child)
    })
}

proptest! {
    #[test]
    fn every_link_survives_compaction(links in link_set()) {
        let tree = construct_tree(&links);

        let leaves: BTreeSet<String> = tree.leaf_paths().into_iter().collect();
        let expected: BTreeSet<String> = links.iter().map(|l| format!("/{l}")).collect();
        prop_assert_eq!(leaves, expected);
    }

    #[test]
    fn no_directory_chain_is_left_uncompacted(links in link_set()) {
        let tree = construct_tree(&links);
        prop_assert!(max_depth_of_single_dir_chain(&tree));
    }

    #[test]
    fn merged_names_spell_out_the_path(links in link_set()) {
        fn check(node: &TreeNode, parent_path: &str) -> bool {
            node.children.iter().all(|child| {
                let expected = format!("{parent_path}/{}", child.name);
                child.path == expected && check(child, &child.path)
            })
        }
        prop_assert!(check(&construct_tree(&links), ""));
    }
}

#[test]
fn outline_indents_by_compacted_level() {
    let tree = construct_tree(&[
        "components/Button/Primary",
        "components/Button/Secondary",
        "layout/Card/Default",
    ]);

    assert_eq!(
        tree.to_string(),
        "components/Button\n  Primary\n  Secondary\nlayout/Card\n  Default\n"
    );
}
