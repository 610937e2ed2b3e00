/*
    This module pulls minimal labeled constituents out of parse trees
*/

use itertools::Itertools;

use crate::tree::ParseTree;

/// Returns the subtrees labeled `label` that contain no other subtree with
/// that label, in left-to-right order.
///
/// An outer `NP -> NP PP` node is skipped in favor of the noun phrases
/// inside it.
pub fn extract_constituents<'a>(tree: &'a ParseTree, label: &str) -> Vec<&'a ParseTree> {
    let mut chunks = Vec::new();
    collect_minimal(tree, label, &mut chunks);
    chunks
}

// Returns whether `tree` has `label` anywhere, itself included. Minimal
// matches never nest, so collecting them bottom-up keeps reading order.
fn collect_minimal<'a>(tree: &'a ParseTree, label: &str, chunks: &mut Vec<&'a ParseTree>) -> bool {
    let mut below = false;
    for child in &tree.children {
        below |= collect_minimal(child, label, chunks);
    }

    let here = tree.has_label(label);
    if here && !below {
        chunks.push(tree);
    }
    here || below
}

/// Joins the words of a constituent with single spaces.
pub fn phrase(tree: &ParseTree) -> String {
    tree.leaves().into_iter().join(" ")
}
