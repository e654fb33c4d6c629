//! Rendering adapter: forest → termtree
//!
//! Presentation convenience only; the core never depends on it.

use generational_arena::Index;
use termtree::Tree;

use crate::arena::Forest;
use crate::errors::HierarchyResult;
use crate::flat::FlatEntry;
use crate::index::HierarchyIndex;
use crate::source::RecordSource;

/// Conversion of hierarchy nodes into printable trees.
pub trait TreeDisplay {
    /// Printable tree rooted at `idx`, labels taken from `self_name`.
    fn to_tree_string(&self, idx: Index) -> Option<Tree<String>>;

    /// All roots rendered below each other.
    fn render(&self) -> HierarchyResult<String>;
}

impl<S: RecordSource> TreeDisplay for HierarchyIndex<S> {
    fn to_tree_string(&self, idx: Index) -> Option<Tree<String>> {
        let forest = self.forest_structure().ok()?;
        let entries = self.flat().ok()?;
        Some(subtree(forest, entries, idx))
    }

    fn render(&self) -> HierarchyResult<String> {
        let forest = self.forest_structure()?;
        let entries = self.flat()?;
        let mut out = String::new();
        for &root in forest.roots() {
            out.push_str(&subtree(forest, entries, root).to_string());
        }
        Ok(out)
    }
}

// Recursion is bounded here: linking breaks cycles, so depth is at most
// the node count.
fn subtree(forest: &Forest, entries: &[FlatEntry], idx: Index) -> Tree<String> {
    let (label, children) = match forest.node(idx) {
        Some(node) => {
            let label = entries
                .get(node.entry)
                .map(|entry| entry.self_name.clone())
                .unwrap_or_default();
            (label, node.children.as_slice())
        }
        None => (String::new(), &[] as &[Index]),
    };

    let leaves: Vec<_> = children
        .iter()
        .map(|&child| subtree(forest, entries, child))
        .collect();
    Tree::new(label).with_leaves(leaves)
}
