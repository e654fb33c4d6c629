//! Arena-based forest over flat entries
//!
//! Uses a generational arena for memory-safe node references and O(1)
//! lookups. Children lists, the root list and the level buckets all hold
//! arena indices: non-owning views over one canonical node per id.

use std::collections::VecDeque;

use generational_arena::{Arena, Index};
use tracing::instrument;

/// Tree node: a flat-entry position plus its links.
#[derive(Debug)]
pub struct Node {
    /// Position of this node's entry in the ordered flat store
    pub entry: usize,
    /// Parent node, `None` for roots
    pub parent: Option<Index>,
    /// Child nodes in visit order
    pub children: Vec<Index>,
}

/// Forest of nodes backed by a generational arena.
#[derive(Debug, Default)]
pub struct Forest {
    arena: Arena<Node>,
    roots: Vec<Index>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an unlinked node; linking happens via [`Forest::attach_child`]
    /// or [`Forest::push_root`].
    pub fn insert_node(&mut self, entry: usize) -> Index {
        self.arena.insert(Node {
            entry,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Append `child` to `parent`'s children.
    pub fn attach_child(&mut self, parent: Index, child: Index) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Register `idx` as a root, in discovery order.
    pub fn push_root(&mut self, idx: Index) {
        self.roots.push(idx);
    }

    pub fn node(&self, idx: Index) -> Option<&Node> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Depth-first traversal over all roots, siblings left to right.
    pub fn iter(&self) -> ForestIterator {
        ForestIterator::new(self)
    }

    /// Maximum node depth; an empty forest has depth 0.
    ///
    /// Explicit-stack walk, no recursion on possibly deep inputs.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> =
            self.roots.iter().map(|&root| (root, 1)).collect();

        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.node(idx) {
                for &child in &node.children {
                    stack.push((child, depth + 1));
                }
            }
        }
        max_depth
    }

    /// Group all nodes by level: bucket 0 holds the roots in discovery
    /// order, bucket k the nodes k edges below their root, each bucket
    /// in breadth-first discovery order.
    #[instrument(level = "debug", skip(self))]
    pub fn level_buckets(&self) -> Vec<Vec<Index>> {
        let mut buckets: Vec<Vec<Index>> = Vec::new();
        let mut queue: VecDeque<(Index, usize)> =
            self.roots.iter().map(|&root| (root, 0)).collect();

        while let Some((idx, level)) = queue.pop_front() {
            if buckets.len() <= level {
                buckets.resize_with(level + 1, Vec::new);
            }
            buckets[level].push(idx);
            if let Some(node) = self.node(idx) {
                for &child in &node.children {
                    queue.push_back((child, level + 1));
                }
            }
        }
        buckets
    }
}

/// Pre-order iterator over the whole forest.
pub struct ForestIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        // Roots in reverse so the first root is visited first
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // root
    // ├── child1
    // │   └── grandchild1
    // └── child2
    fn sample() -> Forest {
        let mut forest = Forest::new();
        let root = forest.insert_node(0);
        let child1 = forest.insert_node(1);
        let child2 = forest.insert_node(2);
        let grandchild1 = forest.insert_node(3);
        forest.push_root(root);
        forest.attach_child(root, child1);
        forest.attach_child(root, child2);
        forest.attach_child(child1, grandchild1);
        forest
    }

    #[test]
    fn test_links_and_depth() {
        let forest = sample();
        assert_eq!(forest.len(), 4);
        assert_eq!(forest.roots().len(), 1);
        assert_eq!(forest.depth(), 3);

        let root = forest.node(forest.roots()[0]).unwrap();
        assert_eq!(root.children.len(), 2);
        let child1 = forest.node(root.children[0]).unwrap();
        assert_eq!(child1.entry, 1);
        assert_eq!(child1.parent, Some(forest.roots()[0]));
    }

    #[test]
    fn test_preorder_iteration() {
        let forest = sample();
        let entries: Vec<usize> = forest.iter().map(|(_, node)| node.entry).collect();
        assert_eq!(entries, vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_level_buckets_breadth_first() {
        let forest = sample();
        let buckets = forest.level_buckets();
        assert_eq!(buckets.len(), 3);
        let by_entry: Vec<Vec<usize>> = buckets
            .iter()
            .map(|bucket| {
                bucket
                    .iter()
                    .map(|&idx| forest.node(idx).unwrap().entry)
                    .collect()
            })
            .collect();
        assert_eq!(by_entry, vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_empty_forest() {
        let forest = Forest::new();
        assert!(forest.is_empty());
        assert_eq!(forest.depth(), 0);
        assert!(forest.level_buckets().is_empty());
        assert_eq!(forest.iter().count(), 0);
    }
}
