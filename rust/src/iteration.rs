//! Iterator implementations for SkylineTree.
//!
//! Both iterators walk the tree depth-first in child order. Every loader
//! keeps siblings on consecutive stretches of the Z curve, so this is
//! ascending Z order.

use crate::types::{Node, NodeId, Point, SkylineTree};

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over the leaves of the tree, left to right.
pub struct LeafIterator<'a> {
    tree: &'a SkylineTree,
    stack: Vec<NodeId>,
}

/// Iterator over every indexed point, leaf by leaf.
pub struct PointIterator<'a> {
    leaves: LeafIterator<'a>,
    current: std::slice::Iter<'a, Point>,
}

// ============================================================================
// SKYLINETREE ITERATOR METHODS
// ============================================================================

impl SkylineTree {
    /// Returns an iterator over `(id, leaf)` pairs in traversal order.
    pub fn leaves(&self) -> LeafIterator<'_> {
        LeafIterator::new(self)
    }

    /// Returns an iterator over all indexed points in traversal order.
    pub fn points(&self) -> PointIterator<'_> {
        PointIterator {
            leaves: self.leaves(),
            current: Default::default(),
        }
    }
}

// ============================================================================
// ITERATOR IMPLEMENTATIONS
// ============================================================================

impl<'a> LeafIterator<'a> {
    fn new(tree: &'a SkylineTree) -> Self {
        Self {
            tree,
            stack: tree.root_id().into_iter().collect(),
        }
    }
}

impl<'a> Iterator for LeafIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let node = &self.tree.arena[id];
            if node.is_leaf() {
                return Some((id, node));
            }
            self.stack.extend(node.children().iter().rev());
        }
        None
    }
}

impl<'a> Iterator for PointIterator<'a> {
    type Item = &'a Point;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(point) = self.current.next() {
                return Some(point);
            }
            let (_, leaf) = self.leaves.next()?;
            self.current = leaf.points().iter();
        }
    }
}
