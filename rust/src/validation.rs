//! Validation and debugging utilities for SkylineTree.
//!
//! This module contains the capacity helpers that size nodes from a page
//! budget, invariant checking, and the structural summaries used by tests.

use std::collections::HashSet;

use crate::error::{BuildResult, SkylineError, TreeResult};
use crate::region::Region;
use crate::types::{Node, NodeId, NodeKind, SkylineTree, MIN_FANOUT, NULL_NODE};

// ============================================================================
// CAPACITY HELPERS
// ============================================================================

/// Bytes of bookkeeping per page (node header plus tuple information).
const PAGE_HEADER_BYTES: usize = 56;
const COORDINATE_BYTES: usize = 8;
const CHILD_REF_BYTES: usize = 4;

/// Bytes left for entries once the header and the region corner are stored.
fn usable_page_bytes(page_bytes: usize, dimensions: usize) -> usize {
    page_bytes.saturating_sub(PAGE_HEADER_BYTES + dimensions * COORDINATE_BYTES)
}

/// Largest leaf capacity whose points fit in `page_bytes`; at least 1.
pub fn leaf_capacity_for_page(page_bytes: usize, dimensions: usize) -> usize {
    let entry = dimensions.max(1) * COORDINATE_BYTES;
    (usable_page_bytes(page_bytes, dimensions) / entry).max(1)
}

/// Largest fanout whose child references fit in `page_bytes`; at least `MIN_FANOUT`.
pub fn fanout_for_page(page_bytes: usize, dimensions: usize) -> usize {
    (usable_page_bytes(page_bytes, dimensions) / CHILD_REF_BYTES).max(MIN_FANOUT)
}

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl SkylineTree {
    /// Check if the tree maintains its structural invariants.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants with detailed error reporting.
    ///
    /// Verifies parent links and positions, capacity bounds, that no node
    /// other than the root of an empty tree is empty, that every region is
    /// exactly the fold of what lies below it, that leaf points are in
    /// ascending Z order, and that the arena holds no unreachable nodes.
    pub fn check_invariants_detailed(&self) -> BuildResult<()> {
        let Some(root) = self.root_id() else {
            if !self.arena.is_empty() || self.len != 0 {
                return Err(SkylineError::InvariantViolation(format!(
                    "empty tree holds {} nodes and {} points",
                    self.arena.len(),
                    self.len
                )));
            }
            return Ok(());
        };

        let root_node = self.node_or_err(root, 0)?;
        if root_node.parent != NULL_NODE {
            return Err(SkylineError::invariant_violation(
                root,
                root_node.pos,
                "root has a parent",
            ));
        }

        let mut visited = HashSet::new();
        let mut points = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(SkylineError::invariant_violation(
                    id,
                    self.arena[id].pos,
                    "reached twice",
                ));
            }
            points += self.check_node(id)?;
            stack.extend(self.arena[id].children().iter().copied());
        }

        if visited.len() != self.arena.len() {
            return Err(SkylineError::InvariantViolation(format!(
                "{} nodes reachable but {} allocated",
                visited.len(),
                self.arena.len()
            )));
        }
        if points != self.len {
            return Err(SkylineError::InvariantViolation(format!(
                "{} points stored but {} indexed",
                points, self.len
            )));
        }
        Ok(())
    }

    /// Check one node against its children; returns the number of points it stores.
    fn check_node(&self, id: NodeId) -> TreeResult<usize> {
        let node = &self.arena[id];
        let fail = |details: &str| SkylineError::invariant_violation(id, node.pos, details);

        if node.is_empty() {
            return Err(fail("node is empty"));
        }
        if node.len() > node.capacity() {
            return Err(fail(&format!(
                "holds {} entries, capacity {}",
                node.len(),
                node.capacity()
            )));
        }

        let track_max = self.config.loader.tracks_max();
        let mut expected = Region::empty(self.dimensions(), track_max);
        match &node.kind {
            NodeKind::Leaf(leaf) => {
                if leaf.capacity != self.config.leaf_capacity {
                    return Err(fail("leaf capacity differs from configuration"));
                }
                let keys: Vec<_> = leaf.points.iter().map(|p| self.key_of(p)).collect();
                if keys.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(fail("leaf points are not in ascending Z order"));
                }
                for (point, key) in leaf.points.iter().zip(&keys) {
                    expected.include_point(point, key);
                }
            }
            NodeKind::Directory(dir) => {
                if dir.fanout != self.config.fanout {
                    return Err(fail("fanout differs from configuration"));
                }
                for (pos, &child) in dir.children.iter().enumerate() {
                    let child_node = self.node_or_err(child, pos)?;
                    if child_node.parent != id || child_node.pos != pos {
                        return Err(SkylineError::invariant_violation(
                            child,
                            child_node.pos,
                            &format!(
                                "parent link is ({}, {}), expected ({}, {})",
                                child_node.parent, child_node.pos, id, pos
                            ),
                        ));
                    }
                    expected.include_region(child_node.region());
                }
            }
        }

        if expected != node.region {
            return Err(fail("region is not the fold of its contents"));
        }
        Ok(node.points().len())
    }

    fn node_or_err(&self, id: NodeId, position: usize) -> TreeResult<&Node> {
        self.arena
            .get(id)
            .ok_or_else(|| SkylineError::invariant_violation(id, position, "not allocated"))
    }

    // ============================================================================
    // DEBUGGING AND TESTING UTILITIES
    // ============================================================================

    /// Number of allocated nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Returns the sizes of all leaf nodes in traversal order.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        self.leaves().map(|(_, leaf)| leaf.len()).collect()
    }

    /// Returns the child counts of all directory nodes.
    pub fn directory_sizes(&self) -> Vec<usize> {
        self.arena
            .iter()
            .filter(|(_, node)| !node.is_leaf())
            .map(|(_, node)| node.len())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::TreeConfig;
    use crate::types::LoaderKind;

    #[test]
    fn test_page_helpers() {
        // (4096 - 56 - 16) / 16
        assert_eq!(leaf_capacity_for_page(4096, 2), 251);
        // (4096 - 56 - 16) / 4
        assert_eq!(fanout_for_page(4096, 2), 1006);
        assert_eq!(leaf_capacity_for_page(16, 4), 1);
        assert_eq!(fanout_for_page(16, 4), MIN_FANOUT);
    }

    #[test]
    fn test_built_trees_pass_validation() {
        let points: Vec<Vec<i64>> = (0..300)
            .map(|i: i64| vec![(i * 31) % 17, (i * 13) % 23, i % 5])
            .collect();
        for loader in LoaderKind::ALL {
            let config = TreeConfig::new(3)
                .with_leaf_capacity(6)
                .with_fanout(4)
                .with_loader(loader);
            let tree = SkylineTree::build(points.clone(), config).unwrap();
            assert_eq!(tree.check_invariants_detailed(), Ok(()), "{:?}", loader);
            assert!(tree.leaf_sizes().iter().all(|&s| (1..=6).contains(&s)));
            assert!(tree.directory_sizes().iter().all(|&s| (1..=4).contains(&s)));
            assert_eq!(tree.leaf_sizes().iter().sum::<usize>(), tree.len());
            assert_eq!(tree.leaf_count() + tree.directory_sizes().len(), tree.node_count());
        }
    }

    #[test]
    fn test_detects_broken_region() {
        let points: Vec<Vec<i64>> = (0..20).map(|i| vec![i, 20 - i]).collect();
        let config = TreeConfig::new(2).with_leaf_capacity(4);
        let mut tree = SkylineTree::build(points, config).unwrap();
        let root = tree.root_id().unwrap();
        tree.arena[root].region.min[0] = -100;
        let err = tree.check_invariants_detailed().unwrap_err();
        assert!(err.to_string().contains("region is not the fold"));
        assert!(!tree.check_invariants());
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let points: Vec<Vec<i64>> = (0..20).map(|i| vec![i, 20 - i]).collect();
        let config = TreeConfig::new(2).with_leaf_capacity(4);
        let mut tree = SkylineTree::build(points, config).unwrap();
        let root = tree.root_id().unwrap();
        let child = tree.arena[root].children()[0];
        tree.arena[child].pos = 7;
        let err = tree.check_invariants_detailed().unwrap_err();
        assert!(matches!(err, SkylineError::InvariantViolation(_)));
        assert!(err.to_string().contains("parent link"));
    }
}
