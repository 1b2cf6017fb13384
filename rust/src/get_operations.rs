//! Read operations for SkylineTree.
//!
//! This module contains point location (which leaf a point belongs to),
//! membership tests, and the accessors for the tree's parts.

use crate::arena::ArenaStats;
use crate::construction::TreeConfig;
use crate::region::Region;
use crate::types::{Node, NodeId, SkylineTree, NULL_NODE};
use crate::zorder::ZKey;

impl SkylineTree {
    // ============================================================================
    // ACCESSORS
    // ============================================================================

    /// Number of distinct indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Root node, or `None` for an empty tree.
    pub fn root_id(&self) -> Option<NodeId> {
        (self.root != NULL_NODE).then_some(self.root)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Number of levels on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize {
        let Some(root) = self.root_id() else {
            return 0;
        };
        let mut height = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(self.arena[id].children().iter().map(|&c| (c, depth + 1)));
        }
        height
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    // ============================================================================
    // POINT LOCATION
    // ============================================================================

    /// Leaf a point would be placed in.
    ///
    /// Z-keyed trees follow the child whose Z range admits the point's key.
    /// Trees with MBR regions follow the child needing the least area
    /// enlargement, preferring the smaller child on ties. Returns `None` for
    /// an empty tree or a point of the wrong dimensionality.
    pub fn locate(&self, point: &[i64]) -> Option<NodeId> {
        let mut current = self.root_id()?;
        if point.len() != self.dimensions() {
            return None;
        }
        let key = self.key_of(point);
        let target = Region::point(point, &key, true);
        let by_area = self.config.loader.tracks_max();

        loop {
            let node = &self.arena[current];
            if node.is_leaf() {
                return Some(current);
            }
            current = if by_area {
                self.least_enlargement(node.children(), &target)
            } else {
                self.z_child(node.children(), &key)
            };
        }
    }

    /// Whether `point` is indexed.
    pub fn contains(&self, point: &[i64]) -> bool {
        if point.len() != self.dimensions() {
            return false;
        }
        if !self.config.loader.tracks_max() {
            return self
                .locate(point)
                .map_or(false, |leaf| self.leaf_holds(leaf, point));
        }

        // MBRs may overlap, so every child covering the point is searched.
        let mut stack: Vec<NodeId> = self.root_id().into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.arena[id];
            if node.is_leaf() {
                if self.leaf_holds(id, point) {
                    return true;
                }
                continue;
            }
            stack.extend(
                node.children()
                    .iter()
                    .copied()
                    .filter(|&child| covers(self.arena[child].region(), point)),
            );
        }
        false
    }

    fn leaf_holds(&self, leaf: NodeId, point: &[i64]) -> bool {
        self.arena[leaf].points().iter().any(|p| p.as_slice() == point)
    }

    /// Last child whose smallest key is not above `key`, else the first child.
    fn z_child(&self, children: &[NodeId], key: &ZKey) -> NodeId {
        let after = children.partition_point(|&c| self.arena[c].region().min_z() <= key);
        children[after.saturating_sub(1)]
    }

    fn least_enlargement(&self, children: &[NodeId], target: &Region) -> NodeId {
        let mut best = children[0];
        let mut best_growth = f64::INFINITY;
        let mut best_area = f64::INFINITY;
        for &child in children {
            let region = self.arena[child].region();
            let growth = region.enlargement(target);
            let area = region.area();
            if growth < best_growth || (growth == best_growth && area < best_area) {
                best = child;
                best_growth = growth;
                best_area = area;
            }
        }
        best
    }
}

fn covers(region: &Region, point: &[i64]) -> bool {
    let Some(max) = region.max() else {
        return true;
    };
    region
        .min()
        .iter()
        .zip(max)
        .zip(point)
        .all(|((&lo, &hi), &c)| lo <= c && c <= hi)
}
