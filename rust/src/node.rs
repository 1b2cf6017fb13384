//! Node implementations for SkylineTree.
//!
//! This module contains the node accessors and the arena-level helpers the
//! loaders use to create nodes, wire parents to children, and keep bounding
//! regions in step with the subtrees below them.

use crate::arena::NodeArena;
use crate::construction::KeyedPoint;
use crate::region::Region;
use crate::types::{DirectoryNode, LeafNode, Node, NodeId, NodeKind, Point, NULL_NODE};

// ============================================================================
// NODE ACCESSORS
// ============================================================================

impl Node {
    /// Leaf with room for `capacity` points and an empty region.
    pub(crate) fn empty_leaf(capacity: usize, dimensions: usize, track_max: bool) -> Self {
        Self {
            parent: NULL_NODE,
            pos: 0,
            region: Region::empty(dimensions, track_max),
            kind: NodeKind::Leaf(LeafNode {
                capacity,
                points: Vec::new(),
            }),
        }
    }

    /// Directory with room for `fanout` children and an empty region.
    pub(crate) fn empty_directory(fanout: usize, dimensions: usize, track_max: bool) -> Self {
        Self {
            parent: NULL_NODE,
            pos: 0,
            region: Region::empty(dimensions, track_max),
            kind: NodeKind::Directory(DirectoryNode {
                fanout,
                children: Vec::with_capacity(fanout),
            }),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Parent id, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        (self.parent != NULL_NODE).then_some(self.parent)
    }

    /// Index of this node among its parent's children.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Points of a leaf in ascending Z order; empty for directories.
    pub fn points(&self) -> &[Point] {
        match &self.kind {
            NodeKind::Leaf(leaf) => &leaf.points,
            NodeKind::Directory(_) => &[],
        }
    }

    /// Children of a directory in ascending Z order; empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Directory(dir) => &dir.children,
        }
    }

    /// Number of points (leaf) or children (directory).
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(leaf) => leaf.points.len(),
            NodeKind::Directory(dir) => dir.children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `C` for leaves, `F` for directories.
    pub fn capacity(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(leaf) => leaf.capacity,
            NodeKind::Directory(dir) => dir.fanout,
        }
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Directory(dir) => Some(&mut dir.children),
        }
    }
}

// ============================================================================
// ARENA HELPERS
// ============================================================================

impl NodeArena<Node> {
    /// Allocate a leaf holding `entries`, already in ascending Z order.
    pub(crate) fn new_leaf(
        &mut self,
        entries: Vec<KeyedPoint>,
        capacity: usize,
        dimensions: usize,
        track_max: bool,
    ) -> NodeId {
        let mut node = Node::empty_leaf(capacity, dimensions, track_max);
        fill_leaf(&mut node, entries);
        self.allocate(node)
    }

    /// Allocate a directory over `children` and adopt them.
    pub(crate) fn new_directory(
        &mut self,
        children: Vec<NodeId>,
        fanout: usize,
        dimensions: usize,
        track_max: bool,
    ) -> NodeId {
        let mut node = Node::empty_directory(fanout, dimensions, track_max);
        for &child in &children {
            node.region.include_region(&self[child].region);
        }
        if let Some(list) = node.children_mut() {
            *list = children;
        }
        let id = self.allocate(node);
        self.renumber_children(id);
        id
    }

    /// Point every child of `parent` back at it with its current index.
    pub(crate) fn renumber_children(&mut self, parent: NodeId) {
        let children = self[parent].children().to_vec();
        for (pos, child) in children.into_iter().enumerate() {
            let node = &mut self[child];
            node.parent = parent;
            node.pos = pos;
        }
    }

    /// Put `replacement` where `old` sat under `old`'s parent.
    pub(crate) fn replace_child(&mut self, old: NodeId, replacement: NodeId) {
        let (parent, pos) = (self[old].parent, self[old].pos);
        if let Some(children) = self[parent].children_mut() {
            children[pos] = replacement;
        }
        let node = &mut self[replacement];
        node.parent = parent;
        node.pos = pos;
    }

    /// Splice `child` into `parent` at `pos`, shifting later siblings right.
    pub(crate) fn insert_child(&mut self, parent: NodeId, pos: usize, child: NodeId) {
        if let Some(children) = self[parent].children_mut() {
            children.insert(pos, child);
        }
        self.renumber_children(parent);
    }

    /// Fold `node`'s region into every ancestor.
    pub(crate) fn propagate_region(&mut self, node: NodeId) {
        let region = self[node].region.clone();
        let mut current = self[node].parent;
        while current != NULL_NODE {
            let ancestor = &mut self[current];
            ancestor.region.include_region(&region);
            current = ancestor.parent;
        }
    }

    /// Store `entries` in an existing, still empty leaf.
    pub(crate) fn fill_leaf(&mut self, leaf: NodeId, entries: Vec<KeyedPoint>) {
        fill_leaf(&mut self[leaf], entries);
    }
}

fn fill_leaf(node: &mut Node, entries: Vec<KeyedPoint>) {
    let NodeKind::Leaf(leaf) = &mut node.kind else {
        return;
    };
    leaf.points.reserve(entries.len());
    for entry in entries {
        node.region.include_point(&entry.point, &entry.key);
        leaf.points.push(entry.point);
    }
}
