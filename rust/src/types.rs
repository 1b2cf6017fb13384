//! Core types and data structures for the skyline tree.
//!
//! This module contains the node records, the tree itself, the loader
//! selector and the constants shared by construction and traversal.

use crate::arena::NodeArena;
use crate::construction::TreeConfig;
use crate::region::Region;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum fanout for any directory node
pub const MIN_FANOUT: usize = 4;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Special node ID for "no node" (parent of the root)
pub const NULL_NODE: NodeId = u32::MAX;

/// A d-dimensional point; smaller is better in every dimension.
pub type Point = Vec<i64>;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Bulk-loaded multiway tree over Z-ordered points.
///
/// The tree is built once from a batch of points and never mutated afterwards.
/// Every node lives in one arena and refers to its parent and children by
/// [`NodeId`], which keeps the parent links plain integers.
///
/// # Examples
///
/// ```
/// use zskyline::{SkylineTree, TreeConfig};
///
/// let points = vec![vec![1, 5], vec![5, 1], vec![3, 3], vec![4, 4], vec![2, 2]];
/// let config = TreeConfig::new(2).with_leaf_capacity(2).with_fanout(4);
/// let tree = SkylineTree::build(points, config).unwrap();
///
/// let mut skyline = tree.skyline().points;
/// skyline.sort();
/// assert_eq!(skyline, vec![vec![1, 5], vec![2, 2], vec![5, 1]]);
/// ```
///
/// # Capacity Guidelines
///
/// - Minimum fanout: 4 (enforced)
/// - Leaf capacity: at least 1; `validation::leaf_capacity_for_page` derives
///   one from a page size
/// - Higher capacities mean fewer levels but coarser region pruning
#[derive(Debug, Clone)]
pub struct SkylineTree {
    /// Construction parameters the tree was built with.
    pub(crate) config: TreeConfig,
    /// The root node, or `NULL_NODE` for an empty tree.
    pub(crate) root: NodeId,
    /// Arena storage for every node.
    pub(crate) arena: NodeArena<Node>,
    /// Number of distinct indexed points.
    pub(crate) len: usize,
    /// Per-dimension minimum of the input, subtracted before Z encoding.
    pub(crate) origin: Vec<i64>,
}

/// A tree node: shared bookkeeping plus leaf or directory payload.
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent directory, `NULL_NODE` for the root.
    pub(crate) parent: NodeId,
    /// Index of this node in its parent's child list.
    pub(crate) pos: usize,
    /// Bounding region of everything below this node.
    pub(crate) region: Region,
    pub(crate) kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Leaf(LeafNode),
    Directory(DirectoryNode),
}

/// Leaf node holding points in ascending Z order.
#[derive(Debug, Clone)]
pub struct LeafNode {
    /// Maximum number of points this node can hold.
    pub(crate) capacity: usize,
    pub(crate) points: Vec<Point>,
}

/// Directory node holding child ids in ascending Z order.
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    /// Maximum number of children this node can hold.
    pub(crate) fanout: usize,
    pub(crate) children: Vec<NodeId>,
}

// ============================================================================
// ENUMS
// ============================================================================

/// Bulk-loading strategy used to build the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoaderKind {
    /// Recursive bit-plane partitioning; regions carry min corner and Z range.
    BitPlane,
    /// Sliding window cut at common-prefix-area jumps.
    #[default]
    WindowMerge,
    /// Consecutive Z-ordered runs; regions carry a full MBR.
    ZOrderPacked,
}

impl LoaderKind {
    /// Whether nodes built by this loader track a max corner.
    pub fn tracks_max(self) -> bool {
        matches!(self, LoaderKind::ZOrderPacked)
    }

    /// All loaders, in declaration order.
    pub const ALL: [LoaderKind; 3] = [
        LoaderKind::BitPlane,
        LoaderKind::WindowMerge,
        LoaderKind::ZOrderPacked,
    ];
}
