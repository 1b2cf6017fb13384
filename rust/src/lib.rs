//! Skyline queries over bulk-loaded Z-order trees.
//!
//! Points are loaded once into a capacity-bounded multiway tree whose nodes
//! carry bounding regions. The skyline (the points no other point beats in
//! every dimension, smaller being better) is then found by a depth-first
//! branch-and-bound traversal. Per-node skyline pointers let each candidate
//! be checked against only the nearby parts of the output found so far.
//!
//! ```
//! use zskyline::{LoaderKind, SkylineTree, TreeConfig};
//!
//! let points = vec![vec![1, 5], vec![5, 1], vec![3, 3], vec![4, 4], vec![2, 2]];
//! let config = TreeConfig::new(2)
//!     .with_leaf_capacity(2)
//!     .with_fanout(4)
//!     .with_loader(LoaderKind::BitPlane);
//! let tree = SkylineTree::build(points, config).unwrap();
//! assert!(tree.check_invariants());
//!
//! let skyline = tree.skyline();
//! assert_eq!(skyline.len(), 3);
//! assert!(skyline.points.contains(&vec![2, 2]));
//! ```

mod arena;
mod bit_plane_load;
mod construction;
mod dominance;
mod error;
mod get_operations;
mod iteration;
mod node;
mod region;
mod skyline;
mod types;
pub mod validation;
mod window_merge_load;
mod zorder;
mod zorder_pack_load;

pub use arena::{ArenaStats, NodeArena};
pub use construction::{
    build_tree, TreeConfig, DEFAULT_COLD_START, DEFAULT_FANOUT, DEFAULT_LEAF_CAPACITY,
    DEFAULT_THRESHOLD,
};
pub use dominance::{
    compare_dominance, dominated_by, dominates, local_skyline, region_dominated_by, Counters,
    DominanceOrdering,
};
pub use error::{BuildResult, SkylineError, SkylineResultExt};
pub use iteration::{LeafIterator, PointIterator};
pub use region::Region;
pub use skyline::{
    compute_skyline, PointerTable, Pruning, Skyline, SkylineIndex, SkylineOptions, SkylinePtr,
};
pub use types::{
    DirectoryNode, LeafNode, LoaderKind, Node, NodeId, NodeKind, Point, SkylineTree, MIN_FANOUT,
    NULL_NODE,
};
pub use zorder::ZKey;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_tree_is_shareable_across_threads() {
        assert_send_sync::<SkylineTree>();
        assert_send_sync::<Skyline>();

        let points: Vec<Point> = (0..500).map(|i: i64| vec![i % 23, (i * 7) % 31]).collect();
        let tree = build_tree(points, 8, 4, 10, 2).unwrap();
        let expected = {
            let mut s = tree.skyline().points;
            s.sort();
            s
        };
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..3)
                .map(|_| {
                    scope.spawn(|| {
                        let mut s = tree.skyline().points;
                        s.sort();
                        s
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
