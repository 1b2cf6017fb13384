//! Bit-plane bulk loader.
//!
//! Keys are processed from the most significant interleaved bit down. A set
//! that fits in a leaf, or that has run out of planes, becomes a leaf. A set
//! whose keys all agree on the current plane moves one plane lower. Any
//! other set is split into its 0-side and 1-side, and the two halves take
//! the place of the set's placeholder node.

use std::collections::VecDeque;

use tracing::trace;

use crate::arena::NodeArena;
use crate::construction::{arena_for, KeyedPoint, TreeConfig};
use crate::types::{Node, NodeId};

/// A set of keys waiting to be placed, and the placeholder leaf reserved for it.
struct Pending {
    entries: Vec<KeyedPoint>,
    placeholder: NodeId,
    plane: isize,
}

/// Build the tree from keys sorted ascending and free of duplicates.
pub(crate) fn load(mut entries: Vec<KeyedPoint>, config: &TreeConfig) -> (NodeArena<Node>, NodeId) {
    let (capacity, fanout, d) = (config.leaf_capacity, config.fanout, config.dimensions);
    let mut arena = arena_for(entries.len(), config);

    entries.reverse();
    let top_plane = entries.first().map_or(0, |e| e.key.len()) as isize - 1;
    let mut root = arena.allocate(Node::empty_leaf(capacity, d, false));

    let mut queue = VecDeque::new();
    queue.push_back(Pending {
        entries,
        placeholder: root,
        plane: top_plane,
    });

    while let Some(Pending {
        mut entries,
        placeholder,
        plane,
    }) = queue.pop_front()
    {
        if entries.len() <= capacity || plane < 0 {
            entries.reverse();
            arena.fill_leaf(placeholder, entries);
            arena.propagate_region(placeholder);
            continue;
        }

        let bit = plane as usize;
        let first = entries[0].key.bit(bit);
        let last = entries[entries.len() - 1].key.bit(bit);
        if first == last {
            queue.push_back(Pending {
                entries,
                placeholder,
                plane: plane - 1,
            });
            continue;
        }

        let (high_side, low_side): (Vec<KeyedPoint>, Vec<KeyedPoint>) =
            entries.into_iter().partition(|e| e.key.bit(bit));
        trace!(plane = bit, low = low_side.len(), high = high_side.len(), "bit-plane split");

        let low = arena.allocate(Node::empty_leaf(capacity, d, false));
        let high = arena.allocate(Node::empty_leaf(capacity, d, false));
        match arena[placeholder].parent() {
            None => {
                root = arena.new_directory(vec![low, high], fanout, d, false);
            }
            Some(parent) if arena[parent].is_full() => {
                let directory = arena.new_directory(vec![low, high], fanout, d, false);
                arena.replace_child(placeholder, directory);
            }
            Some(parent) => {
                let pos = arena[placeholder].position();
                arena.replace_child(placeholder, low);
                arena.insert_child(parent, pos + 1, high);
            }
        }
        arena.deallocate(placeholder);

        queue.push_back(Pending {
            entries: low_side,
            placeholder: low,
            plane: plane - 1,
        });
        queue.push_back(Pending {
            entries: high_side,
            placeholder: high,
            plane: plane - 1,
        });
    }

    (arena, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoaderKind;
    use crate::zorder::ZKey;

    fn entries(points: &[[i64; 2]]) -> Vec<KeyedPoint> {
        let mut entries: Vec<KeyedPoint> = points
            .iter()
            .map(|p| KeyedPoint {
                key: ZKey::encode(p),
                point: p.to_vec(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    fn config(capacity: usize, fanout: usize) -> TreeConfig {
        TreeConfig::new(2)
            .with_leaf_capacity(capacity)
            .with_fanout(fanout)
            .with_loader(LoaderKind::BitPlane)
    }

    #[test]
    fn test_small_set_stays_a_single_leaf() {
        let (arena, root) = load(entries(&[[1, 1], [2, 0]]), &config(4, 4));
        assert!(arena[root].is_leaf());
        assert_eq!(arena[root].points(), &[vec![1, 1], vec![2, 0]]);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_split_on_top_plane() {
        // x = 0..4 on the diagonal; the top plane separates {0,1} from {2,3}.
        let (arena, root) = load(entries(&[[0, 0], [1, 1], [2, 2], [3, 3]]), &config(2, 4));
        assert!(!arena[root].is_leaf());
        let children = arena[root].children();
        assert_eq!(children.len(), 2);
        assert_eq!(arena[children[0]].points(), &[vec![0, 0], vec![1, 1]]);
        assert_eq!(arena[children[1]].points(), &[vec![2, 2], vec![3, 3]]);
        assert_eq!(arena[root].region().min(), &[0, 0]);
        // Placeholders replaced by a split go back to the free list.
        assert_eq!(arena.free_count(), 1);
    }

    #[test]
    fn test_full_parent_gets_nested_directory() {
        let points: Vec<[i64; 2]> = (0..16).map(|i| [i, 15 - i]).collect();
        let (arena, root) = load(entries(&points), &config(1, 4));
        let mut stack = vec![root];
        let mut leaves = 0;
        while let Some(id) = stack.pop() {
            let node = &arena[id];
            assert!(node.len() <= node.capacity());
            assert!(!node.is_empty());
            for (pos, &child) in node.children().iter().enumerate() {
                assert_eq!(arena[child].parent(), Some(id));
                assert_eq!(arena[child].position(), pos);
                stack.push(child);
            }
            if node.is_leaf() {
                leaves += 1;
            }
        }
        assert_eq!(leaves, 16);
    }
}
