//! Window-merge bulk loader.
//!
//! Leaves are cut from a sliding window over the Z-sorted keys: the window
//! is shortened at the last position where the common-prefix area of the
//! window's prefix jumps above that of the whole window. Directory levels
//! are built the same way over the previous level until one node remains.

use std::collections::VecDeque;

use tracing::trace;

use crate::arena::NodeArena;
use crate::construction::{arena_for, single_root, KeyedPoint, TreeConfig};
use crate::types::{Node, NodeId};
use crate::zorder::ZKey;

const LEAF_MIN_FILL: f64 = 0.5;
const DIRECTORY_MIN_FILL: f64 = 0.4;

pub(crate) fn load(entries: Vec<KeyedPoint>, config: &TreeConfig) -> (NodeArena<Node>, NodeId) {
    let (capacity, fanout, d) = (config.leaf_capacity, config.fanout, config.dimensions);
    let mut arena = arena_for(entries.len(), config);

    let leaf_min = min_fill(capacity, LEAF_MIN_FILL);
    let mut deque: VecDeque<KeyedPoint> = entries.into();
    let mut level: Vec<NodeId> = Vec::new();
    while !deque.is_empty() {
        let take = deque.len().min(capacity);
        let mut window: Vec<KeyedPoint> = deque.drain(..take).collect();
        let cut = leaf_cut(&window, leaf_min, d);
        for rest in window.split_off(cut + 1).into_iter().rev() {
            deque.push_front(rest);
        }
        level.push(arena.new_leaf(window, capacity, d, false));
    }
    trace!(leaves = level.len(), "leaf level cut");

    let directory_min = min_fill(fanout, DIRECTORY_MIN_FILL);
    while level.len() > 1 {
        let mut queue: VecDeque<NodeId> = std::mem::take(&mut level).into();
        while !queue.is_empty() {
            let take = queue.len().min(fanout);
            let mut window: Vec<NodeId> = queue.drain(..take).collect();
            let cut = directory_cut(&arena, &window, directory_min, d);
            for rest in window.split_off(cut + 1).into_iter().rev() {
                queue.push_front(rest);
            }
            level.push(arena.new_directory(window, fanout, d, false));
        }
        trace!(nodes = level.len(), "directory level merged");
    }

    (arena, single_root(&level))
}

fn min_fill(capacity: usize, fraction: f64) -> usize {
    (capacity as f64 * fraction).round() as usize
}

/// Index of the last key the leaf keeps.
fn leaf_cut(window: &[KeyedPoint], min_fill: usize, d: usize) -> usize {
    let last = window.len() - 1;
    let first = &window[0].key;
    let whole = ZKey::common_prefix_area(first, &window[last].key, d);
    let mut position = last;
    while position >= min_fill.max(1) {
        position -= 1;
        if ZKey::common_prefix_area(first, &window[position].key, d) > whole {
            return position;
        }
    }
    last
}

/// Index of the last child the directory keeps.
fn directory_cut(arena: &NodeArena<Node>, window: &[NodeId], min_fill: usize, d: usize) -> usize {
    let last = window.len() - 1;
    let first = arena[window[0]].region().min_z();
    let whole = ZKey::common_prefix_area(first, arena[window[last]].region().max_z(), d);
    let mut position = last;
    while position >= min_fill.max(1) {
        position -= 1;
        let prefix = ZKey::common_prefix_area(first, arena[window[position]].region().max_z(), d);
        if whole > prefix {
            return position;
        }
    }
    last
}
