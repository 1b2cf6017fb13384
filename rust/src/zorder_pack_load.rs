//! Z-order packed bulk loader.
//!
//! Points are packed into leaves in runs of `C` consecutive Z keys, then
//! leaves into directories in runs of `F`, level by level. When a level does
//! not divide evenly, its last full run and the remainder are cut in half,
//! so no node ends up nearly empty and every node still covers a contiguous
//! stretch of the Z curve. Regions carry a full MBR.

use std::ops::Range;

use tracing::trace;

use crate::arena::NodeArena;
use crate::construction::{arena_for, single_root, KeyedPoint, TreeConfig};
use crate::types::{Node, NodeId};

pub(crate) fn load(entries: Vec<KeyedPoint>, config: &TreeConfig) -> (NodeArena<Node>, NodeId) {
    let (capacity, fanout, d) = (config.leaf_capacity, config.fanout, config.dimensions);
    let mut arena = arena_for(entries.len(), config);

    let runs = pack(entries.len(), capacity);
    let mut entries = entries.into_iter();
    let mut level: Vec<NodeId> = runs
        .into_iter()
        .map(|run| {
            let members = entries.by_ref().take(run.len()).collect();
            arena.new_leaf(members, capacity, d, true)
        })
        .collect();
    trace!(leaves = level.len(), "leaf level packed");

    while level.len() > 1 {
        level = pack(level.len(), fanout)
            .into_iter()
            .map(|run| arena.new_directory(level[run].to_vec(), fanout, d, true))
            .collect();
        trace!(nodes = level.len(), "directory level packed");
    }

    (arena, single_root(&level))
}

/// Cut `0..n` into consecutive runs of `capacity`. An uneven tail is merged
/// with the last full run and halved, the larger half last.
fn pack(n: usize, capacity: usize) -> Vec<Range<usize>> {
    let end = if n % capacity == 0 || n < capacity {
        n
    } else {
        (n / capacity - 1) * capacity
    };

    let mut runs: Vec<Range<usize>> = (0..end)
        .step_by(capacity)
        .map(|start| start..(start + capacity).min(end))
        .collect();

    if end < n {
        let middle = end + (n - end) / 2;
        runs.push(end..middle);
        runs.push(middle..n);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoaderKind;
    use crate::zorder::ZKey;

    fn keyed(points: &[[i64; 2]]) -> Vec<KeyedPoint> {
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
            .with_loader(LoaderKind::ZOrderPacked)
    }

    #[test]
    fn test_even_runs() {
        assert_eq!(pack(8, 4), vec![0..4, 4..8]);
    }

    #[test]
    fn test_fewer_than_capacity_is_one_run() {
        assert_eq!(pack(3, 4), vec![0..3]);
        assert_eq!(pack(1, 1), vec![0..1]);
    }

    #[test]
    fn test_uneven_tail_is_halved_in_order() {
        // 4 + 7: the tail of 7 becomes 3 then 4.
        assert_eq!(pack(11, 4), vec![0..4, 4..7, 7..11]);
        // 5 with capacity 2: the tail of 3 becomes 1 then 2.
        assert_eq!(pack(5, 2), vec![0..2, 2..3, 3..5]);
        for n in 1..100 {
            for capacity in 1..9 {
                let runs = pack(n, capacity);
                assert_eq!(runs.first().map(|r| r.start), Some(0));
                assert_eq!(runs.last().map(|r| r.end), Some(n));
                assert!(runs.windows(2).all(|w| w[0].end == w[1].start));
                assert!(runs.iter().all(|r| !r.is_empty() && r.len() <= capacity));
            }
        }
    }

    #[test]
    fn test_leaves_cover_contiguous_key_ranges() {
        // Grouping by area would pair (4, 13) with (11, 11) here, ahead
        // of the leaf holding (7, 6).
        let entries = keyed(&[[4, 13], [11, 11], [4, 12], [7, 6], [2, 13]]);
        let (arena, root) = load(entries, &config(2, 4));
        let leaves: Vec<&[Vec<i64>]> = arena[root]
            .children()
            .iter()
            .map(|&child| arena[child].points())
            .collect();
        let mut previous: Option<ZKey> = None;
        for leaf in &leaves {
            for point in leaf.iter() {
                let key = ZKey::encode(point);
                assert!(previous.as_ref().map_or(true, |p| p < &key), "{:?}", leaves);
                previous = Some(key);
            }
        }
        assert_eq!(leaves.iter().map(|l| l.len()).collect::<Vec<_>>(), vec![2, 1, 2]);
    }

    #[test]
    fn test_load_tracks_mbr() {
        let points: Vec<[i64; 2]> = (0..10).map(|i| [i, 9 - i]).collect();
        let (arena, root) = load(keyed(&points), &config(3, 4));
        let region = arena[root].region();
        assert_eq!(region.min(), &[0, 0]);
        assert_eq!(region.max(), Some(&[9, 9][..]));
        assert!(!arena[root].is_leaf());
    }
}
