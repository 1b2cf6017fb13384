//! Branch-and-bound skyline traversal with skyline pointers.
//!
//! The traversal walks the tree depth-first in child order, pruning any node
//! whose region minimum is dominated by a skyline point found so far. Each
//! visited node records the slice `[lo, hi)` of the output its subtree
//! produced. Once the output is large enough, a candidate is tested only
//! against the blocks of output that sit next to it in the tree (its next
//! dominance group) plus the points found since the last pointer flush,
//! instead of against the whole output.

use std::collections::HashSet;
use std::ops::{Index, IndexMut};

use tracing::{debug, debug_span, trace};

use crate::construction::{DEFAULT_COLD_START, DEFAULT_THRESHOLD};
use crate::dominance::{dominated_by, local_skyline, region_dominated_by, Counters};
use crate::types::{NodeId, Point, SkylineTree};

/// Read-only view of a tree that the skyline traversal needs.
///
/// Node ids must be below `node_slots()`. Children are listed in the order
/// the traversal should visit them.
pub trait SkylineIndex {
    fn root(&self) -> Option<NodeId>;
    fn is_leaf(&self, node: NodeId) -> bool;
    fn children(&self, node: NodeId) -> &[NodeId];
    fn region_min(&self, node: NodeId) -> &[i64];
    fn leaf_points(&self, node: NodeId) -> &[Point];
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn position(&self, node: NodeId) -> usize;
    fn node_slots(&self) -> usize;
}

impl SkylineIndex for SkylineTree {
    fn root(&self) -> Option<NodeId> {
        self.root_id()
    }

    fn is_leaf(&self, node: NodeId) -> bool {
        self.arena[node].is_leaf()
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.arena[node].children()
    }

    fn region_min(&self, node: NodeId) -> &[i64] {
        self.arena[node].region().min()
    }

    fn leaf_points(&self, node: NodeId) -> &[Point] {
        self.arena[node].points()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena[node].parent()
    }

    fn position(&self, node: NodeId) -> usize {
        self.arena[node].position()
    }

    fn node_slots(&self) -> usize {
        self.arena.slot_count()
    }
}

/// How a candidate is checked against the skyline found so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pruning {
    /// Test only the candidate's dominance group once past the cold start.
    #[default]
    NextDominanceGroup,
    /// Always test against the entire output.
    Exhaustive,
}

/// Options for one skyline computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkylineOptions {
    /// Pointer width above which a subtree counts as a dominance group, and
    /// the number of new points that triggers a pointer flush.
    pub threshold: usize,
    /// Output size below which candidates are tested against everything.
    pub cold_start: usize,
    /// Which part of the output a candidate is tested against.
    pub pruning: Pruning,
    /// Remove points dominated within their own leaf first.
    pub leaf_cleanup: bool,
}

impl Default for SkylineOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            cold_start: DEFAULT_COLD_START,
            pruning: Pruning::default(),
            leaf_cleanup: false,
        }
    }
}

/// Slice `[lo, hi)` of the output produced by one subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkylinePtr {
    pub lo: usize,
    pub hi: usize,
}

impl SkylinePtr {
    pub fn width(&self) -> usize {
        self.hi.saturating_sub(self.lo)
    }
}

/// Skyline pointers for every node slot of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerTable {
    pointers: Vec<SkylinePtr>,
}

impl PointerTable {
    fn new(slots: usize) -> Self {
        Self {
            pointers: vec![SkylinePtr::default(); slots],
        }
    }

    pub fn get(&self, node: NodeId) -> Option<SkylinePtr> {
        self.pointers.get(node as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// `(node, pointer)` for every slot.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, SkylinePtr)> + '_ {
        self.pointers
            .iter()
            .enumerate()
            .map(|(id, &ptr)| (id as NodeId, ptr))
    }
}

impl Index<NodeId> for PointerTable {
    type Output = SkylinePtr;

    fn index(&self, node: NodeId) -> &SkylinePtr {
        &self.pointers[node as usize]
    }
}

impl IndexMut<NodeId> for PointerTable {
    fn index_mut(&mut self, node: NodeId) -> &mut SkylinePtr {
        &mut self.pointers[node as usize]
    }
}

/// Result of a skyline computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skyline {
    /// Skyline points in discovery order.
    pub points: Vec<Point>,
    pub counters: Counters,
    /// Final skyline pointer of every node.
    pub pointers: PointerTable,
}

impl Skyline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn pointer(&self, node: NodeId) -> Option<SkylinePtr> {
        self.pointers.get(node)
    }

    /// Whether every pointer satisfies `lo <= hi <= len`.
    pub fn check_pointers(&self) -> bool {
        self.pointers
            .iter()
            .all(|(_, ptr)| ptr.lo <= ptr.hi && ptr.hi <= self.points.len())
    }
}

impl SkylineTree {
    /// Skyline of the indexed points using the tree's configured options.
    pub fn skyline(&self) -> Skyline {
        self.skyline_with(&self.config.skyline_options())
    }

    /// Skyline of the indexed points with explicit traversal options.
    pub fn skyline_with(&self, options: &SkylineOptions) -> Skyline {
        compute_skyline(self, options)
    }
}

/// Checks `subject` against one skyline point.
type DominanceTest = fn(&[i64], &[i64], &mut Counters) -> bool;

/// Run the skyline traversal over any [`SkylineIndex`].
pub fn compute_skyline<I: SkylineIndex + ?Sized>(index: &I, options: &SkylineOptions) -> Skyline {
    let span = debug_span!(
        "skyline",
        threshold = options.threshold,
        cold_start = options.cold_start,
        pruning = ?options.pruning
    );
    let _guard = span.enter();

    let mut traversal = Traversal {
        index,
        options: *options,
        output: Vec::new(),
        pointers: PointerTable::new(index.node_slots()),
        pending: HashSet::new(),
        checkpoint: 0,
        counters: Counters::default(),
    };
    traversal.run();

    let skyline = Skyline {
        points: traversal.output.iter().map(|p| p.to_vec()).collect(),
        counters: traversal.counters,
        pointers: traversal.pointers,
    };
    debug!(
        skyline = skyline.len(),
        dominance_tests = skyline.counters.dominance_tests,
        node_accesses = skyline.counters.node_accesses,
        "skyline complete"
    );
    skyline
}

struct Traversal<'t, I: SkylineIndex + ?Sized> {
    index: &'t I,
    options: SkylineOptions,
    output: Vec<&'t [i64]>,
    pointers: PointerTable,
    /// Nodes whose `hi` must still be bubbled towards the root.
    pending: HashSet<NodeId>,
    /// Output size at the last flush; everything below it is reachable
    /// through the pointer table.
    checkpoint: usize,
    counters: Counters,
}

impl<'t, I: SkylineIndex + ?Sized> Traversal<'t, I> {
    fn run(&mut self) {
        let index = self.index;
        let Some(root) = index.root() else {
            return;
        };

        if index.is_leaf(root) {
            for point in self.leaf_candidates(root) {
                if !self.is_dominated(root, point, dominated_by) {
                    self.output.push(point);
                    self.pointers[root].hi += 1;
                }
            }
            return;
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let size = self.output.len();
            self.pointers[node] = SkylinePtr { lo: size, hi: size };
            self.counters.node_accesses += 1;

            if self.is_dominated(node, index.region_min(node), region_dominated_by) {
                continue;
            }
            if index.is_leaf(node) {
                self.process_leaf(node);
            } else {
                for &child in index.children(node).iter().rev() {
                    self.counters.node_accesses += 1;
                    stack.push(child);
                }
            }
        }
        self.flush();
    }

    fn leaf_candidates(&mut self, leaf: NodeId) -> Vec<&'t [i64]> {
        let index = self.index;
        let points = index.leaf_points(leaf);
        if self.options.leaf_cleanup {
            local_skyline(points, &mut self.counters)
        } else {
            points.iter().map(Vec::as_slice).collect()
        }
    }

    fn process_leaf(&mut self, leaf: NodeId) {
        for point in self.leaf_candidates(leaf) {
            if !self.is_dominated(leaf, point, dominated_by) {
                self.output.push(point);
                self.pointers[leaf].hi += 1;
            }
        }

        let ptr = self.pointers[leaf];
        if ptr.hi == ptr.lo {
            return;
        }
        self.counters.node_accesses += 1;
        if let Some(parent) = self.index.parent(leaf) {
            self.pointers[parent].hi = ptr.hi;
            self.pending.insert(parent);
        }
        if ptr.hi - self.checkpoint > self.options.threshold {
            self.flush();
            self.checkpoint = ptr.hi;
        }
    }

    /// Whether `candidate`, found under `node`, is dominated by the output.
    fn is_dominated(&mut self, node: NodeId, candidate: &[i64], test: DominanceTest) -> bool {
        let cold = self.checkpoint < self.options.cold_start;
        if self.options.pruning == Pruning::Exhaustive || cold {
            return self.scan(0, self.output.len(), candidate, test);
        }

        let index = self.index;
        let mut blocks = Vec::new();
        let mut latched = false;
        let mut current = node;
        loop {
            let parent = index.parent(current);
            if let Some(parent) = parent {
                if latched || self.pointers[parent].width() > self.options.threshold {
                    if !latched {
                        latched = true;
                        self.counters.node_accesses += 1;
                        self.collect(current, candidate, &mut blocks);
                    }
                    let siblings = index.children(parent);
                    for &sibling in siblings[..index.position(current)].iter().rev() {
                        self.counters.node_accesses += 1;
                        self.collect(sibling, candidate, &mut blocks);
                    }
                }
            }
            self.counters.node_accesses += 1;
            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        while let Some(block) = blocks.pop() {
            self.counters.node_accesses += 1;
            let ptr = self.pointers[block];
            if !index.is_leaf(block) && ptr.width() > self.options.threshold {
                for &child in index.children(block).iter().rev() {
                    self.counters.node_accesses += 1;
                    self.collect(child, candidate, &mut blocks);
                }
            } else if self.scan(ptr.lo, ptr.hi, candidate, test) {
                return true;
            }
        }

        self.scan(self.checkpoint, self.output.len(), candidate, test)
    }

    /// Queue `block` if it produced output and its region could dominate `candidate`.
    fn collect(&mut self, block: NodeId, candidate: &[i64], blocks: &mut Vec<NodeId>) {
        if self.pointers[block].width() > 0
            && dominated_by(candidate, self.index.region_min(block), &mut self.counters)
        {
            blocks.push(block);
        }
    }

    fn scan(&mut self, lo: usize, hi: usize, candidate: &[i64], test: DominanceTest) -> bool {
        let output = &self.output;
        let counters = &mut self.counters;
        output[lo..hi]
            .iter()
            .any(|point| test(candidate, point, counters))
    }

    /// Bubble pending `hi` values up to the root, one frontier at a time.
    fn flush(&mut self) {
        let mut frontier = std::mem::take(&mut self.pending);
        let mut rounds = 0;
        while !frontier.is_empty() {
            rounds += 1;
            assert!(
                rounds <= self.index.node_slots() + 1,
                "parent cycle while flushing skyline pointers (frontier {:?})",
                frontier
            );
            let mut next = HashSet::with_capacity(frontier.len());
            for node in frontier {
                self.counters.node_accesses += 1;
                if let Some(parent) = self.index.parent(node) {
                    let hi = self.pointers[node].hi;
                    let ptr = &mut self.pointers[parent];
                    assert!(
                        ptr.lo <= hi,
                        "skyline pointer of node {} regressed below its parent {}",
                        node,
                        parent
                    );
                    ptr.hi = ptr.hi.max(hi);
                    next.insert(parent);
                }
            }
            frontier = next;
        }
        trace!(output = self.output.len(), rounds, "flushed skyline pointers");
    }
}
