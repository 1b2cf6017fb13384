//! Construction parameters and bulk-load entry point for SkylineTree.
//!
//! This module contains the tree configuration, its validation, and the
//! shared preprocessing every loader relies on: dimension checks, origin
//! normalisation, Z encoding, sorting and duplicate removal.

use tracing::{debug, debug_span};

use crate::arena::NodeArena;
use crate::error::{BuildResult, SkylineError, SkylineResultExt};
use crate::skyline::{Pruning, SkylineOptions};
use crate::types::{LoaderKind, Node, NodeId, Point, SkylineTree, MIN_FANOUT, NULL_NODE};
use crate::validation::{fanout_for_page, leaf_capacity_for_page};
use crate::zorder::ZKey;
use crate::{bit_plane_load, window_merge_load, zorder_pack_load};

/// Default maximum number of points per leaf
pub const DEFAULT_LEAF_CAPACITY: usize = 128;

/// Default maximum number of children per directory
pub const DEFAULT_FANOUT: usize = 128;

/// Default pointer-width threshold `Q`
pub const DEFAULT_THRESHOLD: usize = 100;

/// Skyline size below which every candidate is tested against the whole output
pub const DEFAULT_COLD_START: usize = 1000;

/// Parameters for building a tree and for its default skyline traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    pub(crate) dimensions: usize,
    pub(crate) leaf_capacity: usize,
    pub(crate) fanout: usize,
    pub(crate) threshold: usize,
    pub(crate) loader: LoaderKind,
    pub(crate) cold_start: usize,
    pub(crate) leaf_cleanup: bool,
    pub(crate) pruning: Pruning,
}

macro_rules! config_setters {
    ($($field:ident: $ty:ty => $doc:literal),* $(,)?) => {
        paste::paste! {
            impl TreeConfig {
                $(
                    #[doc = $doc]
                    pub fn [<with_ $field>](mut self, $field: $ty) -> Self {
                        self.$field = $field;
                        self
                    }

                    #[doc = concat!("Current value of `", stringify!($field), "`.")]
                    pub fn $field(&self) -> $ty {
                        self.$field
                    }
                )*
            }
        }
    };
}

config_setters! {
    leaf_capacity: usize => "Set the maximum number of points per leaf (`C`).",
    fanout: usize => "Set the maximum number of children per directory (`F`).",
    threshold: usize => "Set the pointer-width threshold `Q` used by the skyline traversal.",
    loader: LoaderKind => "Choose the bulk-loading strategy.",
    cold_start: usize => "Set the skyline size below which dominance groups are skipped.",
    leaf_cleanup: bool => "Drop points dominated inside their own leaf before the global test.",
    pruning: Pruning => "Choose how candidates are tested against the skyline found so far.",
}

impl TreeConfig {
    /// Configuration for `dimensions`-dimensional points with default capacities.
    ///
    /// # Examples
    ///
    /// ```
    /// use zskyline::{LoaderKind, TreeConfig};
    ///
    /// let config = TreeConfig::new(3)
    ///     .with_leaf_capacity(32)
    ///     .with_fanout(8)
    ///     .with_loader(LoaderKind::BitPlane);
    /// assert!(config.validate().is_ok());
    /// assert_eq!(config.fanout(), 8);
    /// ```
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
            fanout: DEFAULT_FANOUT,
            threshold: DEFAULT_THRESHOLD,
            loader: LoaderKind::default(),
            cold_start: DEFAULT_COLD_START,
            leaf_cleanup: false,
            pruning: Pruning::default(),
        }
    }

    /// Derive leaf capacity and fanout from a page size in bytes.
    pub fn from_page_budget(page_bytes: usize, dimensions: usize) -> Self {
        Self::new(dimensions)
            .with_leaf_capacity(leaf_capacity_for_page(page_bytes, dimensions))
            .with_fanout(fanout_for_page(page_bytes, dimensions))
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Check every parameter; nothing is built when this fails.
    pub fn validate(&self) -> BuildResult<()> {
        if self.dimensions < 1 {
            return Err(SkylineError::invalid_config(
                "dimensions",
                self.dimensions,
                "must be at least 1",
            ));
        }
        if self.leaf_capacity < 1 {
            return Err(SkylineError::invalid_config(
                "leaf_capacity",
                self.leaf_capacity,
                "must be at least 1",
            ));
        }
        if self.fanout < MIN_FANOUT {
            return Err(SkylineError::invalid_config(
                "fanout",
                self.fanout,
                &format!("must be at least {}", MIN_FANOUT),
            ));
        }
        Ok(())
    }

    /// Traversal options matching this configuration.
    pub fn skyline_options(&self) -> SkylineOptions {
        SkylineOptions {
            threshold: self.threshold,
            cold_start: self.cold_start,
            pruning: self.pruning,
            leaf_cleanup: self.leaf_cleanup,
        }
    }
}

/// A point together with its Z key relative to the tree origin.
#[derive(Debug, Clone)]
pub(crate) struct KeyedPoint {
    pub(crate) key: ZKey,
    pub(crate) point: Point,
}

impl SkylineTree {
    /// Bulk-load `points` into a new tree.
    ///
    /// Identical points are indexed once. An empty input yields an empty tree.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for out-of-range parameters and `DimensionMismatch`
    /// when a point does not have `config.dimensions()` coordinates.
    pub fn build(points: Vec<Point>, config: TreeConfig) -> BuildResult<Self> {
        config.validate().with_context("building skyline tree")?;
        let d = config.dimensions;
        for (index, point) in points.iter().enumerate() {
            if point.len() != d {
                return Err(SkylineError::dimension_mismatch(index, d, point.len()));
            }
        }

        let span = debug_span!("bulk_load", loader = ?config.loader, points = points.len(), d);
        let _guard = span.enter();

        let origin = compute_origin(&points, d);
        let entries = keyed_points(points, &origin);
        let len = entries.len();

        let (arena, root) = if entries.is_empty() {
            (NodeArena::new(), NULL_NODE)
        } else {
            match config.loader {
                LoaderKind::BitPlane => bit_plane_load::load(entries, &config),
                LoaderKind::WindowMerge => window_merge_load::load(entries, &config),
                LoaderKind::ZOrderPacked => zorder_pack_load::load(entries, &config),
            }
        };

        let tree = Self {
            config,
            root,
            arena,
            len,
            origin,
        };
        debug!(
            distinct_points = len,
            nodes = tree.arena.len(),
            height = tree.height(),
            "bulk load complete"
        );
        Ok(tree)
    }

    /// Per-dimension minimum subtracted from every point before encoding.
    pub fn origin(&self) -> &[i64] {
        &self.origin
    }

    /// Key of `point` relative to this tree's origin.
    pub(crate) fn key_of(&self, point: &[i64]) -> ZKey {
        ZKey::encode_offsets(&offsets_from(point, &self.origin))
    }
}

/// Build a tree with the window-merge loader and default traversal options.
///
/// # Examples
///
/// ```
/// let points = vec![vec![1, 5], vec![5, 1], vec![3, 3], vec![4, 4], vec![2, 2]];
/// let tree = zskyline::build_tree(points, 2, 4, 100, 2).unwrap();
/// assert_eq!(tree.skyline().len(), 3);
/// ```
pub fn build_tree(
    points: Vec<Point>,
    leaf_capacity: usize,
    fanout: usize,
    threshold: usize,
    dimensions: usize,
) -> BuildResult<SkylineTree> {
    let config = TreeConfig::new(dimensions)
        .with_leaf_capacity(leaf_capacity)
        .with_fanout(fanout)
        .with_threshold(threshold)
        .with_loader(LoaderKind::WindowMerge);
    SkylineTree::build(points, config)
}

fn compute_origin(points: &[Point], d: usize) -> Vec<i64> {
    let mut origin = vec![i64::MAX; d];
    for point in points {
        for (o, &c) in origin.iter_mut().zip(point) {
            *o = (*o).min(c);
        }
    }
    if points.is_empty() {
        origin.fill(0);
    }
    origin
}

/// Offsets never go negative for points at or above the origin; the
/// wrapping subtraction covers the full `i64` span.
fn offsets_from(point: &[i64], origin: &[i64]) -> Vec<u64> {
    point
        .iter()
        .zip(origin)
        .map(|(&c, &o)| (c as u64).wrapping_sub(o as u64))
        .collect()
}

/// Encode, sort ascending by key, and drop repeated points.
fn keyed_points(points: Vec<Point>, origin: &[i64]) -> Vec<KeyedPoint> {
    let mut entries: Vec<KeyedPoint> = points
        .into_iter()
        .map(|point| KeyedPoint {
            key: ZKey::encode_offsets(&offsets_from(&point, origin)),
            point,
        })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries.dedup_by(|a, b| a.key == b.key);
    entries
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Allocate a fresh arena sized for `entries` points under `config`.
pub(crate) fn arena_for(entries: usize, config: &TreeConfig) -> NodeArena<Node> {
    let leaves = entries / config.leaf_capacity + 1;
    NodeArena::with_capacity(leaves + leaves / (config.fanout - 1) + 1)
}

/// Root id of a loaded arena, for loaders that finish with a node list.
pub(crate) fn single_root(nodes: &[NodeId]) -> NodeId {
    nodes.first().copied().unwrap_or(NULL_NODE)
}
