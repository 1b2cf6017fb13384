//! Bounding regions for tree nodes.
//!
//! Every region keeps the coordinate-wise minimum corner and the Z range of
//! its subtree. Regions built by the packed loader also carry a max corner so
//! point location can compare them by area.

use crate::zorder::ZKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub(crate) min: Vec<i64>,
    pub(crate) max: Option<Vec<i64>>,
    pub(crate) min_z: ZKey,
    pub(crate) max_z: ZKey,
    populated: bool,
}

impl Region {
    /// Region that contains nothing yet.
    pub fn empty(dimensions: usize, track_max: bool) -> Self {
        Self {
            min: vec![i64::MAX; dimensions],
            max: track_max.then(|| vec![i64::MIN; dimensions]),
            min_z: ZKey::default(),
            max_z: ZKey::default(),
            populated: false,
        }
    }

    /// Degenerate region around a single point with key `z`.
    pub fn point(point: &[i64], z: &ZKey, track_max: bool) -> Self {
        Self {
            min: point.to_vec(),
            max: track_max.then(|| point.to_vec()),
            min_z: z.clone(),
            max_z: z.clone(),
            populated: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.populated
    }

    pub fn dimensions(&self) -> usize {
        self.min.len()
    }

    /// Coordinate-wise lower bound of every point in the region.
    pub fn min(&self) -> &[i64] {
        &self.min
    }

    pub fn max(&self) -> Option<&[i64]> {
        self.max.as_deref()
    }

    pub fn min_z(&self) -> &ZKey {
        &self.min_z
    }

    pub fn max_z(&self) -> &ZKey {
        &self.max_z
    }

    pub fn include_point(&mut self, point: &[i64], z: &ZKey) {
        for (m, &c) in self.min.iter_mut().zip(point) {
            *m = (*m).min(c);
        }
        if let Some(max) = self.max.as_mut() {
            for (m, &c) in max.iter_mut().zip(point) {
                *m = (*m).max(c);
            }
        }
        self.widen_z(z, z);
    }

    pub fn include_region(&mut self, other: &Region) {
        if other.is_empty() {
            return;
        }
        for (m, &c) in self.min.iter_mut().zip(&other.min) {
            *m = (*m).min(c);
        }
        if let Some(max) = self.max.as_mut() {
            let source = other.max.as_deref().unwrap_or(&other.min);
            for (m, &c) in max.iter_mut().zip(source) {
                *m = (*m).max(c);
            }
        }
        self.widen_z(&other.min_z, &other.max_z);
    }

    fn widen_z(&mut self, low: &ZKey, high: &ZKey) {
        if !self.populated {
            self.min_z = low.clone();
            self.max_z = high.clone();
            self.populated = true;
            return;
        }
        if *low < self.min_z {
            self.min_z = low.clone();
        }
        if *high > self.max_z {
            self.max_z = high.clone();
        }
    }

    /// Smallest region containing both `a` and `b`.
    pub fn union(a: &Region, b: &Region) -> Region {
        let mut merged = a.clone();
        merged.include_region(b);
        merged
    }

    /// Product of the side lengths of the MBR; 0 without a max corner.
    pub fn area(&self) -> f64 {
        let max = match (&self.max, self.populated) {
            (Some(max), true) => max,
            _ => return 0.0,
        };
        let area = self
            .min
            .iter()
            .zip(max)
            .map(|(&lo, &hi)| (hi as i128 - lo as i128) as f64)
            .product::<f64>();
        if area.is_finite() {
            area
        } else {
            f64::MAX
        }
    }

    /// Area growth needed to absorb `other`.
    pub fn enlargement(&self, other: &Region) -> f64 {
        Region::union(self, other).area() - self.area()
    }
}
