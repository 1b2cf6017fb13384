//! Z-order (Morton) keys for d-dimensional integer points.
//!
//! A key interleaves the bits of every coordinate: bit `i` of dimension `j`
//! lands at position `d*i + (d-1-j)`, so dimension 0 owns the most
//! significant bit of every `d`-bit group. Keys compare by bit length first
//! and then bit by bit from the top, which is the numeric order of the
//! interleaved bit string.

use std::cmp::Ordering;

const WORD_BITS: usize = 64;

/// Arbitrary-length bit string, little-endian words, no trailing zero words.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ZKey {
    words: Vec<u64>,
}

impl ZKey {
    /// Encode a point, using the two's complement bits of each coordinate.
    pub fn encode(point: &[i64]) -> Self {
        let offsets: Vec<u64> = point.iter().map(|&c| c as u64).collect();
        Self::encode_offsets(&offsets)
    }

    /// Encode non-negative offsets from the tree origin.
    pub fn encode_offsets(offsets: &[u64]) -> Self {
        let d = offsets.len();
        let mut key = ZKey::default();
        let max_bits = offsets
            .iter()
            .map(|&c| WORD_BITS - c.leading_zeros() as usize)
            .max()
            .unwrap_or(0);
        for i in 0..max_bits {
            for (j, &c) in offsets.iter().enumerate() {
                if c & (1u64 << i) != 0 {
                    key.set(d * i + (d - 1 - j));
                }
            }
        }
        key
    }

    /// Decode into `d` signed coordinates.
    pub fn decode(&self, d: usize) -> Vec<i64> {
        self.decode_offsets(d).into_iter().map(|c| c as i64).collect()
    }

    /// Decode into `d` unsigned offsets.
    pub fn decode_offsets(&self, d: usize) -> Vec<u64> {
        let mut point = vec![0u64; d];
        if d == 0 {
            return point;
        }
        for k in 0..self.len() {
            if self.bit(k) {
                let shift = k / d;
                if shift < WORD_BITS {
                    point[d - 1 - k % d] |= 1u64 << shift;
                }
            }
        }
        point
    }

    /// Index of the highest set bit plus one; 0 for the empty key.
    pub fn len(&self) -> usize {
        match self.words.last() {
            Some(&top) => {
                (self.words.len() - 1) * WORD_BITS + (WORD_BITS - top.leading_zeros() as usize)
            }
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .map_or(false, |w| w & (1u64 << (index % WORD_BITS)) != 0)
    }

    pub fn set(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % WORD_BITS);
    }

    /// Key with bits `[0, k)` set.
    pub fn with_low_bits(k: usize) -> Self {
        let mut words = vec![u64::MAX; k / WORD_BITS];
        let rest = k % WORD_BITS;
        if rest > 0 {
            words.push((1u64 << rest) - 1);
        }
        Self { words }
    }

    /// Whether bits `[start, start + width)` agree between the two keys.
    pub fn groups_equal(&self, other: &ZKey, start: usize, width: usize) -> bool {
        (start..start + width).all(|i| self.bit(i) == other.bit(i))
    }

    /// Size of the smallest aligned Z block holding both keys, as a low-bit mask.
    ///
    /// For keys of equal length the mask covers every `d`-bit group from the
    /// top-most disagreeing one down, and is empty for equal keys. Keys of
    /// different length get a mask spanning the longer key, rounded up to a
    /// whole group.
    pub fn common_prefix_area(a: &ZKey, b: &ZKey, d: usize) -> ZKey {
        let la = a.len();
        let lb = b.len();
        if d == 0 {
            return ZKey::default();
        }
        if la == lb {
            let mut k = (la / d * d) as isize;
            if la % d == 0 {
                k -= d as isize;
            }
            while k >= 0 && a.groups_equal(b, k as usize, d) {
                k -= d as isize;
            }
            ZKey::with_low_bits((k + d as isize) as usize)
        } else {
            let top = la.max(lb).saturating_sub(1);
            let mut k = top / d * d;
            if top % d != 0 {
                k += d;
            }
            ZKey::with_low_bits(k)
        }
    }
}

impl Ord for ZKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.words
            .len()
            .cmp(&other.words.len())
            .then_with(|| self.words.iter().rev().cmp(other.words.iter().rev()))
    }
}

impl PartialOrd for ZKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
