//! Pareto dominance under the minimisation convention.
//!
//! `a` dominates `b` when `a` is no larger in every dimension and strictly
//! smaller in at least one. Equal points never dominate each other.

/// Work counters collected during one skyline computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Point-vs-point and region-vs-point comparisons.
    pub dominance_tests: u64,
    /// Node visits and ancestor steps.
    pub node_accesses: u64,
}

/// Result of comparing two points for dominance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominanceOrdering {
    /// The first point dominates the second.
    Less,
    /// The second point dominates the first.
    Greater,
    /// Neither dominates (this includes equal points).
    Incomparable,
}

/// Whether `a` dominates `b`. Not counted.
#[inline]
pub fn dominates(a: &[i64], b: &[i64]) -> bool {
    let mut strictly_better = false;
    for (&x, &y) in a.iter().zip(b) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Whether `a` is dominated by `b`; counts one dominance test.
#[inline]
pub fn dominated_by(a: &[i64], b: &[i64], counters: &mut Counters) -> bool {
    counters.dominance_tests += 1;
    dominates(b, a)
}

/// Three-way dominance comparison; counts one dominance test.
pub fn compare_dominance(a: &[i64], b: &[i64], counters: &mut Counters) -> DominanceOrdering {
    counters.dominance_tests += 1;
    let mut a_better = false;
    let mut b_better = false;
    for (&x, &y) in a.iter().zip(b) {
        a_better |= x < y;
        b_better |= x > y;
        if a_better && b_better {
            return DominanceOrdering::Incomparable;
        }
    }
    match (a_better, b_better) {
        (true, false) => DominanceOrdering::Less,
        (false, true) => DominanceOrdering::Greater,
        _ => DominanceOrdering::Incomparable,
    }
}

/// Whether every point of a region with lower corner `region_min` is
/// dominated by `point`.
///
/// If the corner itself is dominated, every point above it is too.
#[inline]
pub fn region_dominated_by(region_min: &[i64], point: &[i64], counters: &mut Counters) -> bool {
    dominated_by(region_min, point, counters)
}

/// Drop the points of a leaf that another point of the same leaf dominates.
///
/// Survivors keep their input order.
pub fn local_skyline<'a>(points: &'a [Vec<i64>], counters: &mut Counters) -> Vec<&'a [i64]> {
    let mut survivors: Vec<&'a [i64]> = Vec::with_capacity(points.len());
    'candidates: for candidate in points {
        let mut i = 0;
        while i < survivors.len() {
            match compare_dominance(candidate, survivors[i], counters) {
                DominanceOrdering::Greater => continue 'candidates,
                DominanceOrdering::Less => {
                    survivors.remove(i);
                }
                DominanceOrdering::Incomparable => i += 1,
            }
        }
        survivors.push(candidate);
    }
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominates_requires_strict_improvement() {
        assert!(dominates(&[1, 2], &[1, 3]));
        assert!(!dominates(&[1, 3], &[1, 2]));
        assert!(!dominates(&[2, 2], &[2, 2]));
        assert!(!dominates(&[1, 5], &[5, 1]));
    }

    #[test]
    fn test_dominated_by_counts_tests() {
        let mut counters = Counters::default();
        assert!(dominated_by(&[4, 4], &[3, 3], &mut counters));
        assert!(!dominated_by(&[3, 3], &[4, 4], &mut counters));
        assert_eq!(counters.dominance_tests, 2);
        assert_eq!(counters.node_accesses, 0);
    }

    #[test]
    fn test_compare_dominance() {
        let mut counters = Counters::default();
        assert_eq!(compare_dominance(&[1, 1], &[2, 1], &mut counters), DominanceOrdering::Less);
        assert_eq!(compare_dominance(&[2, 1], &[1, 1], &mut counters), DominanceOrdering::Greater);
        assert_eq!(
            compare_dominance(&[1, 2], &[2, 1], &mut counters),
            DominanceOrdering::Incomparable
        );
        assert_eq!(
            compare_dominance(&[3, 3], &[3, 3], &mut counters),
            DominanceOrdering::Incomparable
        );
        assert_eq!(counters.dominance_tests, 4);
    }

    #[test]
    fn test_region_dominated_by_uses_min_corner() {
        let mut counters = Counters::default();
        assert!(region_dominated_by(&[5, 5], &[2, 5], &mut counters));
        assert!(!region_dominated_by(&[1, 5], &[2, 2], &mut counters));
    }

    #[test]
    fn test_local_skyline_drops_dominated_siblings() {
        let mut counters = Counters::default();
        let points = vec![vec![4, 4], vec![1, 5], vec![2, 2], vec![5, 1], vec![3, 3]];
        let survivors = local_skyline(&points, &mut counters);
        assert_eq!(survivors, vec![&[1, 5][..], &[2, 2][..], &[5, 1][..]]);
        assert!(counters.dominance_tests > 0);
    }
}
