#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zskyline::{dominates, Point};

/// Reference skyline, sorted and without duplicates.
///
/// Points are visited in lexicographic order, so every dominator of a point
/// comes before it; each point is tested against the points kept so far.
pub fn brute_force_skyline(points: &[Point]) -> Vec<Point> {
    let mut candidates = points.to_vec();
    candidates.sort();
    candidates.dedup();
    let mut skyline: Vec<Point> = Vec::new();
    for p in candidates {
        if !skyline.iter().any(|q| dominates(q, &p)) {
            skyline.push(p);
        }
    }
    skyline
}

pub fn sorted(mut points: Vec<Point>) -> Vec<Point> {
    points.sort();
    points
}

/// Uniform points in `[0, max)` per dimension.
pub fn independent_points(seed: u64, n: usize, d: usize, max: i64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..d).map(|_| rng.gen_range(0..max)).collect())
        .collect()
}

/// Points spread around the hyperplane where coordinates sum to `max`,
/// which makes large skylines.
pub fn anti_correlated_points(seed: u64, n: usize, d: usize, max: i64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let first = rng.gen_range(0..max);
            let related = max - first;
            let mut point = vec![first];
            for _ in 1..d {
                let jitter = (rng.gen::<f64>() - 0.5) * 0.1 * related as f64;
                point.push(((related as f64 + jitter) as i64).clamp(0, max));
            }
            point
        })
        .collect()
}
