//! Shared fixtures for tests that exercise the whole crate.

use float_next_after::NextAfter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{QuadTree, QuadTreeBuilder};


/// Deterministic random points inside `[start, start + width)` on both axes.
pub(crate) fn random_points(seed: u64, n: usize, start: f64, width: f64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Rounding may push `start + r * width` onto the excluded upper bound.
    let upper = (start + width).next_after(f64::NEG_INFINITY);
    (0..n)
        .map(|_| {
            (
                (start + rng.gen::<f64>() * width).min(upper),
                (start + rng.gen::<f64>() * width).min(upper),
            )
        })
        .collect()
}

/// A tree over `[start, start + width)` holding the index of each point as its element.
pub(crate) fn indexed_tree(
    points: &[(f64, f64)],
    width: u64,
    start: f64,
    capacity: usize,
) -> QuadTree<usize> {
    let mut tree = QuadTreeBuilder::new(width)
        .origin(start, start)
        .capacity(capacity)
        .finish()
        .unwrap();
    for (i, (x, y)) in points.iter().enumerate() {
        assert!(tree.insert(*x, *y, i).is_some());
    }
    tree
}
