//! Seeded instance generators and an exhaustive reference solver.
//!
//! Used by tests and benchmarks; all generators are deterministic for a
//! given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random asymmetric cost table with integer costs in `1..=max_cost`.
///
/// The diagonal is `f64::INFINITY`.
pub fn random_asymmetric(n: usize, max_cost: u32, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let max_cost = max_cost.max(1);
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        f64::INFINITY
                    } else {
                        f64::from(rng.random_range(1..=max_cost))
                    }
                })
                .collect()
        })
        .collect()
}

/// Symmetric table of Euclidean distances between `n` random points in
/// the unit square, scaled by 100 and rounded to integers.
pub fn random_euclidean(n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
        .collect();

    points
        .iter()
        .enumerate()
        .map(|(i, &(xi, yi))| {
            points
                .iter()
                .enumerate()
                .map(|(j, &(xj, yj))| {
                    if i == j {
                        f64::INFINITY
                    } else {
                        ((xi - xj).hypot(yi - yj) * 100.0).round()
                    }
                })
                .collect()
        })
        .collect()
}

/// Cheapest tour by enumerating every permutation that starts at city 0.
///
/// Returns the visiting order and its cost, or `None` when every tour
/// uses a forbidden (infinite) edge. Diagonal entries are ignored.
/// Intended for small `n` only.
pub fn brute_force<R: AsRef<[f64]>>(costs: &[R]) -> Option<(Vec<usize>, f64)> {
    let n = costs.len();
    if n < 2 {
        return None;
    }

    let cost = |i: usize, j: usize| costs[i].as_ref()[j];
    let mut rest: Vec<usize> = (1..n).collect();
    let mut best: Option<(Vec<usize>, f64)> = None;

    permute(&mut rest, 0, &mut |order| {
        let mut total = cost(0, order[0]);
        for pair in order.windows(2) {
            total += cost(pair[0], pair[1]);
        }
        total += cost(order[order.len() - 1], 0);

        if total.is_finite() && best.as_ref().map_or(true, |(_, b)| total < *b) {
            let mut cities = Vec::with_capacity(n);
            cities.push(0);
            cities.extend_from_slice(order);
            best = Some((cities, total));
        }
    });

    best
}

/// Visits every permutation of `items[k..]` by recursive swapping.
fn permute<F: FnMut(&[usize])>(items: &mut [usize], k: usize, visit: &mut F) {
    if k == items.len() {
        visit(items);
        return;
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, visit);
        items.swap(k, i);
    }
}
