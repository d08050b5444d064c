//! Exact solver for the asymmetric Traveling Salesman Problem.
//!
//! Finds a minimum-cost Hamiltonian cycle with Little's branch-and-bound:
//!
//! - **Reduction**: subtracting row and column minima from the cost matrix
//!   yields an admissible lower bound for every tour it still admits.
//! - **Branching**: the zero cell with the largest exclusion penalty splits
//!   a node into one child that forbids the edge and one that fixes it.
//! - **Search**: open nodes are expanded best-bound first and pruned
//!   against the cheapest tour found so far.
//!
//! # Modules
//!
//! - [`matrix`]: cost matrix and reduction engine
//! - [`bnb`]: search nodes, frontier, configuration and the runner
//! - [`instances`]: seeded instance generators and a brute-force oracle
//! - [`error`]: error types
//!
//! # Examples
//!
//! ```
//! let inf = f64::INFINITY;
//! let tour = u_tsp_bnb::solve(&[
//!     [inf, 10.0, 15.0, 20.0],
//!     [5.0, inf, 9.0, 10.0],
//!     [6.0, 13.0, inf, 12.0],
//!     [8.0, 8.0, 9.0, inf],
//! ]).unwrap();
//!
//! assert_eq!(tour.cities, vec![0, 1, 3, 2]);
//! assert_eq!(tour.cost, 35.0);
//! ```

pub mod bnb;
pub mod error;
pub mod instances;
pub mod matrix;
mod timing;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use bnb::{BnbConfig, BnbResult, BnbRunner, Tour};
pub use error::{TspError, TspResult};
pub use matrix::CostMatrix;

/// Solves the TSP over an `n x n` cost table with the default configuration.
///
/// Diagonal entries are ignored; off-diagonal `f64::INFINITY` marks a
/// forbidden edge.
///
/// # Errors
///
/// [`TspError::InvalidInput`] if the table is malformed or admits no tour.
pub fn solve<R: AsRef<[f64]>>(costs: &[R]) -> TspResult<Tour> {
    let matrix = CostMatrix::from_data(costs)?;
    let result = BnbRunner::run(&matrix, &BnbConfig::default())?;
    result.tour.ok_or_else(TspError::no_feasible_tour)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_rejects_bad_input() {
        assert!(matches!(solve(&[[0.0]]), Err(TspError::InvalidInput(_))));
        assert!(matches!(
            solve(&[vec![0.0, 1.0], vec![1.0]]),
            Err(TspError::InvalidInput(_))
        ));
        assert!(matches!(
            solve(&[[0.0, -1.0], [1.0, 0.0]]),
            Err(TspError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_solve_no_tour() {
        let inf = f64::INFINITY;
        assert_eq!(
            solve(&[[0.0, inf], [1.0, 0.0]]).unwrap_err(),
            TspError::no_feasible_tour()
        );
    }

    #[test]
    fn test_solve_starts_at_city_zero() {
        let tour = solve(&instances::random_asymmetric(7, 40, 2)).unwrap();
        assert_eq!(tour.cities[0], 0);
        assert_eq!(tour.len(), 7);
        let mut sorted = tour.cities.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..7).collect::<Vec<_>>());
    }
}
