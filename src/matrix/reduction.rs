//! Row/column reduction and branching-cell selection.
//!
//! # Algorithm
//!
//! 1. Subtract each row minimum from the finite cells of its row
//! 2. Subtract each column minimum from the finite cells of its column
//! 3. The sum of all subtracted minima is a lower bound on any tour
//!    completing the matrix
//! 4. Among the zero cells, pick the one whose exclusion costs the most
//!    (largest penalty); it is the most informative edge to branch on
//!
//! # Reference
//!
//! Little, Murty, Sweeney & Karel (1963), "An Algorithm for the Traveling
//! Salesman Problem", *Operations Research* 11(6), 972-989.

use super::cost::CostMatrix;
use crate::error::Infeasibility;

/// The zero cell chosen for branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchCell {
    /// Row id (the city being left).
    pub row: usize,
    /// Column id (the city being entered).
    pub col: usize,
    /// Bound increase incurred by forbidding this edge.
    pub penalty: f64,
}

/// Result of a successful [`ReductionEngine::reduce`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction {
    /// Sum of the subtracted row and column minima.
    pub bound_increase: f64,
    /// Cell to branch on next.
    pub branch: BranchCell,
}

/// Stateless reduction operations on a [`CostMatrix`].
pub struct ReductionEngine;

impl ReductionEngine {
    /// Fully reduces `matrix` and selects its branching cell.
    ///
    /// On failure the matrix may be partially reduced; the owning node is
    /// meant to be discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_tsp_bnb::matrix::{CostMatrix, ReductionEngine};
    ///
    /// let mut m = CostMatrix::from_data(&[
    ///     [0.0, 4.0, 6.0],
    ///     [3.0, 0.0, 5.0],
    ///     [2.0, 7.0, 0.0],
    /// ]).unwrap();
    ///
    /// let reduction = ReductionEngine::reduce(&mut m).unwrap();
    /// assert_eq!(reduction.bound_increase, 11.0);
    /// ```
    pub fn reduce(matrix: &mut CostMatrix) -> Result<Reduction, Infeasibility> {
        let bound_increase = Self::reduce_bound(matrix)?;
        let branch = Self::select_branch(matrix)?;
        Ok(Reduction {
            bound_increase,
            branch,
        })
    }

    /// Subtracts row then column minima and returns their sum.
    ///
    /// A matrix that is already fully reduced is left unchanged and yields 0.
    pub fn reduce_bound(matrix: &mut CostMatrix) -> Result<f64, Infeasibility> {
        let row_minima = matrix.row_minima();
        if let Some(pos) = row_minima.iter().position(|m| m.is_infinite()) {
            return Err(Infeasibility::EmptyRow(matrix.row_ids()[pos]));
        }
        let by_row = by_id(matrix.row_ids(), &row_minima, matrix.id_space());
        matrix.transform(|v, r, _| if v.is_finite() { v - by_row[r] } else { v });

        let col_minima = matrix.col_minima();
        if let Some(pos) = col_minima.iter().position(|m| m.is_infinite()) {
            return Err(Infeasibility::EmptyColumn(matrix.col_ids()[pos]));
        }
        let by_col = by_id(matrix.col_ids(), &col_minima, matrix.id_space());
        matrix.transform(|v, _, c| if v.is_finite() { v - by_col[c] } else { v });

        Ok(row_minima.iter().sum::<f64>() + col_minima.iter().sum::<f64>())
    }

    /// Picks the zero cell with the strictly largest penalty.
    ///
    /// Ties keep the first cell met in ascending row, then column order.
    pub fn select_branch(matrix: &CostMatrix) -> Result<BranchCell, Infeasibility> {
        let mut best: Option<BranchCell> = None;
        matrix.for_each_zero(|row, col| {
            let penalty = matrix.penalty(row, col);
            if best.map_or(true, |b| penalty > b.penalty) {
                best = Some(BranchCell { row, col, penalty });
            }
        });
        best.ok_or(Infeasibility::NoZeroCell)
    }
}

/// Spreads per-position values into a table indexed by logical id.
fn by_id(ids: &[usize], values: &[f64], id_space: usize) -> Vec<f64> {
    let mut table = vec![0.0; id_space];
    for (&id, &value) in ids.iter().zip(values) {
        table[id] = value;
    }
    table
}
