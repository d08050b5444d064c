//! Error types for the TSP solver.

use thiserror::Error;

/// Errors surfaced to callers of the solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TspError {
    /// The cost table was rejected before the search started, or no
    /// Hamiltonian cycle exists.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A row or column id that is not active in the matrix was addressed.
    #[error("City not active in matrix: row {row}, col {col}")]
    InactiveCity {
        /// Requested row id.
        row: usize,
        /// Requested column id.
        col: usize,
    },

    /// Search configuration failed validation.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl TspError {
    /// The error reported when the cost table admits no tour at all.
    pub fn no_feasible_tour() -> Self {
        TspError::InvalidInput("no feasible tour exists".into())
    }
}

/// Result type for solver operations.
pub type TspResult<T> = Result<T, TspError>;

/// Why a matrix cannot be reduced.
///
/// This is a structural property of a search node, not a fault: the node
/// is dropped and the search continues.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    /// The row has no finite entry: the city cannot be left.
    #[error("row {0} has no finite entry")]
    EmptyRow(usize),

    /// The column has no finite entry: the city cannot be entered.
    #[error("column {0} has no finite entry")]
    EmptyColumn(usize),

    /// Reduction left no zero cell to branch on.
    #[error("no zero cell after reduction")]
    NoZeroCell,

    /// The branching cell is no longer part of the matrix.
    #[error("branch cell ({row}, {col}) is not active")]
    InactiveBranch {
        /// Row id of the cell.
        row: usize,
        /// Column id of the cell.
        col: usize,
    },

    /// Neither assignment of the last two cities closes a single cycle.
    #[error("no completing assignment closes the tour")]
    NoCompletion,
}
