//! Reduced cost matrices.
//!
//! A [`CostMatrix`] is the state every branch-and-bound node owns; the
//! [`ReductionEngine`] turns it into an admissible lower bound and picks the
//! edge to branch on next.
//!
//! # Key Components
//!
//! - [`CostMatrix`]: square matrix over a shrinking set of city ids
//! - [`ReductionEngine`]: row/column reduction and penalty scan
//! - [`BranchCell`]: the zero cell chosen for branching

mod cost;
mod reduction;

pub use cost::CostMatrix;
pub use reduction::{BranchCell, Reduction, ReductionEngine};
