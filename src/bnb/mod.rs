//! Little's branch-and-bound for the asymmetric TSP.
//!
//! Every node owns a reduced cost matrix whose reduction constant is an
//! admissible lower bound. The node with the smallest bound is expanded
//! first by splitting on one zero cell: the *exclude* child forbids that
//! edge, the *include* child fixes it and removes its row and column.
//! A node with two cities left closes into a complete tour. The search
//! ends when no open node can beat the best tour found.
//!
//! # References
//!
//! - Little, J.D.C., Murty, K.G., Sweeney, D.W. & Karel, C. (1963). "An Algorithm
//!   for the Traveling Salesman Problem", *Operations Research* 11(6), 972-989.

mod config;
mod frontier;
mod node;
mod runner;
mod types;

pub use config::{BnbConfig, NodeSelection};
pub use frontier::Frontier;
pub use node::BranchNode;
pub use runner::{BnbResult, BnbRunner};
pub use types::{
    Edge, NoopObserver, PruneReason, SearchEvent, SearchObserver, SearchStats, SearchStatus, Tour,
};
