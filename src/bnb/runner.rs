//! Best-first branch-and-bound search loop.
//!
//! # Algorithm
//!
//! 1. Reduce the root matrix; an irreducible root means no tour exists
//! 2. Pop the open node with the smallest lower bound
//! 3. Check cancellation, deadline and node budget
//! 4. Prune the node if its bound reaches the best tour cost
//! 5. A terminal node (two cities left) is closed into a complete tour,
//!    which replaces the best tour if cheaper
//! 6. Otherwise branch on its selected zero cell: one child forbids the
//!    edge, one fixes it; each child is reduced and admitted only if it is
//!    feasible and its bound is below the best tour cost
//! 7. When the frontier is empty the best tour is optimal
//!
//! # Reference
//!
//! Little, Murty, Sweeney & Karel (1963), "An Algorithm for the Traveling
//! Salesman Problem", *Operations Research* 11(6), 972-989.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use super::config::BnbConfig;
use super::frontier::Frontier;
use super::node::BranchNode;
use super::types::{
    NoopObserver, PruneReason, SearchEvent, SearchObserver, SearchStats, SearchStatus, Tour,
};
use crate::error::{Infeasibility, TspError, TspResult};
use crate::matrix::CostMatrix;
use crate::timing::Timer;

/// Result of a branch-and-bound run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbResult {
    /// Best tour found. Always present when `status` is `Optimal`.
    pub tour: Option<Tour>,

    /// How the search ended.
    pub status: SearchStatus,

    /// Lower bound of the root node.
    pub root_bound: f64,

    /// Proven lower bound on the optimal cost when the search stopped.
    ///
    /// Equals the tour cost when `status` is `Optimal`.
    pub lower_bound: f64,

    /// Improving tours in the order they were found (the last one is
    /// `tour`). Empty when candidate recording is disabled.
    pub candidates: Vec<Tour>,

    /// Search counters.
    pub stats: SearchStats,
}

impl BnbResult {
    /// Whether the tour is proven optimal.
    pub fn is_optimal(&self) -> bool {
        self.status == SearchStatus::Optimal
    }

    /// Cost of the best tour, if any.
    pub fn best_cost(&self) -> Option<f64> {
        self.tour.as_ref().map(|t| t.cost)
    }

    /// Relative distance between the best tour and the proven lower bound.
    ///
    /// 0 for an optimal result, `None` without a tour.
    pub fn gap(&self) -> Option<f64> {
        let cost = self.best_cost()?;
        if cost <= 0.0 {
            return Some(0.0);
        }
        Some(((cost - self.lower_bound) / cost).max(0.0))
    }
}

/// Executes the branch-and-bound search.
pub struct BnbRunner;

impl BnbRunner {
    /// Solves the TSP over `costs` to optimality.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_tsp_bnb::bnb::{BnbConfig, BnbRunner};
    /// use u_tsp_bnb::matrix::CostMatrix;
    ///
    /// let costs = CostMatrix::from_data(&[
    ///     [0.0, 10.0, 15.0, 20.0],
    ///     [5.0, 0.0, 9.0, 10.0],
    ///     [6.0, 13.0, 0.0, 12.0],
    ///     [8.0, 8.0, 9.0, 0.0],
    /// ]).unwrap();
    ///
    /// let result = BnbRunner::run(&costs, &BnbConfig::default()).unwrap();
    /// assert!(result.is_optimal());
    /// assert_eq!(result.best_cost(), Some(35.0));
    /// ```
    pub fn run(costs: &CostMatrix, config: &BnbConfig) -> TspResult<BnbResult> {
        Self::run_with_cancel(costs, config, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// The flag is checked once per loop iteration. When it is set, the
    /// search stops and returns the best tour found so far with
    /// [`SearchStatus::Cancelled`].
    pub fn run_with_cancel(
        costs: &CostMatrix,
        config: &BnbConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> TspResult<BnbResult> {
        Self::run_observed(costs, config, cancel, &mut NoopObserver)
    }

    /// Runs the search, reporting every step to `observer`.
    ///
    /// # Errors
    ///
    /// - [`TspError::InvalidConfig`] if `config` fails validation
    /// - [`TspError::InvalidInput`] if `costs` has removed cities, or if no
    ///   tour exists (detected at the root or after exhausting the tree)
    pub fn run_observed<O: SearchObserver>(
        costs: &CostMatrix,
        config: &BnbConfig,
        cancel: Option<Arc<AtomicBool>>,
        observer: &mut O,
    ) -> TspResult<BnbResult> {
        config.validate().map_err(TspError::InvalidConfig)?;
        if costs.size() != costs.id_space() {
            return Err(TspError::InvalidInput(
                "cost matrix must contain every city".into(),
            ));
        }

        let timer = Timer::start();
        let tolerance = config.prune_tolerance;
        let mut stats = SearchStats::default();

        // 1. Root
        let mut root = BranchNode::root(0, costs.clone());
        stats.nodes_created = 1;
        if let Err(reason) = root.reduce() {
            debug!("bnb: root infeasible ({reason})");
            return Err(TspError::no_feasible_tour());
        }
        let root_bound = root.lower_bound();
        debug!("bnb: start cities={} root_bound={root_bound}", costs.size());
        observer.on_event(&SearchEvent::RootReduced {
            lower_bound: root_bound,
        });

        let mut frontier = Frontier::new(config.node_selection);
        frontier.push(root);
        stats.max_frontier = 1;

        let mut best: Option<Tour> = None;
        let mut candidates = Vec::new();
        let mut status = SearchStatus::Optimal;
        let mut next_id = 1;

        // 2. Search loop
        while let Some(node) = frontier.pop() {
            if let Some(stop) = Self::stop_reason(config, &cancel, &timer, &stats) {
                status = stop;
                frontier.push(node);
                break;
            }

            let incumbent = best.as_ref().map_or(f64::INFINITY, |t| t.cost);
            if node.lower_bound() >= incumbent - tolerance {
                stats.nodes_pruned += 1;
                observer.on_event(&SearchEvent::Pruned {
                    node: node.id(),
                    parent: node.parent(),
                    lower_bound: node.lower_bound(),
                    reason: PruneReason::Bound,
                });
                continue;
            }

            // Terminal: close the tour
            if node.is_terminal() {
                let tour = match node.complete(costs) {
                    Ok(tour) => tour,
                    Err(reason) => {
                        stats.nodes_infeasible += 1;
                        observer.on_event(&SearchEvent::Pruned {
                            node: node.id(),
                            parent: node.parent(),
                            lower_bound: node.lower_bound(),
                            reason: PruneReason::Infeasible(reason),
                        });
                        continue;
                    }
                };

                stats.candidates += 1;
                let improved = tour.cost < incumbent;
                observer.on_event(&SearchEvent::Candidate {
                    node: node.id(),
                    cost: tour.cost,
                    improved,
                });
                if improved {
                    debug!(
                        "bnb: new best cost={} node={} depth={}",
                        tour.cost,
                        node.id(),
                        node.depth()
                    );
                    stats.nodes_pruned += frontier.prune_by_bound(tour.cost, tolerance);
                    if config.record_candidates {
                        candidates.push(tour.clone());
                    }
                    best = Some(tour);
                }
                continue;
            }

            let Some(branch) = node.branch() else {
                continue;
            };
            stats.nodes_expanded += 1;
            trace!(
                "bnb: expand node={} depth={} bound={} cell=({}, {}) penalty={}",
                node.id(),
                node.depth(),
                node.lower_bound(),
                branch.row,
                branch.col,
                branch.penalty
            );
            observer.on_event(&SearchEvent::Expanded {
                node: node.id(),
                parent: node.parent(),
                depth: node.depth(),
                lower_bound: node.lower_bound(),
                branch,
            });

            // 3. Branch: exclude, then include
            let (excluded, included) = Self::expand(&node, next_id, config.parallel);
            stats.nodes_created += 2;
            for (id, child) in [(next_id, excluded), (next_id + 1, included)] {
                match child {
                    Ok(child) if child.lower_bound() < incumbent - tolerance => {
                        frontier.push(child);
                    }
                    Ok(child) => {
                        stats.nodes_pruned += 1;
                        observer.on_event(&SearchEvent::Pruned {
                            node: id,
                            parent: Some(node.id()),
                            lower_bound: child.lower_bound(),
                            reason: PruneReason::Bound,
                        });
                    }
                    Err(reason) => {
                        stats.nodes_infeasible += 1;
                        observer.on_event(&SearchEvent::Pruned {
                            node: id,
                            parent: Some(node.id()),
                            lower_bound: f64::INFINITY,
                            reason: PruneReason::Infeasible(reason),
                        });
                    }
                }
            }
            next_id += 2;
            stats.max_frontier = stats.max_frontier.max(frontier.len());
        }

        stats.elapsed_ms = timer.elapsed_millis() as u64;
        let best_cost = best.as_ref().map(|t| t.cost);
        debug!(
            "bnb: finished status={status:?} best={best_cost:?} expanded={} elapsed_ms={}",
            stats.nodes_expanded, stats.elapsed_ms
        );
        observer.on_event(&SearchEvent::Finished { status, best_cost });

        if status == SearchStatus::Optimal && best.is_none() {
            return Err(TspError::no_feasible_tour());
        }

        let lower_bound = match status {
            SearchStatus::Optimal => best_cost.unwrap_or(f64::INFINITY),
            _ => frontier
                .best_bound()
                .min(best_cost.unwrap_or(f64::INFINITY)),
        };

        Ok(BnbResult {
            tour: best,
            status,
            root_bound,
            lower_bound,
            candidates,
            stats,
        })
    }

    /// Checks the cancellation flag, the deadline and the node budget.
    fn stop_reason(
        config: &BnbConfig,
        cancel: &Option<Arc<AtomicBool>>,
        timer: &Timer,
        stats: &SearchStats,
    ) -> Option<SearchStatus> {
        if let Some(ref flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return Some(SearchStatus::Cancelled);
            }
        }
        if config.time_limit_ms > 0
            && timer.elapsed_millis() >= u128::from(config.time_limit_ms)
        {
            return Some(SearchStatus::TimeLimit);
        }
        if config.max_nodes > 0 && stats.nodes_expanded >= config.max_nodes {
            return Some(SearchStatus::NodeLimit);
        }
        None
    }

    /// Builds and reduces both children of `node`.
    fn expand(
        node: &BranchNode,
        next_id: usize,
        parallel: bool,
    ) -> (
        Result<BranchNode, Infeasibility>,
        Result<BranchNode, Infeasibility>,
    ) {
        let excluded = || -> Result<BranchNode, Infeasibility> {
            let mut child = node.exclude(next_id)?;
            child.reduce()?;
            Ok(child)
        };
        let included = || -> Result<BranchNode, Infeasibility> {
            let mut child = node.include(next_id + 1)?;
            child.reduce()?;
            Ok(child)
        };
        join(parallel, excluded, included)
    }
}

#[cfg(feature = "parallel")]
fn join<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if parallel {
        rayon::join(a, b)
    } else {
        (a(), b())
    }
}

#[cfg(not(feature = "parallel"))]
fn join<A, B, RA, RB>(_parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}

// ============================================================================
// Tests
// ============================================================================
