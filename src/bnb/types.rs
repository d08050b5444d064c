//! Tours, search statistics and trace events.

use crate::error::Infeasibility;
use crate::matrix::{BranchCell, CostMatrix};

/// A directed edge `from -> to` fixed into a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// City being left.
    pub from: usize,
    /// City being entered.
    pub to: usize,
}

impl Edge {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// A complete Hamiltonian cycle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    /// Visiting order, starting at city 0. The closing return to city 0 is
    /// implied and not repeated.
    pub cities: Vec<usize>,
    /// The `n` directed edges in visiting order.
    pub edges: Vec<Edge>,
    /// Total cost under the input cost table.
    pub cost: f64,
}

impl Tour {
    /// Assembles a tour from an unordered set of edges.
    ///
    /// Returns `None` unless the edges form a single cycle through every
    /// city of `costs` using only finite cells.
    pub fn from_edges(edges: &[Edge], costs: &CostMatrix) -> Option<Tour> {
        let n = costs.id_space();
        if edges.len() != n {
            return None;
        }

        let mut next: Vec<Option<usize>> = vec![None; n];
        for edge in edges {
            if edge.from >= n || edge.to >= n || next[edge.from].is_some() {
                return None;
            }
            next[edge.from] = Some(edge.to);
        }

        let mut cities = Vec::with_capacity(n);
        let mut ordered = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        let mut cost = 0.0;
        let mut current = 0;
        for _ in 0..n {
            if visited[current] {
                return None;
            }
            visited[current] = true;
            cities.push(current);

            let to = next[current]?;
            let value = costs.try_get(current, to)?;
            if !value.is_finite() {
                return None;
            }
            cost += value;
            ordered.push(Edge::new(current, to));
            current = to;
        }

        if current != 0 {
            return None;
        }

        Some(Tour {
            cities,
            edges: ordered,
            cost,
        })
    }

    /// Number of cities visited.
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    /// The frontier was exhausted: the best tour is proven optimal.
    Optimal,
    /// Stopped by the cancellation flag.
    Cancelled,
    /// Stopped by the time limit.
    TimeLimit,
    /// Stopped by the node expansion budget.
    NodeLimit,
}

impl SearchStatus {
    /// Whether the search stopped before proving optimality.
    pub fn is_partial(&self) -> bool {
        !matches!(self, SearchStatus::Optimal)
    }
}

/// Counters collected during a search.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Nodes built, root included.
    pub nodes_created: usize,
    /// Nodes branched into two children.
    pub nodes_expanded: usize,
    /// Nodes discarded because their bound reached the best tour cost.
    pub nodes_pruned: usize,
    /// Nodes discarded because their matrix could not be reduced.
    pub nodes_infeasible: usize,
    /// Complete tours evaluated at terminal nodes.
    pub candidates: usize,
    /// Largest frontier size observed.
    pub max_frontier: usize,
    /// Wall-clock duration of the search in milliseconds.
    pub elapsed_ms: u64,
}

/// Why a node left the search without being expanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PruneReason {
    /// Its lower bound reached the best known tour cost.
    Bound,
    /// Its matrix cannot be reduced.
    Infeasible(Infeasibility),
}

/// Trace events emitted by the search, in order of occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The root matrix was reduced.
    RootReduced {
        /// Lower bound of the root node.
        lower_bound: f64,
    },
    /// A node was branched on `branch`.
    Expanded {
        node: usize,
        /// `None` for the root.
        parent: Option<usize>,
        depth: usize,
        lower_bound: f64,
        branch: BranchCell,
    },
    /// A node was discarded.
    Pruned {
        node: usize,
        parent: Option<usize>,
        lower_bound: f64,
        reason: PruneReason,
    },
    /// A terminal node produced a complete tour.
    Candidate {
        node: usize,
        cost: f64,
        /// Whether it became the new best tour.
        improved: bool,
    },
    /// The search loop ended.
    Finished {
        status: SearchStatus,
        best_cost: Option<f64>,
    },
}

/// Receives [`SearchEvent`]s as the search runs.
///
/// Any `FnMut(&SearchEvent)` closure is an observer.
///
/// # Examples
///
/// ```
/// use u_tsp_bnb::bnb::{BnbConfig, BnbRunner, SearchEvent};
/// use u_tsp_bnb::matrix::CostMatrix;
///
/// let m = CostMatrix::from_data(&[[0.0, 2.0], [3.0, 0.0]]).unwrap();
/// let mut events = Vec::new();
/// let mut record = |e: &SearchEvent| events.push(e.clone());
/// BnbRunner::run_observed(&m, &BnbConfig::default(), None, &mut record).unwrap();
/// assert!(matches!(events[0], SearchEvent::RootReduced { .. }));
/// ```
pub trait SearchObserver {
    fn on_event(&mut self, event: &SearchEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_event(&mut self, _event: &SearchEvent) {}
}

impl<F: FnMut(&SearchEvent)> SearchObserver for F {
    fn on_event(&mut self, event: &SearchEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costs() -> CostMatrix {
        CostMatrix::from_data(&[
            [0.0, 1.0, 2.0, 3.0],
            [4.0, 0.0, 5.0, 6.0],
            [7.0, 8.0, 0.0, 9.0],
            [1.0, 2.0, 3.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_tour_from_edges_orders_cycle() {
        let edges = [
            Edge::new(2, 3),
            Edge::new(0, 1),
            Edge::new(3, 0),
            Edge::new(1, 2),
        ];
        let tour = Tour::from_edges(&edges, &costs()).unwrap();
        assert_eq!(tour.cities, vec![0, 1, 2, 3]);
        assert_eq!(tour.edges[0], Edge::new(0, 1));
        assert_eq!(tour.edges[3], Edge::new(3, 0));
        assert_eq!(tour.cost, 1.0 + 5.0 + 9.0 + 1.0);
        assert_eq!(tour.len(), 4);
    }

    #[test]
    fn test_tour_rejects_subtours() {
        let edges = [
            Edge::new(0, 1),
            Edge::new(1, 0),
            Edge::new(2, 3),
            Edge::new(3, 2),
        ];
        assert!(Tour::from_edges(&edges, &costs()).is_none());
    }

    #[test]
    fn test_tour_rejects_wrong_edge_count() {
        let edges = [Edge::new(0, 1), Edge::new(1, 0)];
        assert!(Tour::from_edges(&edges, &costs()).is_none());
    }

    #[test]
    fn test_tour_rejects_forbidden_edge() {
        let m = CostMatrix::from_data(&[[0.0, f64::INFINITY], [1.0, 0.0]]).unwrap();
        let edges = [Edge::new(0, 1), Edge::new(1, 0)];
        assert!(Tour::from_edges(&edges, &m).is_none());
    }

    #[test]
    fn test_status_partial() {
        assert!(!SearchStatus::Optimal.is_partial());
        assert!(SearchStatus::Cancelled.is_partial());
        assert!(SearchStatus::TimeLimit.is_partial());
        assert!(SearchStatus::NodeLimit.is_partial());
    }

    #[test]
    fn test_closure_observer() {
        let mut count = 0;
        {
            let mut observer = |_: &SearchEvent| count += 1;
            observer.on_event(&SearchEvent::RootReduced { lower_bound: 0.0 });
            observer.on_event(&SearchEvent::RootReduced { lower_bound: 1.0 });
        }
        assert_eq!(count, 2);
    }
}
