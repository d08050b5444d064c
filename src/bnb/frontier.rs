//! Node priority queue for best-first exploration.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::config::NodeSelection;
use super::node::BranchNode;

/// Entry in the frontier with its priority.
struct QueuedNode {
    node: BranchNode,
    /// Higher = selected first. Compared lexicographically.
    priority: (f64, f64),
    /// Insertion order; earlier wins ties.
    seq: u64,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .0
            .total_cmp(&other.priority.0)
            .then_with(|| self.priority.1.total_cmp(&other.priority.1))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Open nodes of the search, extracted in [`NodeSelection`] order.
///
/// With [`NodeSelection::BestBound`] the node with the smallest lower bound
/// is extracted first. Equal priorities come out in insertion order, which
/// keeps the whole search reproducible.
pub struct Frontier {
    /// Node selection strategy.
    strategy: NodeSelection,

    /// Priority queue (max-heap by priority).
    heap: BinaryHeap<QueuedNode>,

    /// Sequence number for the next pushed node.
    next_seq: u64,
}

impl Frontier {
    pub fn new(strategy: NodeSelection) -> Self {
        Self {
            strategy,
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Add a node to the frontier.
    pub fn push(&mut self, node: BranchNode) {
        let priority = self.compute_priority(&node);
        self.heap.push(QueuedNode {
            node,
            priority,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Remove and return the most promising node.
    pub fn pop(&mut self) -> Option<BranchNode> {
        self.heap.pop().map(|q| q.node)
    }

    /// Smallest lower bound among queued nodes, infinity when empty.
    pub fn best_bound(&self) -> f64 {
        self.heap
            .iter()
            .map(|q| q.node.lower_bound())
            .fold(f64::INFINITY, f64::min)
    }

    /// Drops every node whose bound reaches `incumbent - tolerance`.
    ///
    /// Returns the number of pruned nodes.
    pub fn prune_by_bound(&mut self, incumbent: f64, tolerance: f64) -> usize {
        let before = self.heap.len();
        self.heap
            .retain(|q| q.node.lower_bound() < incumbent - tolerance);
        before - self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    fn compute_priority(&self, node: &BranchNode) -> (f64, f64) {
        match self.strategy {
            // Lowest bound first (negate for max-heap)
            NodeSelection::BestBound => (-node.lower_bound(), 0.0),
            NodeSelection::DepthFirst => (node.depth() as f64, -node.lower_bound()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: usize, depth: usize, bound: f64) -> BranchNode {
        BranchNode::for_test(id, depth, bound)
    }

    #[test]
    fn test_best_bound_selection() {
        let mut frontier = Frontier::new(NodeSelection::BestBound);
        frontier.push(node(1, 0, 10.0));
        frontier.push(node(2, 0, 4.0));
        frontier.push(node(3, 0, 16.0));

        assert_eq!(frontier.best_bound(), 4.0);

        assert_eq!(frontier.pop().unwrap().id(), 2);
        assert_eq!(frontier.pop().unwrap().id(), 1);
        assert_eq!(frontier.pop().unwrap().id(), 3);
        assert!(frontier.is_empty());
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn test_ties_pop_in_insertion_order() {
        let mut frontier = Frontier::new(NodeSelection::BestBound);
        for id in [7, 3, 9] {
            frontier.push(node(id, 0, 6.0));
        }
        let order: Vec<usize> = std::iter::from_fn(|| frontier.pop().map(|n| n.id())).collect();
        assert_eq!(order, vec![7, 3, 9]);
    }

    #[test]
    fn test_depth_first_selection() {
        let mut frontier = Frontier::new(NodeSelection::DepthFirst);
        frontier.push(node(1, 0, 2.0));
        frontier.push(node(2, 2, 10.0));
        frontier.push(node(3, 1, 4.0));
        frontier.push(node(4, 2, 8.0));

        // Deepest first, then lowest bound
        assert_eq!(frontier.pop().unwrap().id(), 4);
        assert_eq!(frontier.pop().unwrap().id(), 2);
        assert_eq!(frontier.pop().unwrap().id(), 3);
        assert_eq!(frontier.pop().unwrap().id(), 1);
    }

    #[test]
    fn test_pruning() {
        let mut frontier = Frontier::new(NodeSelection::BestBound);
        for i in 0..5 {
            frontier.push(node(i, 0, i as f64 * 10.0)); // 0, 10, 20, 30, 40
        }
        assert_eq!(frontier.len(), 5);

        // Prune nodes with bound >= 25
        let pruned = frontier.prune_by_bound(25.0, 0.0);
        assert_eq!(pruned, 2);
        assert_eq!(frontier.len(), 3);

        // Bound equal to the incumbent is pruned as well
        assert_eq!(frontier.prune_by_bound(10.0, 0.0), 2);
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.best_bound(), 0.0);
    }

    #[test]
    fn test_pruning_tolerance() {
        let mut frontier = Frontier::new(NodeSelection::BestBound);
        frontier.push(node(1, 0, 9.9999999999));
        assert_eq!(frontier.prune_by_bound(10.0, 1e-9), 1);
    }

    #[test]
    fn test_empty_frontier() {
        let frontier = Frontier::new(NodeSelection::BestBound);
        assert!(frontier.best_bound().is_infinite());
        assert!(frontier.is_empty());
        assert_eq!(frontier.len(), 0);
    }
}
