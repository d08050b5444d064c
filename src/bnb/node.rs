//! Search node representation and the include/exclude branching rule.

use super::types::{Edge, Tour};
use crate::error::Infeasibility;
use crate::matrix::{BranchCell, CostMatrix, ReductionEngine};

/// A partial solution in the branch-and-bound tree.
///
/// Each node owns its matrix outright; children are built from a snapshot
/// of the parent and never share storage with it or with each other.
#[derive(Debug, Clone)]
pub struct BranchNode {
    /// Unique node identifier.
    id: usize,

    /// Parent node ID (None for root).
    parent: Option<usize>,

    /// Depth in the tree (0 for root).
    depth: usize,

    /// Remaining choices: rows are cities still to be left, columns cities
    /// still to be entered.
    matrix: CostMatrix,

    /// Lower bound on any tour completing this node.
    lower_bound: f64,

    /// Cell chosen by the last reduction.
    branch: Option<BranchCell>,

    /// Edges fixed so far, in the order they were fixed.
    path: Vec<Edge>,
}

impl BranchNode {
    /// Create the root node from the full input matrix. Not yet reduced.
    pub fn root(id: usize, matrix: CostMatrix) -> Self {
        Self {
            id,
            parent: None,
            depth: 0,
            matrix,
            lower_bound: 0.0,
            branch: None,
            path: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// The branching cell, once the node has been reduced.
    pub fn branch(&self) -> Option<BranchCell> {
        self.branch
    }

    pub fn path(&self) -> &[Edge] {
        &self.path
    }

    /// Two cities left: the tour is determined by the fixed path.
    pub fn is_terminal(&self) -> bool {
        self.matrix.size() <= 2
    }

    /// Reduces the matrix, raises the bound and selects the branching cell.
    pub fn reduce(&mut self) -> Result<(), Infeasibility> {
        let reduction = ReductionEngine::reduce(&mut self.matrix)?;
        self.lower_bound += reduction.bound_increase;
        self.branch = Some(reduction.branch);
        Ok(())
    }

    /// Child in which the branching edge is forbidden.
    ///
    /// The bound grows by the cell's penalty. The penalty is absorbed into
    /// the child's matrix right away (row `zr` and column `zc` are
    /// re-reduced), so a later [`reduce`](Self::reduce) does not count it
    /// again.
    pub fn exclude(&self, id: usize) -> Result<BranchNode, Infeasibility> {
        let cell = self.branch.ok_or(Infeasibility::NoZeroCell)?;

        if !self.matrix.has_row(cell.row) || !self.matrix.has_col(cell.col) {
            return Err(Infeasibility::InactiveBranch {
                row: cell.row,
                col: cell.col,
            });
        }

        let mut matrix = self.matrix.clone();
        matrix.forbid(cell.row, cell.col);
        if matrix.reduce_row(cell.row).is_infinite() {
            return Err(Infeasibility::EmptyRow(cell.row));
        }
        if matrix.reduce_col(cell.col).is_infinite() {
            return Err(Infeasibility::EmptyColumn(cell.col));
        }

        Ok(BranchNode {
            id,
            parent: Some(self.id),
            depth: self.depth + 1,
            matrix,
            lower_bound: self.lower_bound + cell.penalty,
            branch: None,
            path: self.path.clone(),
        })
    }

    /// Child in which the branching edge is fixed into the tour.
    ///
    /// Row `zr` and column `zc` leave the matrix. The edge closing the
    /// fixed chain that now contains `(zr, zc)` is forbidden so no
    /// sub-cycle can form; for an isolated edge that is `(zc, zr)`.
    pub fn include(&self, id: usize) -> Result<BranchNode, Infeasibility> {
        let cell = self.branch.ok_or(Infeasibility::NoZeroCell)?;
        let Ok(mut matrix) = self.matrix.remove_row_and_col(cell.row, cell.col) else {
            return Err(Infeasibility::InactiveBranch {
                row: cell.row,
                col: cell.col,
            });
        };

        let edge = Edge::new(cell.row, cell.col);
        let (first, last) = chain_ends(&self.path, edge);
        if matrix.has_row(last) && matrix.has_col(first) {
            matrix.forbid(last, first);
        }

        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(edge);

        Ok(BranchNode {
            id,
            parent: Some(self.id),
            depth: self.depth + 1,
            matrix,
            lower_bound: self.lower_bound,
            branch: None,
            path,
        })
    }

    /// Closes a terminal node into a full tour priced on `costs`.
    ///
    /// Both assignments of the remaining 2x2 matrix are tried; the cheaper
    /// one that forms a single Hamiltonian cycle wins.
    ///
    /// Fails with [`Infeasibility::NoCompletion`] if no assignment does, or
    /// if the node is not terminal.
    pub fn complete(&self, costs: &CostMatrix) -> Result<Tour, Infeasibility> {
        let tour = match (self.matrix.row_ids(), self.matrix.col_ids()) {
            (&[a, b], &[c, d]) => [[(a, c), (b, d)], [(a, d), (b, c)]]
                .into_iter()
                .filter(|pair| pair.iter().all(|&(r, col)| self.matrix.get(r, col).is_finite()))
                .filter_map(|pair| {
                    let mut edges = self.path.clone();
                    edges.extend(pair.iter().map(|&(r, col)| Edge::new(r, col)));
                    Tour::from_edges(&edges, costs)
                })
                .min_by(|x, y| x.cost.total_cmp(&y.cost)),
            _ => None,
        };
        tour.ok_or(Infeasibility::NoCompletion)
    }
}

#[cfg(test)]
impl BranchNode {
    /// Unreduced two-city node with the given depth and bound.
    pub(crate) fn for_test(id: usize, depth: usize, lower_bound: f64) -> Self {
        let matrix = CostMatrix::from_data(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
        Self {
            depth,
            lower_bound,
            ..Self::root(id, matrix)
        }
    }
}

/// First and last city of the fixed chain through `edge`.
fn chain_ends(path: &[Edge], edge: Edge) -> (usize, usize) {
    let mut first = edge.from;
    for _ in 0..path.len() {
        match path.iter().find(|e| e.to == first) {
            Some(e) => first = e.from,
            None => break,
        }
    }

    let mut last = edge.to;
    for _ in 0..path.len() {
        match path.iter().find(|e| e.from == last) {
            Some(e) => last = e.to,
            None => break,
        }
    }

    (first, last)
}
