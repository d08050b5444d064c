//! Square cost matrix over a shrinking set of logical city ids.

use std::fmt;

use crate::error::{TspError, TspResult};

/// Cost matrix addressed by stable logical city ids.
///
/// Cells hold a finite non-negative cost or `f64::INFINITY`, which marks an
/// edge that may never be used. Diagonal cells are always infinite.
///
/// Rows and columns are tracked separately: removing row `r` and column `c`
/// (with `r != c`) leaves different id sets on each axis, but both axes
/// always have the same length. Active ids are kept in ascending order and
/// every scan visits them in that order, so results never depend on
/// storage layout.
///
/// # Examples
///
/// ```
/// use u_tsp_bnb::matrix::CostMatrix;
///
/// let m = CostMatrix::from_data(&[
///     [0.0, 3.0, 1.0],
///     [2.0, 0.0, 4.0],
///     [5.0, 6.0, 0.0],
/// ]).unwrap();
///
/// assert_eq!(m.size(), 3);
/// assert!(m.get(1, 1).is_infinite());
/// assert_eq!(m.get(0, 2), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    /// Active row ids, ascending.
    rows: Vec<usize>,
    /// Active column ids, ascending.
    cols: Vec<usize>,
    /// Logical row id -> dense row index.
    row_slot: Vec<Option<usize>>,
    /// Logical column id -> dense column index.
    col_slot: Vec<Option<usize>>,
    /// Row-major storage, `rows.len() * cols.len()`.
    data: Vec<f64>,
}

impl CostMatrix {
    /// Builds a matrix from an `n x n` cost table.
    ///
    /// Diagonal entries are ignored and forced to infinity. Off-diagonal
    /// `f64::INFINITY` entries are accepted as forbidden edges.
    ///
    /// # Errors
    ///
    /// [`TspError::InvalidInput`] if the table is not square, has fewer than
    /// two cities, or contains a negative or NaN off-diagonal cost.
    pub fn from_data<R: AsRef<[f64]>>(costs: &[R]) -> TspResult<Self> {
        let n = costs.len();
        if n < 2 {
            return Err(TspError::InvalidInput(format!(
                "at least 2 cities required, got {n}"
            )));
        }

        let mut data = Vec::with_capacity(n * n);
        for (i, row) in costs.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n {
                return Err(TspError::InvalidInput(format!(
                    "cost table is not square: row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            for (j, &value) in row.iter().enumerate() {
                if i == j {
                    data.push(f64::INFINITY);
                    continue;
                }
                if value.is_nan() {
                    return Err(TspError::InvalidInput(format!("cost ({i}, {j}) is NaN")));
                }
                if value < 0.0 {
                    return Err(TspError::InvalidInput(format!(
                        "cost ({i}, {j}) is negative: {value}"
                    )));
                }
                data.push(value);
            }
        }

        let ids: Vec<usize> = (0..n).collect();
        let slots: Vec<Option<usize>> = (0..n).map(Some).collect();

        Ok(Self {
            rows: ids.clone(),
            cols: ids,
            row_slot: slots.clone(),
            col_slot: slots,
            data,
        })
    }

    /// Number of active rows (equal to the number of active columns).
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Number of cities in the input table. Every logical id is below it.
    pub fn id_space(&self) -> usize {
        self.row_slot.len()
    }

    /// Active row ids in ascending order.
    pub fn row_ids(&self) -> &[usize] {
        &self.rows
    }

    /// Active column ids in ascending order.
    pub fn col_ids(&self) -> &[usize] {
        &self.cols
    }

    /// Whether row `r` is still active.
    pub fn has_row(&self, r: usize) -> bool {
        self.row_index(r).is_some()
    }

    /// Whether column `c` is still active.
    pub fn has_col(&self, c: usize) -> bool {
        self.col_index(c).is_some()
    }

    /// Returns the cell `(r, c)`, or `None` if either id is inactive.
    pub fn try_get(&self, r: usize, c: usize) -> Option<f64> {
        self.offset(r, c).map(|k| self.data[k])
    }

    /// Returns the cell `(r, c)`.
    ///
    /// # Panics
    ///
    /// Panics if row `r` or column `c` is not active.
    pub fn get(&self, r: usize, c: usize) -> f64 {
        match self.offset(r, c) {
            Some(k) => self.data[k],
            None => panic!("cell ({r}, {c}) is not active"),
        }
    }

    /// Overwrites the cell `(r, c)`.
    ///
    /// # Panics
    ///
    /// Panics if row `r` or column `c` is not active.
    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        match self.offset(r, c) {
            Some(k) => self.data[k] = value,
            None => panic!("cell ({r}, {c}) is not active"),
        }
    }

    /// Marks the edge `(r, c)` as never usable.
    ///
    /// # Panics
    ///
    /// Panics if row `r` or column `c` is not active.
    pub fn forbid(&mut self, r: usize, c: usize) {
        self.set(r, c, f64::INFINITY);
    }

    /// Minimum of every active row, in [`row_ids`](Self::row_ids) order.
    ///
    /// A row without a finite entry yields `f64::INFINITY`: the matrix is
    /// infeasible.
    pub fn row_minima(&self) -> Vec<f64> {
        let width = self.cols.len();
        if width == 0 {
            return Vec::new();
        }
        self.data
            .chunks(width)
            .map(|row| row.iter().copied().fold(f64::INFINITY, f64::min))
            .collect()
    }

    /// Minimum of every active column, in [`col_ids`](Self::col_ids) order.
    pub fn col_minima(&self) -> Vec<f64> {
        let width = self.cols.len();
        let mut minima = vec![f64::INFINITY; width];
        if width == 0 {
            return minima;
        }
        for row in self.data.chunks(width) {
            for (min, &value) in minima.iter_mut().zip(row) {
                *min = min.min(value);
            }
        }
        minima
    }

    /// Cost of forbidding the zero cell `(zr, zc)`.
    ///
    /// The cheapest other way into city `zc` plus the cheapest other way out
    /// of city `zr`. Infinite when either alternative does not exist, since
    /// forbidding the edge would strand a city.
    ///
    /// # Panics
    ///
    /// Panics if row `zr` or column `zc` is not active.
    pub fn penalty(&self, zr: usize, zc: usize) -> f64 {
        let enter = self
            .rows
            .iter()
            .filter(|&&r| r != zr)
            .map(|&r| self.get(r, zc))
            .fold(f64::INFINITY, f64::min);
        let leave = self
            .cols
            .iter()
            .filter(|&&c| c != zc)
            .map(|&c| self.get(zr, c))
            .fold(f64::INFINITY, f64::min);
        enter + leave
    }

    /// Returns a new matrix without row `r` and column `c`.
    ///
    /// All other ids keep their relative order; dense indices are compacted.
    ///
    /// # Errors
    ///
    /// [`TspError::InactiveCity`] if row `r` or column `c` is not active.
    pub fn remove_row_and_col(&self, r: usize, c: usize) -> TspResult<CostMatrix> {
        let (Some(skip_row), Some(skip_col)) = (self.row_index(r), self.col_index(c)) else {
            return Err(TspError::InactiveCity { row: r, col: c });
        };

        let width = self.cols.len();
        let mut data = Vec::with_capacity((width - 1) * (width - 1));
        for (i, row) in self.data.chunks(width).enumerate() {
            if i == skip_row {
                continue;
            }
            data.extend(
                row.iter()
                    .enumerate()
                    .filter(|&(j, _)| j != skip_col)
                    .map(|(_, &value)| value),
            );
        }

        let rows: Vec<usize> = self.rows.iter().copied().filter(|&id| id != r).collect();
        let cols: Vec<usize> = self.cols.iter().copied().filter(|&id| id != c).collect();

        Ok(CostMatrix {
            row_slot: compact_slots(&rows, self.id_space()),
            col_slot: compact_slots(&cols, self.id_space()),
            rows,
            cols,
            data,
        })
    }

    /// Replaces every active cell with `f(value, row, col)`.
    pub fn transform<F>(&mut self, mut f: F)
    where
        F: FnMut(f64, usize, usize) -> f64,
    {
        let width = self.cols.len();
        for (i, &r) in self.rows.iter().enumerate() {
            let row = &mut self.data[i * width..(i + 1) * width];
            for (cell, &c) in row.iter_mut().zip(&self.cols) {
                *cell = f(*cell, r, c);
            }
        }
    }

    /// Calls `visit(row, col)` for every cell equal to zero, rows then
    /// columns in ascending id order.
    pub fn for_each_zero<F>(&self, mut visit: F)
    where
        F: FnMut(usize, usize),
    {
        let width = self.cols.len();
        for (i, &r) in self.rows.iter().enumerate() {
            for (j, &c) in self.cols.iter().enumerate() {
                if self.data[i * width + j] == 0.0 {
                    visit(r, c);
                }
            }
        }
    }

    /// Subtracts the row minimum from every finite cell of row `r` and
    /// returns it. An empty row returns infinity and is left untouched.
    pub(crate) fn reduce_row(&mut self, r: usize) -> f64 {
        let Some(i) = self.row_index(r) else {
            return f64::INFINITY;
        };
        let width = self.cols.len();
        let row = &mut self.data[i * width..(i + 1) * width];
        let min = row.iter().copied().fold(f64::INFINITY, f64::min);
        if min.is_finite() && min > 0.0 {
            row.iter_mut()
                .filter(|v| v.is_finite())
                .for_each(|v| *v -= min);
        }
        min
    }

    /// Column counterpart of [`reduce_row`](Self::reduce_row).
    pub(crate) fn reduce_col(&mut self, c: usize) -> f64 {
        let Some(j) = self.col_index(c) else {
            return f64::INFINITY;
        };
        let width = self.cols.len();
        let min = self
            .data
            .iter()
            .skip(j)
            .step_by(width)
            .copied()
            .fold(f64::INFINITY, f64::min);
        if min.is_finite() && min > 0.0 {
            self.data
                .iter_mut()
                .skip(j)
                .step_by(width)
                .filter(|v| v.is_finite())
                .for_each(|v| *v -= min);
        }
        min
    }

    fn row_index(&self, r: usize) -> Option<usize> {
        self.row_slot.get(r).copied().flatten()
    }

    fn col_index(&self, c: usize) -> Option<usize> {
        self.col_slot.get(c).copied().flatten()
    }

    fn offset(&self, r: usize, c: usize) -> Option<usize> {
        let i = self.row_index(r)?;
        let j = self.col_index(c)?;
        Some(i * self.cols.len() + j)
    }
}

/// Rebuilds an id -> dense index table for the given ascending ids.
fn compact_slots(ids: &[usize], id_space: usize) -> Vec<Option<usize>> {
    let mut slots = vec![None; id_space];
    for (index, &id) in ids.iter().enumerate() {
        slots[id] = Some(index);
    }
    slots
}

impl fmt::Display for CostMatrix {
    /// Tab-separated table with a header of column ids, `M` for infinity.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &c in &self.cols {
            write!(f, "\t{c}")?;
        }
        for &r in &self.rows {
            write!(f, "\n{r}")?;
            for &c in &self.cols {
                let value = self.get(r, c);
                if value.is_infinite() {
                    write!(f, "\tM")?;
                } else {
                    write!(f, "\t{value:.2}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instances::random_asymmetric;
    use proptest::prelude::*;

    const INF: f64 = f64::INFINITY;

    fn three() -> CostMatrix {
        CostMatrix::from_data(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]).unwrap()
    }

    #[test]
    fn test_from_data_forces_diagonal() {
        let m = three();
        for id in 0..3 {
            assert!(m.get(id, id).is_infinite());
        }
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(2, 1), 8.0);
        assert_eq!(m.row_ids(), &[0, 1, 2]);
        assert_eq!(m.col_ids(), &[0, 1, 2]);
    }

    #[test]
    fn test_from_data_rejects_bad_tables() {
        let single: [[f64; 1]; 1] = [[0.0]];
        assert!(matches!(
            CostMatrix::from_data(&single),
            Err(TspError::InvalidInput(_))
        ));

        let ragged = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(matches!(
            CostMatrix::from_data(&ragged),
            Err(TspError::InvalidInput(_))
        ));

        let negative = [[0.0, -1.0], [1.0, 0.0]];
        assert!(CostMatrix::from_data(&negative).is_err());

        let nan = [[0.0, f64::NAN], [1.0, 0.0]];
        assert!(CostMatrix::from_data(&nan).is_err());
    }

    #[test]
    fn test_from_data_ignores_negative_diagonal() {
        let m = CostMatrix::from_data(&[[-5.0, 1.0], [1.0, f64::NAN]]).unwrap();
        assert!(m.get(0, 0).is_infinite());
        assert!(m.get(1, 1).is_infinite());
    }

    #[test]
    fn test_from_data_accepts_forbidden_edges() {
        let m = CostMatrix::from_data(&[[0.0, INF], [1.0, 0.0]]).unwrap();
        assert!(m.get(0, 1).is_infinite());
    }

    #[test]
    fn test_set_and_try_get() {
        let mut m = three();
        m.set(2, 0, 0.5);
        assert_eq!(m.get(2, 0), 0.5);
        assert_eq!(m.try_get(2, 0), Some(0.5));
        assert_eq!(m.try_get(3, 0), None);
        m.forbid(2, 0);
        assert!(m.get(2, 0).is_infinite());
    }

    #[test]
    #[should_panic(expected = "not active")]
    fn test_get_inactive_panics() {
        let m = three().remove_row_and_col(1, 1).unwrap();
        m.get(1, 0);
    }

    #[test]
    fn test_minima() {
        let m = three();
        assert_eq!(m.row_minima(), vec![2.0, 4.0, 7.0]);
        assert_eq!(m.col_minima(), vec![4.0, 2.0, 3.0]);

        let mut blocked = three();
        blocked.forbid(0, 1);
        blocked.forbid(0, 2);
        assert!(blocked.row_minima()[0].is_infinite());
    }

    #[test]
    fn test_remove_row_and_col() {
        let m = three();
        let reduced = m.remove_row_and_col(0, 2).unwrap();

        assert_eq!(reduced.size(), 2);
        assert_eq!(reduced.row_ids(), &[1, 2]);
        assert_eq!(reduced.col_ids(), &[0, 1]);
        assert_eq!(reduced.get(1, 0), 4.0);
        assert!(reduced.get(1, 1).is_infinite());
        assert_eq!(reduced.get(2, 0), 7.0);
        assert_eq!(reduced.get(2, 1), 8.0);
        assert!(!reduced.has_row(0));
        assert!(!reduced.has_col(2));

        // source untouched
        assert_eq!(m.size(), 3);
        assert_eq!(m.get(0, 2), 3.0);
    }

    #[test]
    fn test_remove_inactive_fails() {
        let m = three().remove_row_and_col(0, 0).unwrap();
        assert_eq!(
            m.remove_row_and_col(0, 1),
            Err(TspError::InactiveCity { row: 0, col: 1 })
        );
        assert!(m.remove_row_and_col(1, 7).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let m = three();
        let mut copy = m.clone();
        copy.set(0, 1, 42.0);
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(copy.get(0, 1), 42.0);
    }

    #[test]
    fn test_penalty() {
        let mut m = CostMatrix::from_data(&[
            [0.0, 0.0, 3.0],
            [2.0, 0.0, 0.0],
            [0.0, 4.0, 0.0],
        ])
        .unwrap();
        // into 1: min(row 2) = 4; out of 0: col 2 = 3
        assert_eq!(m.penalty(0, 1), 7.0);

        m.forbid(0, 2);
        assert!(m.penalty(0, 1).is_infinite());
    }

    #[test]
    fn test_transform_visits_ids() {
        let mut m = three().remove_row_and_col(1, 0).unwrap();
        m.transform(|v, r, c| if v.is_finite() { (r * 10 + c) as f64 } else { v });
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(2, 1), 21.0);
        assert!(m.get(2, 2).is_infinite());
    }

    #[test]
    fn test_for_each_zero_order() {
        let m = CostMatrix::from_data(&[
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
        ])
        .unwrap();
        let mut seen = Vec::new();
        m.for_each_zero(|r, c| seen.push((r, c)));
        assert_eq!(seen, vec![(0, 1), (0, 2), (1, 0), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_reduce_row_and_col() {
        let mut m = three();
        assert_eq!(m.reduce_row(2), 7.0);
        assert_eq!(m.get(2, 0), 0.0);
        assert_eq!(m.get(2, 1), 1.0);
        assert!(m.get(2, 2).is_infinite());

        assert_eq!(m.reduce_col(1), 1.0);
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(2, 1), 0.0);
    }

    #[test]
    fn test_display() {
        let m = CostMatrix::from_data(&[[0.0, 1.5], [2.0, 0.0]]).unwrap();
        assert_eq!(m.to_string(), "\t0\t1\n0\tM\t1.50\n1\t2.00\tM");
    }

    proptest! {
        #[test]
        fn prop_removal_preserves_ids(
            n in 2usize..9,
            r_pick in 0usize..9,
            c_pick in 0usize..9,
            seed in any::<u64>(),
        ) {
            let m = CostMatrix::from_data(&random_asymmetric(n, 50, seed)).unwrap();
            let r = r_pick % n;
            let c = c_pick % n;
            let reduced = m.remove_row_and_col(r, c).unwrap();

            let expected_rows: Vec<usize> = (0..n).filter(|&id| id != r).collect();
            let expected_cols: Vec<usize> = (0..n).filter(|&id| id != c).collect();
            prop_assert_eq!(reduced.size(), n - 1);
            prop_assert_eq!(reduced.row_ids(), expected_rows.as_slice());
            prop_assert_eq!(reduced.col_ids(), expected_cols.as_slice());
            if r == c {
                prop_assert_eq!(reduced.row_ids(), reduced.col_ids());
            }

            for &row in reduced.row_ids() {
                for &col in reduced.col_ids() {
                    prop_assert_eq!(reduced.get(row, col).to_bits(), m.get(row, col).to_bits());
                }
            }
        }
    }
}
