//! Sparse matrix representation and the linear-solve interface.
//!
//! The stiffness matrix is symmetric and only its upper triangle is
//! stored. [`SymmetricCsr`] is a borrowed view over such upper-triangular
//! CSR arrays; both linear back ends consume it through [`LinearSolve`].

use lpm_types::LpmResult;

/// Borrowed view over the upper triangle of a symmetric CSR matrix.
#[derive(Debug, Clone, Copy)]
pub struct SymmetricCsr<'a> {
    /// Matrix dimension (N×N).
    pub dim: usize,
    pub row_ptr: &'a [usize],
    pub col_idx: &'a [usize],
    pub values: &'a [f64],
}

impl<'a> SymmetricCsr<'a> {
    pub fn new(dim: usize, row_ptr: &'a [usize], col_idx: &'a [usize], values: &'a [f64]) -> Self {
        debug_assert_eq!(row_ptr.len(), dim + 1);
        debug_assert_eq!(col_idx.len(), values.len());
        Self {
            dim,
            row_ptr,
            col_idx,
            values,
        }
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// `y = A x` using both the stored upper entries and their mirror.
    pub fn mul_vec(&self, x: &[f64], y: &mut [f64]) {
        y.fill(0.0);
        for row in 0..self.dim {
            let xr = x[row];
            let mut acc = 0.0;
            for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
                let col = self.col_idx[idx];
                let v = self.values[idx];
                acc += v * x[col];
                if col != row {
                    y[col] += v * xr;
                }
            }
            y[row] += acc;
        }
    }

    /// Entry `(row, col)` of the full symmetric matrix.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (r, c) = if row <= col { (row, col) } else { (col, row) };
        let range = self.row_ptr[r]..self.row_ptr[r + 1];
        match self.col_idx[range.clone()].binary_search(&c) {
            Ok(pos) => self.values[range.start + pos],
            Err(_) => 0.0,
        }
    }

    /// Diagonal entries.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.dim).map(|i| self.get(i, i)).collect()
    }

    /// Expands to a dense row-major matrix. Intended for tests and debugging.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.dim]; self.dim];
        for row in 0..self.dim {
            for idx in self.row_ptr[row]..self.row_ptr[row + 1] {
                let col = self.col_idx[idx];
                dense[row][col] = self.values[idx];
                dense[col][row] = self.values[idx];
            }
        }
        dense
    }
}

/// Outcome of a successful linear solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Iterations used (1 for the direct back end).
    pub iterations: usize,
    /// Euclidean norm of `b − A x` at exit.
    pub residual: f64,
    /// False if an iterative back end stopped at its cap.
    pub converged: bool,
}

/// A symmetric positive-definite linear solve `A x = b`.
///
/// Implementations: [`crate::DirectSolver`] (faer sparse Cholesky) and
/// [`crate::ConjugateGradient`]. A failure is reported as
/// `LpmError::LinearSolver` with the back end's status code.
pub trait LinearSolve: Send {
    /// Short back-end name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Solves `matrix · solution = rhs`. `solution` is overwritten.
    fn solve(
        &mut self,
        matrix: SymmetricCsr<'_>,
        rhs: &[f64],
        solution: &mut [f64],
    ) -> LpmResult<SolveReport>;
}

/// Euclidean norm of `b − A x`.
pub(crate) fn residual_norm(matrix: &SymmetricCsr<'_>, rhs: &[f64], x: &[f64]) -> f64 {
    let mut ax = vec![0.0; matrix.dim];
    matrix.mul_vec(x, &mut ax);
    ax.iter()
        .zip(rhs)
        .map(|(a, b)| (b - a) * (b - a))
        .sum::<f64>()
        .sqrt()
}
