//! Direct sparse Cholesky back end backed by `faer`.
//!
//! ## Workflow
//! 1. `factorize(matrix)`: upper CSR → CSC, symbolic + numeric LLᵀ
//! 2. `solve_factored(rhs, solution)`: forward/backward substitution
//! 3. `release()`: drop the factor
//!
//! The tangent changes every Newton iteration, so [`LinearSolve::solve`]
//! runs all three steps and never keeps a factor between calls.

use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use lpm_types::{LpmError, LpmResult};

use crate::sparse::{LinearSolve, SolveReport, SymmetricCsr, residual_norm};

/// Status: the CSC matrix or its symbolic structure could not be built.
pub const STATUS_SYMBOLIC: i32 = 1;
/// Status: numeric factorization failed (matrix not positive definite).
pub const STATUS_NUMERIC: i32 = 2;
/// Status: solve called without a factor or with mismatched lengths.
pub const STATUS_SOLVE: i32 = 3;

const NAME: &str = "direct";

/// Sparse Cholesky (LLᵀ) solver using `faer`.
pub struct DirectSolver {
    factorization: Option<Llt<usize, f64>>,
    /// Matrix dimension (N×N).
    dimension: usize,
}

impl DirectSolver {
    /// Creates a new solver (unfactorized).
    pub fn new() -> Self {
        Self {
            factorization: None,
            dimension: 0,
        }
    }

    fn error(status: i32, message: String) -> LpmError {
        LpmError::LinearSolver {
            solver: NAME.into(),
            status,
            message,
        }
    }

    /// Builds faer's CSC matrix from the stored upper triangle.
    fn upper_to_csc(matrix: &SymmetricCsr<'_>) -> LpmResult<SparseColMat<usize, f64>> {
        let mut triplets: Vec<Triplet<usize, usize, f64>> = Vec::with_capacity(matrix.nnz());
        for row in 0..matrix.dim {
            for idx in matrix.row_ptr[row]..matrix.row_ptr[row + 1] {
                let col = matrix.col_idx[idx];
                let val = matrix.values[idx];
                triplets.push(Triplet { row, col, val });
            }
        }

        SparseColMat::try_new_from_triplets(matrix.dim, matrix.dim, &triplets)
            .map_err(|e| Self::error(STATUS_SYMBOLIC, format!("failed to build CSC matrix: {e:?}")))
    }

    /// Symbolic analysis followed by numeric factorization.
    pub fn factorize(&mut self, matrix: SymmetricCsr<'_>) -> LpmResult<()> {
        if matrix.dim == 0 {
            return Err(Self::error(STATUS_SYMBOLIC, "cannot factorize an empty matrix".into()));
        }
        self.factorization = None;
        self.dimension = matrix.dim;

        let csc = Self::upper_to_csc(&matrix)?;

        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| Self::error(STATUS_SYMBOLIC, format!("symbolic analysis failed: {e:?}")))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper)
            .map_err(|e| Self::error(STATUS_NUMERIC, format!("Cholesky factorization failed: {e:?}")))?;

        self.factorization = Some(llt);
        Ok(())
    }

    /// Solves with the cached factor.
    pub fn solve_factored(&self, rhs: &[f64], solution: &mut [f64]) -> LpmResult<()> {
        let llt = self
            .factorization
            .as_ref()
            .ok_or_else(|| Self::error(STATUS_SOLVE, "solver not factorized".into()))?;

        if rhs.len() != self.dimension || solution.len() != self.dimension {
            return Err(Self::error(
                STATUS_SOLVE,
                format!(
                    "rhs/solution lengths ({}, {}) != matrix dimension ({})",
                    rhs.len(),
                    solution.len(),
                    self.dimension
                ),
            ));
        }

        let rhs_mat: faer::Mat<f64> = faer::Mat::from_fn(self.dimension, 1, |i, _| rhs[i]);
        let sol = llt.solve(&rhs_mat);

        for (i, x) in solution.iter_mut().enumerate() {
            *x = sol[(i, 0)];
        }
        Ok(())
    }

    /// Drops the cached factor.
    pub fn release(&mut self) {
        self.factorization = None;
    }

    pub fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }
}

impl Default for DirectSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSolve for DirectSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve(
        &mut self,
        matrix: SymmetricCsr<'_>,
        rhs: &[f64],
        solution: &mut [f64],
    ) -> LpmResult<SolveReport> {
        self.factorize(matrix)?;
        let result = self.solve_factored(rhs, solution);
        self.release();
        result?;

        Ok(SolveReport {
            iterations: 1,
            residual: residual_norm(&matrix, rhs, solution),
            converged: true,
        })
    }
}
