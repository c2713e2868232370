//! Conjugate-gradient back end.
//!
//! Unpreconditioned CG over the symmetric upper-CSR operator, starting
//! from a zero initial guess. Stops when `‖r‖ ≤ rel·‖b‖ + abs` or when
//! the iteration cap is reached; the cap is not an error, but a loss of
//! positive curvature or a non-finite value is.

use lpm_types::constants::{DEFAULT_CG_MAX_ITERATIONS, DEFAULT_CG_TOLERANCE};
use lpm_types::{LpmError, LpmResult};
use serde::{Deserialize, Serialize};

use crate::sparse::{LinearSolve, SolveReport, SymmetricCsr};

/// Status: non-positive curvature or non-finite iterate.
pub const STATUS_BREAKDOWN: i32 = -2;
/// Status: rhs/solution length does not match the matrix.
pub const STATUS_DIMENSION: i32 = -3;

const NAME: &str = "cg";

/// CG stopping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CgConfig {
    pub relative_tolerance: f64,
    pub absolute_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for CgConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: DEFAULT_CG_TOLERANCE,
            absolute_tolerance: DEFAULT_CG_TOLERANCE,
            max_iterations: DEFAULT_CG_MAX_ITERATIONS,
        }
    }
}

/// Conjugate-gradient solver.
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradient {
    pub config: CgConfig,
}

impl ConjugateGradient {
    pub fn new(config: CgConfig) -> Self {
        Self { config }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn breakdown(message: String) -> LpmError {
    LpmError::LinearSolver {
        solver: NAME.into(),
        status: STATUS_BREAKDOWN,
        message,
    }
}

/// Runs CG on `matrix · x = rhs`, writing `x` into `solution`.
pub fn solve_cg(
    matrix: SymmetricCsr<'_>,
    rhs: &[f64],
    solution: &mut [f64],
    config: &CgConfig,
) -> LpmResult<SolveReport> {
    let n = matrix.dim;
    if rhs.len() != n || solution.len() != n {
        return Err(LpmError::LinearSolver {
            solver: NAME.into(),
            status: STATUS_DIMENSION,
            message: format!(
                "rhs/solution lengths ({}, {}) != matrix dimension ({n})",
                rhs.len(),
                solution.len()
            ),
        });
    }

    solution.fill(0.0);
    let mut r = rhs.to_vec();
    let mut p = r.clone();
    let mut ap = vec![0.0; n];
    let mut rr = dot(&r, &r);

    let threshold = config.relative_tolerance * rr.sqrt() + config.absolute_tolerance;
    if rr.sqrt() <= threshold {
        return Ok(SolveReport {
            iterations: 0,
            residual: rr.sqrt(),
            converged: true,
        });
    }

    for k in 1..=config.max_iterations {
        matrix.mul_vec(&p, &mut ap);
        let pap = dot(&p, &ap);
        if !pap.is_finite() || pap <= 0.0 {
            return Err(breakdown(format!(
                "curvature pᵀAp = {pap:e} at iteration {k}"
            )));
        }

        let alpha = rr / pap;
        for i in 0..n {
            solution[i] += alpha * p[i];
            r[i] -= alpha * ap[i];
        }

        let rr_new = dot(&r, &r);
        if !rr_new.is_finite() {
            return Err(breakdown(format!("non-finite residual at iteration {k}")));
        }
        if rr_new.sqrt() <= threshold {
            tracing::debug!(iterations = k, residual = rr_new.sqrt(), "CG converged");
            return Ok(SolveReport {
                iterations: k,
                residual: rr_new.sqrt(),
                converged: true,
            });
        }

        let beta = rr_new / rr;
        for i in 0..n {
            p[i] = r[i] + beta * p[i];
        }
        rr = rr_new;
    }

    tracing::warn!(
        max_iterations = config.max_iterations,
        residual = rr.sqrt(),
        "CG reached its iteration cap before converging"
    );
    Ok(SolveReport {
        iterations: config.max_iterations,
        residual: rr.sqrt(),
        converged: false,
    })
}

impl LinearSolve for ConjugateGradient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve(
        &mut self,
        matrix: SymmetricCsr<'_>,
        rhs: &[f64],
        solution: &mut [f64],
    ) -> LpmResult<SolveReport> {
        solve_cg(matrix, rhs, solution, &self.config)
    }
}
