//! Solver configuration.
//!
//! Parameters that select the tangent and linear-solve strategies and
//! control Newton-Raphson convergence. Loaded from the `[solver]` table
//! of a scenario file; missing fields take their defaults.

use lpm_math::{CgConfig, ConjugateGradient, DirectSolver, LinearSolve};
use lpm_types::constants::{
    DEFAULT_FD_EPSILON, DEFAULT_MAX_NEWTON_ITERATIONS, DEFAULT_NEWTON_TOLERANCE,
};
use lpm_types::{LpmError, LpmResult};
use serde::{Deserialize, Serialize};

/// How the tangent stiffness values are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StiffnessMode {
    /// Forward differences of the internal force; the reference tangent.
    FiniteDifference,
    /// Closed-form derivative of the bond forces (3D only).
    Analytical,
}

/// Linear-solve back end used inside each Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolverKind {
    /// Sparse Cholesky factorization.
    Direct,
    /// Conjugate gradient.
    ConjugateGradient,
}

impl LinearSolverKind {
    /// Instantiates the back end.
    pub fn build(self, cg: &CgConfig) -> Box<dyn LinearSolve> {
        match self {
            Self::Direct => Box::new(DirectSolver::new()),
            Self::ConjugateGradient => Box::new(ConjugateGradient::new(*cg)),
        }
    }
}

/// Configuration for the Newton-Raphson solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub stiffness_mode: StiffnessMode,

    pub linear_solver: LinearSolverKind,

    /// Newton iterations allowed per equilibrium solve.
    pub max_newton_iterations: u32,

    /// Relative tolerance on the residual norm, scaled by the larger of
    /// the initial residual and reaction norms.
    pub newton_tolerance: f64,

    /// Finite-difference step as a fraction of particle radius.
    pub fd_epsilon: f64,

    /// Re-equilibration passes after bonds break within one load step.
    pub max_broken_bond_passes: u32,

    pub cg: CgConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            stiffness_mode: StiffnessMode::Analytical,
            linear_solver: LinearSolverKind::Direct,
            max_newton_iterations: DEFAULT_MAX_NEWTON_ITERATIONS,
            newton_tolerance: DEFAULT_NEWTON_TOLERANCE,
            fd_epsilon: DEFAULT_FD_EPSILON,
            max_broken_bond_passes: 20,
            cg: CgConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Finite-difference tangent with the direct back end.
    pub fn reference() -> Self {
        Self {
            stiffness_mode: StiffnessMode::FiniteDifference,
            linear_solver: LinearSolverKind::Direct,
            ..Default::default()
        }
    }

    /// Analytical tangent with the conjugate-gradient back end.
    pub fn fast() -> Self {
        Self {
            stiffness_mode: StiffnessMode::Analytical,
            linear_solver: LinearSolverKind::ConjugateGradient,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> LpmResult<()> {
        if !(self.newton_tolerance > 0.0 && self.newton_tolerance < 1.0) {
            return Err(LpmError::InvalidConfig(format!(
                "newton_tolerance must lie in (0, 1), got {}",
                self.newton_tolerance
            )));
        }
        if !(self.fd_epsilon > 0.0 && self.fd_epsilon.is_finite()) {
            return Err(LpmError::InvalidConfig(format!(
                "fd_epsilon must be positive, got {}",
                self.fd_epsilon
            )));
        }
        if !(self.cg.relative_tolerance >= 0.0 && self.cg.absolute_tolerance >= 0.0) {
            return Err(LpmError::InvalidConfig("CG tolerances must be non-negative".into()));
        }
        if self.cg.max_iterations == 0 {
            return Err(LpmError::InvalidConfig("cg.max_iterations must be at least 1".into()));
        }
        Ok(())
    }
}
