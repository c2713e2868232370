//! # lpm-math
//!
//! Linear algebra for the LPM solver.
//!
//! Provides:
//! - Re-exports of the double-precision `glam` types (`DVec3`, `DMat3`)
//! - Small 3×3 block helpers (outer products, projectors)
//! - The per-particle block sparsity pattern and the symmetric
//!   upper-triangular CSR storage built on it
//! - The [`LinearSolve`] capability with a direct sparse Cholesky
//!   back end (faer) and a conjugate-gradient back end

pub mod block;
pub mod cg;
pub mod faer_solver;
pub mod pattern;
pub mod sparse;

pub use cg::{CgConfig, ConjugateGradient};
pub use faer_solver::DirectSolver;
pub use pattern::{BlockPattern, SymmetricBlockMatrix};
pub use sparse::{LinearSolve, SolveReport, SymmetricCsr};

// Re-export glam types as the canonical math types for LPM.
pub use glam::{DMat3, DVec3};
