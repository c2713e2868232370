//! Tangent stiffness of the assembly in packed symmetric block form.
//!
//! The global matrix `K = ∂Pin/∂x` is stored as its upper triangle over
//! the per-particle block pattern of [`lpm_math::BlockPattern`]: block row
//! `a` spans every connected particle `b ≥ a`. Values are computed either
//! from the closed-form bond-force derivative or by forward differences
//! of the internal force, then row and column modified for displacement
//! constraints.
//!
//! ## Workflow
//! 1. [`Stiffness::new`]: reserve the pattern from the assembly's connections
//! 2. [`Stiffness::fill`]: compute the values at the current configuration
//! 3. [`Stiffness::apply_displacement_bc`]: enforce constrained dofs
//! 4. [`Stiffness::matrix`]: hand the arrays to a linear solver

pub mod analytical;
pub mod boundary;
pub mod finite_difference;

use std::time::Instant;

use lpm_math::block::entry;
use lpm_math::{BlockPattern, DMat3, SymmetricBlockMatrix};
use lpm_types::{LpmError, LpmResult};

use crate::assembly::Assembly;
use crate::config::StiffnessMode;

/// Sparse tangent stiffness and the Newton residual it is solved against.
#[derive(Debug, Clone)]
pub struct Stiffness {
    mode: StiffnessMode,
    /// Finite-difference step as a fraction of particle radius.
    fd_epsilon: f64,
    dim: usize,
    matrix: SymmetricBlockMatrix,
    residual: Vec<f64>,
}

impl Stiffness {
    /// Reserves the sparsity pattern of `assembly`.
    ///
    /// The pattern is fixed for the run: broken bonds leave zero entries
    /// in place rather than shrinking it.
    pub fn new(assembly: &Assembly, mode: StiffnessMode, fd_epsilon: f64) -> LpmResult<Self> {
        let dim = assembly.dim();
        if mode == StiffnessMode::Analytical && dim != 3 {
            return Err(LpmError::Unsupported(format!(
                "analytical stiffness is only available in 3D (lattice dimension {dim})"
            )));
        }
        if !(fd_epsilon > 0.0 && fd_epsilon.is_finite()) {
            return Err(LpmError::InvalidConfig(format!(
                "fd_epsilon must be positive, got {fd_epsilon}"
            )));
        }

        let upper: Vec<Vec<usize>> = assembly
            .particles()
            .iter()
            .map(|p| {
                p.conns()
                    .iter()
                    .filter(|&&j| j >= p.id)
                    .map(|j| j.index())
                    .collect()
            })
            .collect();
        let pattern = BlockPattern::new(dim, upper)?;
        let residual = vec![0.0; pattern.dofs()];

        tracing::debug!(
            dofs = pattern.dofs(),
            nnz = pattern.nnz(),
            ?mode,
            "stiffness pattern reserved"
        );

        Ok(Self {
            mode,
            fd_epsilon,
            dim,
            matrix: SymmetricBlockMatrix::new(pattern),
            residual,
        })
    }

    pub fn mode(&self) -> StiffnessMode {
        self.mode
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Block-row start offsets into the value array, plus the total.
    pub fn k_pointer(&self) -> &[usize] {
        self.matrix.pattern().block_ptr()
    }

    pub fn matrix(&self) -> &SymmetricBlockMatrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut SymmetricBlockMatrix {
        &mut self.matrix
    }

    pub fn residual(&self) -> &[f64] {
        &self.residual
    }

    pub fn residual_mut(&mut self) -> &mut [f64] {
        &mut self.residual
    }

    /// Recomputes every value at the current configuration.
    ///
    /// The finite-difference path perturbs and restores particle state;
    /// it commits the assembly first so that the restore is exact.
    pub fn fill(&mut self, assembly: &mut Assembly) -> LpmResult<()> {
        if assembly.dofs() != self.matrix.pattern().dofs() {
            return Err(LpmError::InvalidTopology(format!(
                "stiffness was reserved for {} dofs, assembly has {}",
                self.matrix.pattern().dofs(),
                assembly.dofs()
            )));
        }
        let start = Instant::now();
        self.matrix.clear();
        match self.mode {
            StiffnessMode::Analytical => analytical::fill(&mut self.matrix, assembly),
            StiffnessMode::FiniteDifference => {
                let step = self.fd_epsilon * assembly.cell().radius;
                finite_difference::fill(&mut self.matrix, assembly, step);
            }
        }
        tracing::debug!(
            mode = ?self.mode,
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "stiffness filled"
        );
        Ok(())
    }

    /// Row/column modification for every constrained dof; see [`boundary::apply`].
    pub fn apply_displacement_bc(&mut self, assembly: &Assembly) {
        boundary::apply(&mut self.matrix, &mut self.residual, assembly);
    }

    /// [`fill`](Self::fill) followed by [`apply_displacement_bc`](Self::apply_displacement_bc).
    pub fn assemble(&mut self, assembly: &mut Assembly) -> LpmResult<()> {
        self.fill(assembly)?;
        self.apply_displacement_bc(assembly);
        Ok(())
    }

    /// Dense expansion of the full symmetric matrix.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        self.matrix.to_dense()
    }
}

/// Writes the stored part of one block into a block-row slice.
///
/// `m == 0` is the diagonal block, of which only `s ≥ r` is kept.
pub(crate) fn write_block(
    pattern: &BlockPattern,
    row_block: usize,
    m: usize,
    block: &DMat3,
    row: &mut [f64],
) {
    let d = pattern.block_dim();
    for r in 0..d {
        let s_start = if m == 0 { r } else { 0 };
        for s in s_start..d {
            row[pattern.local_entry(row_block, m, r, s)] = entry(block, r, s);
        }
    }
}

/// Value stored for the pair `(a, b)` given both directional blocks.
#[inline]
pub(crate) fn symmetrized(k_ab: DMat3, k_ba: DMat3) -> DMat3 {
    (k_ab + k_ba.transpose()) * 0.5
}
