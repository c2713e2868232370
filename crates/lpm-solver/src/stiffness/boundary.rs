//! Displacement-constraint modification of the stiffness matrix.
//!
//! For every constrained dof the matching row and column of the full
//! symmetric matrix are zeroed, the diagonal entry is replaced by the
//! Euclidean norm of the unmodified diagonal and the residual entry is
//! zeroed. The Newton increment of a constrained dof is therefore zero.
//! A vanishing diagonal norm is replaced by one.

use lpm_math::SymmetricBlockMatrix;

use crate::assembly::Assembly;

pub fn apply(matrix: &mut SymmetricBlockMatrix, residual: &mut [f64], assembly: &Assembly) {
    let d = matrix.pattern().block_dim();
    let mut norm = matrix.diagonal().iter().map(|v| v * v).sum::<f64>().sqrt();
    if !(norm > 0.0 && norm.is_finite()) {
        // Fully broken or empty assembly.
        norm = 1.0;
    }
    let mut constrained = 0usize;

    for p in assembly.particles() {
        let a = p.id.index();
        for k in 0..d {
            if !p.is_dof_constrained(k) {
                continue;
            }
            constrained += 1;

            // Row k of a's block row: diagonal block then higher neighbors.
            let nq = matrix.pattern().upper(a).len();
            for s in (k + 1)..d {
                matrix.set(a, 0, k, s, 0.0);
            }
            for m in 1..nq {
                for s in 0..d {
                    matrix.set(a, m, k, s, 0.0);
                }
            }
            // Column k above the diagonal, inside a's diagonal block.
            for r in 0..k {
                matrix.set(a, 0, r, k, 0.0);
            }
            // Column k in the block rows of lower connected particles.
            for &j in p.conns().iter().filter(|&&j| j.index() < a) {
                let offset = matrix.pattern().local_offset(j.index(), a);
                debug_assert!(offset.is_some(), "{a} missing from block row of {j}");
                if let Some(m) = offset {
                    for r in 0..d {
                        matrix.set(j.index(), m, r, k, 0.0);
                    }
                }
            }

            matrix.set(a, 0, k, k, norm);
            residual[p.id.dof(d, k)] = 0.0;
        }
    }

    tracing::trace!(constrained, diagonal_norm = norm, "displacement constraints applied");
}
