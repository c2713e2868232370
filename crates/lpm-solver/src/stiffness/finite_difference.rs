//! Forward-difference tangent of the internal force.
//!
//! Column `s` of `K(a, b)` is `(Pin_a(x + h e_bs) − Pin_a(x)) / h`. Only
//! the particles whose bonds see both `a` and `b` are refreshed for the
//! perturbed evaluation; their committed state is restored afterwards,
//! so the assembly must be committed at the configuration being
//! differentiated.

use lpm_math::{DMat3, DVec3, SymmetricBlockMatrix};
use lpm_types::ParticleId;

use super::{symmetrized, write_block};
use crate::assembly::Assembly;

/// `K(a, b)` by forward differences with step `step`.
///
/// Leaves the assembly in its committed state.
pub fn local_block(assembly: &mut Assembly, a: ParticleId, b: ParticleId, step: f64) -> DMat3 {
    let dim = assembly.dim();
    let affected = assembly.shared_closed_neighborhood(a, b);
    let base = assembly.internal_force(a);
    let x0 = assembly.particle(b).xyz;

    let mut cols = [DVec3::ZERO; 3];
    for (s, col) in cols.iter_mut().enumerate().take(dim) {
        assembly.particle_mut(b).move_to(x0 + DVec3::AXES[s] * step);
        for &m in &affected {
            assembly.update_particle(m);
        }
        *col = (assembly.internal_force(a) - base) / step;

        assembly.particle_mut(b).move_to(x0);
        for &m in &affected {
            assembly.particle_mut(m).resume();
        }
    }
    DMat3::from_cols(cols[0], cols[1], cols[2])
}

/// Fills every block row serially; each entry perturbs shared state.
pub(crate) fn fill(matrix: &mut SymmetricBlockMatrix, assembly: &mut Assembly, step: f64) {
    assembly.commit();
    let (pattern, rows) = matrix.row_blocks_mut();
    for (row_block, row) in rows {
        let a = ParticleId::from(row_block);
        for (m, &col_block) in pattern.upper(row_block).iter().enumerate() {
            let block = if m == 0 {
                local_block(assembly, a, a, step)
            } else {
                let b = ParticleId::from(col_block);
                let k_ab = local_block(assembly, a, b, step);
                let k_ba = local_block(assembly, b, a, step);
                symmetrized(k_ab, k_ba)
            };
            write_block(pattern, row_block, m, &block, row);
        }
    }
}
