//! Closed-form tangent of the internal force.
//!
//! With `w = 1 − D`, bond force `f = w (Kn dLe + Tv Σ_L dLe)` and
//! `P = I − cs ⊗ cs`, the derivative `K(a, b) = ∂Pin_a/∂x_b` collects
//! three kinds of contributions:
//!
//! - `a == b`: every bond of `a` and every bond pointing at `a`;
//! - `b` bonded to `a`: the bond pair `a ↔ b` and the volumetric coupling
//!   of `a`'s layer containing `b`;
//! - `b` sharing a same-layer neighbor `i` with `a`: the volumetric
//!   coupling carried by `i`'s bonds to both.
//!
//! Damage is held fixed while differentiating.

use lpm_math::block::{outer, projector};
use lpm_math::{DMat3, DVec3, SymmetricBlockMatrix};
use lpm_types::ParticleId;
use lpm_types::constants::MAX_LAYERS;
use rayon::prelude::*;

use super::{symmetrized, write_block};
use crate::assembly::Assembly;
use crate::bond::Bond;
use crate::particle::Particle;

#[inline]
fn intact(bond: &Bond) -> f64 {
    1.0 - bond.damage
}

/// Geometric stiffness `f P / d` of one bond.
#[inline]
fn geometric(bond: &Bond) -> DMat3 {
    projector(bond.cs) * (bond.bforce / bond.dis)
}

/// Per-layer sum of the direction cosines of `p`'s bonds.
fn layer_cosines(p: &Particle) -> [DVec3; MAX_LAYERS] {
    let mut sums = [DVec3::ZERO; MAX_LAYERS];
    for (layer, sum) in sums.iter_mut().enumerate() {
        *sum = p.bond_layer(layer).iter().map(|b| b.cs).sum();
    }
    sums
}

/// Per-layer sum of `w Tv cs` over `p`'s bonds.
fn layer_coupling(p: &Particle, layer: usize) -> DVec3 {
    p.bond_layer(layer)
        .iter()
        .map(|b| intact(b) * b.tv * b.cs)
        .sum()
}

fn self_block(assembly: &Assembly, a: ParticleId) -> DMat3 {
    let pa = assembly.particle(a);
    let sums = layer_cosines(pa);
    let mut k = DMat3::ZERO;

    for bond in pa.bonds() {
        let grad = bond.kn * bond.cs + bond.tv * sums[bond.layer];
        k += (outer(bond.cs, grad) * intact(bond) + geometric(bond)) * 0.5;
    }
    for &j in pa.neighbors() {
        if let Some(rev) = assembly.particle(j).bond_to(a) {
            let axial = outer(rev.cs, rev.cs) * (intact(rev) * (rev.kn + rev.tv));
            k += (axial + geometric(rev)) * 0.5;
        }
    }
    k
}

fn cross_block(assembly: &Assembly, a: ParticleId, b: ParticleId) -> DMat3 {
    let pa = assembly.particle(a);
    let pb = assembly.particle(b);
    let mut k = DMat3::ZERO;

    if let Some(ab) = pa.bond_to(b) {
        let axial = outer(ab.cs, ab.cs) * (intact(ab) * ab.kn);
        let coupling = outer(layer_coupling(pa, ab.layer), ab.cs);
        k -= (axial + geometric(ab) + coupling) * 0.5;
    }

    if let Some(ba) = pb.bond_to(a) {
        let sum: DVec3 = pb.bond_layer(ba.layer).iter().map(|bk| bk.cs).sum();
        let grad = ba.kn * ba.cs + ba.tv * sum;
        k -= (outer(ba.cs, grad) * intact(ba) + geometric(ba)) * 0.5;
    }

    for layer in 0..assembly.cell().nlayer() {
        if !pa.has_common_neighbor_of_layer(pb, layer) {
            continue;
        }
        for i in pa.common_neighbors_of_layer(pb, layer) {
            let pi = assembly.particle(i);
            if let (Some(ia), Some(ib)) = (pi.bond_to(a), pi.bond_to(b)) {
                if ia.layer == ib.layer {
                    k += outer(ia.cs, ib.cs) * (0.5 * intact(ia) * ia.tv);
                }
            }
        }
    }
    k
}

/// `K(a, b) = ∂Pin_a/∂x_b` at the current configuration.
pub fn local_block(assembly: &Assembly, a: ParticleId, b: ParticleId) -> DMat3 {
    if a == b {
        self_block(assembly, a)
    } else {
        cross_block(assembly, a, b)
    }
}

/// Fills every block row in parallel. Rows are disjoint slices of the
/// value array and the assembly is only read.
pub(crate) fn fill(matrix: &mut SymmetricBlockMatrix, assembly: &Assembly) {
    let (pattern, rows) = matrix.row_blocks_mut();
    rows.into_par_iter().for_each(|(row_block, row)| {
        let a = ParticleId::from(row_block);
        for (m, &col_block) in pattern.upper(row_block).iter().enumerate() {
            let block = if m == 0 {
                local_block(assembly, a, a)
            } else {
                let b = ParticleId::from(col_block);
                symmetrized(local_block(assembly, a, b), local_block(assembly, b, a))
            };
            write_block(pattern, row_block, m, &block, row);
        }
    });
}
