//! Particle: a lattice site owning its bonds.
//!
//! Bonds are partitioned by neighbor layer and, within a layer, sorted
//! by neighbor id. Bond iteration order (layer 0 first, then layer 1) is
//! the order in which [`Particle::update_geometry`] expects neighbor
//! positions.

use std::sync::Arc;

use lpm_lattice::UnitCell;
use lpm_material::{BondForceModel, MaterialState};
use lpm_math::DVec3;
use lpm_types::ParticleId;
use lpm_types::constants::MAX_LAYERS;

use crate::bond::Bond;

#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    pub xyz: DVec3,
    pub xyz_last: DVec3,
    pub xyz_initial: DVec3,
    /// External nodal force.
    pub pex: DVec3,
    /// Internal nodal force.
    pub pin: DVec3,
    pub pin_last: DVec3,
    pub disp_constraint: [bool; 3],
    /// All dofs held fixed regardless of `disp_constraint`.
    pub frozen: bool,
    pub state: MaterialState,
    bond_layers: Vec<Vec<Bond>>,
    dle_total: [f64; MAX_LAYERS],
    dle_total_last: [f64; MAX_LAYERS],
    /// Bonded particles, ascending.
    neighbors: Vec<ParticleId>,
    /// Closed two-hop neighborhood (self included), ascending.
    conns: Vec<ParticleId>,
    nconn_largeq: usize,
    model: Arc<dyn BondForceModel>,
}

impl Particle {
    pub fn new(id: ParticleId, xyz: DVec3, model: Arc<dyn BondForceModel>) -> Self {
        Self {
            id,
            xyz,
            xyz_last: xyz,
            xyz_initial: xyz,
            pex: DVec3::ZERO,
            pin: DVec3::ZERO,
            pin_last: DVec3::ZERO,
            disp_constraint: [false; 3],
            frozen: false,
            state: model.initial_state(),
            bond_layers: vec![Vec::new(); MAX_LAYERS],
            dle_total: [0.0; MAX_LAYERS],
            dle_total_last: [0.0; MAX_LAYERS],
            neighbors: Vec::new(),
            conns: vec![id],
            nconn_largeq: 1,
            model,
        }
    }

    /// Installs the bond lists (one per layer) and derives the neighbor list.
    pub(crate) fn set_bonds(&mut self, mut bond_layers: Vec<Vec<Bond>>) {
        bond_layers.resize_with(MAX_LAYERS, Vec::new);
        for layer in &mut bond_layers {
            layer.sort_by_key(|b| b.neighbor);
        }
        let mut neighbors: Vec<ParticleId> =
            bond_layers.iter().flatten().map(|b| b.neighbor).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        self.bond_layers = bond_layers;
        self.neighbors = neighbors;
    }

    pub(crate) fn set_conns(&mut self, conns: Vec<ParticleId>) {
        self.nconn_largeq = conns.iter().filter(|&&j| j >= self.id).count();
        self.conns = conns;
    }

    /// Switches the material model; bond coefficients and state are reset.
    pub fn set_model(&mut self, model: Arc<dyn BondForceModel>, cell: &UnitCell) {
        let k = model.coefficients(cell);
        for bond in self.bond_layers.iter_mut().flatten() {
            bond.kn = k.kn[bond.layer];
            bond.tv = k.tv;
        }
        self.state = model.initial_state();
        self.model = model;
    }

    pub fn model(&self) -> &dyn BondForceModel {
        self.model.as_ref()
    }

    pub fn bonds(&self) -> impl Iterator<Item = &Bond> {
        self.bond_layers.iter().flatten()
    }

    pub fn bond_layer(&self, layer: usize) -> &[Bond] {
        &self.bond_layers[layer]
    }

    pub fn bond_layers_mut(&mut self) -> &mut [Vec<Bond>] {
        &mut self.bond_layers
    }

    /// Bond from this particle to `neighbor`, if any.
    pub fn bond_to(&self, neighbor: ParticleId) -> Option<&Bond> {
        self.bond_layers.iter().find_map(|layer| {
            layer
                .binary_search_by_key(&neighbor, |b| b.neighbor)
                .ok()
                .map(|pos| &layer[pos])
        })
    }

    /// Number of bonds.
    pub fn nb(&self) -> usize {
        self.bond_layers.iter().map(Vec::len).sum()
    }

    pub fn neighbors(&self) -> &[ParticleId] {
        &self.neighbors
    }

    pub fn conns(&self) -> &[ParticleId] {
        &self.conns
    }

    pub fn nconn(&self) -> usize {
        self.conns.len()
    }

    pub fn nconn_largeq(&self) -> usize {
        self.nconn_largeq
    }

    /// Sum of elastic length changes over the bonds of `layer`.
    pub fn dle_total(&self, layer: usize) -> f64 {
        self.dle_total[layer]
    }

    #[inline]
    pub fn is_dof_constrained(&self, axis: usize) -> bool {
        self.frozen || self.disp_constraint[axis]
    }

    /// Refreshes every bond from the neighbor positions, given in bond order.
    pub fn update_geometry(&mut self, neighbor_xyz: &[DVec3]) {
        debug_assert_eq!(neighbor_xyz.len(), self.nb());
        let mut idx = 0;
        for (layer, bonds) in self.bond_layers.iter_mut().enumerate() {
            let mut total = 0.0;
            for bond in bonds.iter_mut() {
                bond.update_geometry(self.xyz, neighbor_xyz[idx]);
                total += bond.dle;
                idx += 1;
            }
            self.dle_total[layer] = total;
        }
    }

    /// Recomputes every bond force from the current geometry.
    pub fn update_bond_forces(&mut self) {
        for (layer, bonds) in self.bond_layers.iter_mut().enumerate() {
            let total = self.dle_total[layer];
            for bond in bonds.iter_mut() {
                bond.bforce = self.model.bond_force(&bond.strain_state(total));
            }
        }
    }

    /// Applies the model's damage rule; returns the number of newly broken bonds.
    pub fn update_damage(&mut self) -> usize {
        let mut newly_broken = 0;
        for (layer, bonds) in self.bond_layers.iter_mut().enumerate() {
            let total = self.dle_total[layer];
            for bond in bonds.iter_mut().filter(|b| !b.is_broken()) {
                let damage = self.model.bond_damage(&bond.strain_state(total), &self.state);
                bond.damage = damage.max(bond.damage).min(1.0);
                if bond.is_broken() {
                    newly_broken += 1;
                }
            }
        }
        if newly_broken > 0 {
            self.model.record_damage(&mut self.state, newly_broken);
        }
        newly_broken
    }

    /// Translates the particle. Bond geometry is refreshed lazily.
    pub fn move_by(&mut self, delta: DVec3) {
        self.xyz += delta;
    }

    pub fn move_to(&mut self, xyz: DVec3) {
        self.xyz = xyz;
    }

    /// Saves position, internal force and bond state.
    pub fn commit(&mut self) {
        self.xyz_last = self.xyz;
        self.pin_last = self.pin;
        self.dle_total_last = self.dle_total;
        for bond in self.bond_layers.iter_mut().flatten() {
            bond.commit();
        }
    }

    /// Restores the state saved by the last [`commit`](Self::commit).
    pub fn resume(&mut self) {
        self.xyz = self.xyz_last;
        self.pin = self.pin_last;
        self.dle_total = self.dle_total_last;
        for bond in self.bond_layers.iter_mut().flatten() {
            bond.resume();
        }
    }

    /// Particles that are layer-`layer` neighbors of both `self` and `other`.
    pub fn common_neighbors_of_layer(&self, other: &Particle, layer: usize) -> Vec<ParticleId> {
        let a = &self.bond_layers[layer];
        let b = &other.bond_layers[layer];
        let (mut i, mut j) = (0, 0);
        let mut common = Vec::new();
        while i < a.len() && j < b.len() {
            match a[i].neighbor.cmp(&b[j].neighbor) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    common.push(a[i].neighbor);
                    i += 1;
                    j += 1;
                }
            }
        }
        common
    }

    /// Whether some particle is a layer-`layer` neighbor of both. Does not allocate.
    pub fn has_common_neighbor_of_layer(&self, other: &Particle, layer: usize) -> bool {
        let a = &self.bond_layers[layer];
        let b = &other.bond_layers[layer];
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].neighbor.cmp(&b[j].neighbor) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }

    /// Particle stress in Voigt order `[xx, yy, zz, yz, xz, xy]`.
    ///
    /// Each bond contributes `0.5/V · dis · f · cs ⊗ cs`, scaled by the
    /// ratio of the cell's full neighbor count to this particle's bond count.
    pub fn stress(&self, cell: &UnitCell) -> [f64; 6] {
        let nb = self.nb();
        if nb == 0 {
            return [0.0; 6];
        }
        let weight = 0.5 / cell.particle_volume * cell.nneighbors as f64 / nb as f64;
        let mut s = [0.0; 6];
        for bond in self.bonds() {
            let c = bond.cs;
            let scale = weight * bond.dis * bond.bforce;
            s[0] += scale * c.x * c.x;
            s[1] += scale * c.y * c.y;
            s[2] += scale * c.z * c.z;
            s[3] += scale * c.y * c.z;
            s[4] += scale * c.x * c.z;
            s[5] += scale * c.x * c.y;
        }
        s
    }
}

/// Von Mises equivalent of a Voigt stress.
pub fn von_mises(s: &[f64; 6]) -> f64 {
    let normal = (s[0] - s[1]).powi(2) + (s[1] - s[2]).powi(2) + (s[2] - s[0]).powi(2);
    let shear = s[3] * s[3] + s[4] * s[4] + s[5] * s[5];
    (0.5 * normal + 3.0 * shear).sqrt()
}
