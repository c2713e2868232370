//! Particle assembly: the arena of particles and their bonds.
//!
//! Particle ids equal arena indices and never change; the assembly is
//! not resized after construction. Bulk refreshes run data-parallel: each
//! particle writes only its own bonds while reading a snapshot of the
//! neighbor positions.

use std::sync::Arc;

use lpm_lattice::{NeighborSearch, UnitCell};
use lpm_material::BondForceModel;
use lpm_math::DVec3;
use lpm_types::constants::MAX_LAYERS;
use lpm_types::{BondId, LpmError, LpmResult, ParticleId};
use rayon::prelude::*;

use crate::bond::Bond;
use crate::particle::Particle;

#[derive(Debug, Clone)]
pub struct Assembly {
    cell: UnitCell,
    particles: Vec<Particle>,
    /// Next bond id to hand out.
    next_bond_id: u32,
}

impl Assembly {
    /// Builds the assembly from initial coordinates.
    ///
    /// Bonds are found by neighbor search within the cell's outer cutoff
    /// and assigned ascending ids. Every particle starts with `model`.
    pub fn new(
        coords: &[DVec3],
        cell: UnitCell,
        model: Arc<dyn BondForceModel>,
    ) -> LpmResult<Self> {
        if coords.is_empty() {
            return Err(LpmError::InvalidLattice("assembly has no particles".into()));
        }
        if cell.dim == 2 && coords.iter().any(|p| p.z != 0.0) {
            return Err(LpmError::InvalidLattice(
                "particles of a 2D lattice must lie in the z = 0 plane".into(),
            ));
        }

        let lists = NeighborSearch::new(cell.search_radius()).build(coords)?;

        let mut next_bond_id = 0u32;
        let mut particles = Vec::with_capacity(coords.len());
        for (i, (&xyz, list)) in coords.iter().zip(&lists).enumerate() {
            let id = ParticleId::from(i);
            let mut layers: Vec<Vec<Bond>> = vec![Vec::new(); MAX_LAYERS];
            for &j in list {
                let bond = Bond::new(
                    BondId(next_bond_id),
                    id,
                    ParticleId::from(j),
                    xyz,
                    coords[j],
                    &cell,
                );
                if let Some(bond) = bond {
                    next_bond_id += 1;
                    layers[bond.layer].push(bond);
                }
            }
            let mut particle = Particle::new(id, xyz, Arc::clone(&model));
            particle.set_bonds(layers);
            particle.set_model(Arc::clone(&model), &cell);
            particles.push(particle);
        }

        let mut assembly = Self {
            cell,
            particles,
            next_bond_id,
        };
        assembly.build_connections();
        assembly.refresh();
        assembly.commit();

        tracing::debug!(
            particles = assembly.len(),
            bonds = assembly.bond_count(),
            "assembly built"
        );
        Ok(assembly)
    }

    /// Closed two-hop neighborhoods, which define the stiffness sparsity.
    fn build_connections(&mut self) {
        let conns: Vec<Vec<ParticleId>> = self
            .particles
            .iter()
            .map(|p| {
                let mut set = vec![p.id];
                for &j in p.neighbors() {
                    set.push(j);
                    set.extend_from_slice(self.particles[j.index()].neighbors());
                }
                set.sort_unstable();
                set.dedup();
                set
            })
            .collect();
        for (p, c) in self.particles.iter_mut().zip(conns) {
            p.set_conns(c);
        }
    }

    pub fn cell(&self) -> &UnitCell {
        &self.cell
    }

    pub fn dim(&self) -> usize {
        self.cell.dim
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Total number of degrees of freedom.
    pub fn dofs(&self) -> usize {
        self.particles.len() * self.cell.dim
    }

    pub fn bond_count(&self) -> usize {
        self.next_bond_id as usize
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn particle(&self, id: ParticleId) -> &Particle {
        &self.particles[id.index()]
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> &mut Particle {
        &mut self.particles[id.index()]
    }

    pub fn positions(&self) -> Vec<DVec3> {
        self.particles.iter().map(|p| p.xyz).collect()
    }

    /// Ids of all particles matching `predicate`.
    pub fn select(&self, predicate: impl Fn(&Particle) -> bool) -> Vec<ParticleId> {
        self.particles
            .iter()
            .filter(|p| predicate(p))
            .map(|p| p.id)
            .collect()
    }

    /// Assigns `model` to one particle. Call [`refresh`](Self::refresh) afterwards.
    pub fn set_material(&mut self, id: ParticleId, model: Arc<dyn BondForceModel>) {
        let cell = &self.cell;
        self.particles[id.index()].set_model(model, cell);
    }

    /// Assigns `model` to every particle matching `predicate` and refreshes forces.
    pub fn set_material_where(
        &mut self,
        predicate: impl Fn(&Particle) -> bool,
        model: Arc<dyn BondForceModel>,
    ) -> usize {
        let cell = &self.cell;
        let mut count = 0;
        for p in self.particles.iter_mut().filter(|p| predicate(p)) {
            p.set_model(Arc::clone(&model), cell);
            count += 1;
        }
        self.update_force_state();
        count
    }

    /// Clears every displacement constraint flag (frozen flags are kept).
    pub fn clear_constraints(&mut self) {
        for p in &mut self.particles {
            p.disp_constraint = [false; 3];
        }
    }

    /// Refreshes bond geometry of every particle.
    pub fn update_geometry(&mut self) {
        let positions = self.positions();
        self.particles.par_iter_mut().for_each(|p| {
            let targets: Vec<DVec3> = p.bonds().map(|b| positions[b.neighbor.index()]).collect();
            p.update_geometry(&targets);
        });
    }

    /// Refreshes bond forces, then internal nodal forces.
    pub fn update_force_state(&mut self) {
        self.particles
            .par_iter_mut()
            .for_each(|p| p.update_bond_forces());

        let pin: Vec<DVec3> = (0..self.particles.len())
            .into_par_iter()
            .map(|i| self.internal_force(ParticleId::from(i)))
            .collect();
        for (p, f) in self.particles.iter_mut().zip(pin) {
            p.pin = f;
        }
    }

    /// Geometry followed by force state.
    pub fn refresh(&mut self) {
        self.update_geometry();
        self.update_force_state();
    }

    /// Geometry and bond forces of a single particle; internal forces untouched.
    pub fn update_particle(&mut self, id: ParticleId) {
        let targets: Vec<DVec3> = self.particles[id.index()]
            .bonds()
            .map(|b| self.particles[b.neighbor.index()].xyz)
            .collect();
        let p = &mut self.particles[id.index()];
        p.update_geometry(&targets);
        p.update_bond_forces();
    }

    /// Internal nodal force of `id` from the current bond forces.
    ///
    /// `Pin_i = ½ Σ_{i→j} f_ij cs_ij − ½ Σ_{j→i} f_ji cs_ji`, the gradient
    /// of the assembly's bond energy with respect to `x_i`.
    pub fn internal_force(&self, id: ParticleId) -> DVec3 {
        let p = &self.particles[id.index()];
        let mut f = DVec3::ZERO;
        for bond in p.bonds() {
            f += 0.5 * bond.bforce * bond.cs;
        }
        for &j in p.neighbors() {
            if let Some(rev) = self.particles[j.index()].bond_to(id) {
                f -= 0.5 * rev.bforce * rev.cs;
            }
        }
        f
    }

    /// Applies every particle's damage rule. Returns the number of newly
    /// broken bonds; if any broke, geometry and forces are refreshed.
    pub fn update_damage(&mut self) -> usize {
        let broken: usize = self
            .particles
            .par_iter_mut()
            .map(|p| p.update_damage())
            .sum();
        if broken > 0 {
            self.refresh();
        }
        broken
    }

    /// Commits every particle's state for a later `resume`.
    pub fn commit(&mut self) {
        self.particles.par_iter_mut().for_each(|p| p.commit());
    }

    /// Sorted intersection of the closed one-hop neighborhoods of `a` and `b`.
    pub fn shared_closed_neighborhood(&self, a: ParticleId, b: ParticleId) -> Vec<ParticleId> {
        let closed = |id: ParticleId| {
            let mut v = self.particles[id.index()].neighbors().to_vec();
            let pos = v.binary_search(&id).unwrap_or_else(|e| e);
            v.insert(pos, id);
            v
        };
        let (ca, cb) = (closed(a), closed(b));
        ca.into_iter().filter(|id| cb.binary_search(id).is_ok()).collect()
    }
}
