//! Directed bond between an owner particle and one of its neighbors.
//!
//! Bonds are stored by value in the owning particle; the endpoints are
//! plain arena indices. A broken bond keeps its slot but is inert: its
//! direction cosines and elastic length change stay exactly zero.

use lpm_lattice::UnitCell;
use lpm_material::BondStrain;
use lpm_math::DVec3;
use lpm_types::constants::EPS;
use lpm_types::{BondId, ParticleId};

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub id: BondId,
    pub owner: ParticleId,
    pub neighbor: ParticleId,
    /// Neighbor shell (0 = nearest).
    pub layer: usize,
    pub dis_initial: f64,
    pub dis_last: f64,
    pub dis: f64,
    /// Total length change.
    pub dl: f64,
    pub dl_last: f64,
    /// Elastic length change, `dl − dlp`.
    pub dle: f64,
    pub dle_last: f64,
    /// Plastic length change.
    pub dlp: f64,
    pub kn: f64,
    pub tv: f64,
    /// Unit vector `(x_owner − x_neighbor) / dis`.
    pub cs: DVec3,
    pub cs_last: DVec3,
    pub bforce_last: f64,
    pub bforce: f64,
    pub damage: f64,
    pub damage_last: f64,
}

impl Bond {
    /// Creates the bond if the initial distance falls into one of the
    /// cell's neighbor layers.
    pub fn new(
        id: BondId,
        owner: ParticleId,
        neighbor: ParticleId,
        owner_xyz: DVec3,
        neighbor_xyz: DVec3,
        cell: &UnitCell,
    ) -> Option<Self> {
        let dis = owner_xyz.distance(neighbor_xyz);
        let layer = cell.layer_of(dis)?;
        Some(Self::with_layer(id, owner, neighbor, owner_xyz, neighbor_xyz, layer, dis))
    }

    /// Creates a bond with an explicit layer and initial length.
    pub fn with_layer(
        id: BondId,
        owner: ParticleId,
        neighbor: ParticleId,
        owner_xyz: DVec3,
        neighbor_xyz: DVec3,
        layer: usize,
        dis_initial: f64,
    ) -> Self {
        let mut bond = Self {
            id,
            owner,
            neighbor,
            layer,
            dis_initial,
            dis_last: dis_initial,
            dis: dis_initial,
            dl: 0.0,
            dl_last: 0.0,
            dle: 0.0,
            dle_last: 0.0,
            dlp: 0.0,
            kn: 0.0,
            tv: 0.0,
            cs: DVec3::ZERO,
            cs_last: DVec3::ZERO,
            bforce_last: 0.0,
            bforce: 0.0,
            damage: 0.0,
            damage_last: 0.0,
        };
        bond.update_geometry(owner_xyz, neighbor_xyz);
        bond.commit();
        bond
    }

    /// Damage has reached one.
    #[inline]
    pub fn is_broken(&self) -> bool {
        (self.damage - 1.0).abs() < EPS
    }

    /// Recomputes length, length changes and direction cosines.
    ///
    /// Returns `true` if the bond is broken, in which case `dle` and `cs`
    /// are zero.
    pub fn update_geometry(&mut self, owner_xyz: DVec3, neighbor_xyz: DVec3) -> bool {
        let d = owner_xyz - neighbor_xyz;
        self.dis = d.length();
        self.dl = self.dis - self.dis_initial;
        if self.is_broken() {
            self.dle = 0.0;
            self.cs = DVec3::ZERO;
            return true;
        }
        self.dle = self.dl - self.dlp;
        self.cs = d / self.dis;
        false
    }

    /// Engineering strain `dl / dis_initial`.
    pub fn strain(&self) -> f64 {
        self.dl / self.dis_initial
    }

    /// Model input for this bond, given the owner's per-layer elastic sum.
    pub fn strain_state(&self, dle_total: f64) -> BondStrain {
        BondStrain {
            layer: self.layer,
            dis_initial: self.dis_initial,
            dl: self.dl,
            dle: self.dle,
            dle_total,
            kn: self.kn,
            tv: self.tv,
            damage: self.damage,
        }
    }

    /// Saves the current state as the last committed state.
    pub fn commit(&mut self) {
        self.dis_last = self.dis;
        self.dl_last = self.dl;
        self.dle_last = self.dle;
        self.cs_last = self.cs;
        self.bforce_last = self.bforce;
        self.damage_last = self.damage;
    }

    /// Restores the last committed state.
    pub fn resume(&mut self) {
        self.dis = self.dis_last;
        self.dl = self.dl_last;
        self.dle = self.dle_last;
        self.cs = self.cs_last;
        self.bforce = self.bforce_last;
        self.damage = self.damage_last;
    }
}
