//! Bond force model trait: the solver's view of a material.

use std::fmt;

use lpm_lattice::UnitCell;
use lpm_types::constants::MAX_LAYERS;
use serde::{Deserialize, Serialize};

/// Per-layer normal stiffness and the shared volumetric coupling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondCoefficients {
    pub kn: [f64; MAX_LAYERS],
    pub tv: f64,
}

/// Kinematic and stiffness state of one bond, as seen by a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondStrain {
    pub layer: usize,
    pub dis_initial: f64,
    /// Total length change.
    pub dl: f64,
    /// Elastic length change.
    pub dle: f64,
    /// Sum of elastic length changes over the owner's bonds of the same layer.
    pub dle_total: f64,
    pub kn: f64,
    pub tv: f64,
    pub damage: f64,
}

impl BondStrain {
    /// Engineering strain of the bond.
    pub fn strain(&self) -> f64 {
        self.dl / self.dis_initial
    }
}

/// Damage bookkeeping of the brittle model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BrittleState {
    pub broken_bonds: usize,
}

/// Per-particle state owned by the particle's material model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MaterialState {
    #[default]
    Elastic,
    Brittle(BrittleState),
}

impl MaterialState {
    /// Bonds this particle has lost to damage.
    pub fn broken_bonds(&self) -> usize {
        match self {
            Self::Elastic => 0,
            Self::Brittle(s) => s.broken_bonds,
        }
    }
}

/// Trait for bond force models.
///
/// Implementations decide the bond coefficients for a unit cell, the
/// force carried by a bond and how damage evolves. The default force is
///
/// `f = (1 − D) · (Kn · dLe + Tv · dLe_total)`.
pub trait BondForceModel: Send + Sync + fmt::Debug {
    /// Returns the name of this model.
    fn name(&self) -> &str;

    /// Bond coefficients on the given lattice.
    fn coefficients(&self, cell: &UnitCell) -> BondCoefficients;

    /// State of a freshly created particle.
    fn initial_state(&self) -> MaterialState {
        MaterialState::Elastic
    }

    /// Scalar bond force (positive in tension).
    fn bond_force(&self, bond: &BondStrain) -> f64 {
        (1.0 - bond.damage) * (bond.kn * bond.dle + bond.tv * bond.dle_total)
    }

    /// Updated damage of a bond. Must not be smaller than `bond.damage`.
    fn bond_damage(&self, bond: &BondStrain, _state: &MaterialState) -> f64 {
        bond.damage
    }

    /// Records bonds of this particle that broke in the last damage pass.
    fn record_damage(&self, _state: &mut MaterialState, _newly_broken: usize) {}
}
