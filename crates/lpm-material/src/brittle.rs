//! Elastic-brittle bonds: elastic until a critical bond strain, then broken.

use lpm_lattice::UnitCell;
use lpm_types::{LpmError, LpmResult};

use crate::elastic::ElasticBond;
use crate::traits::{BondCoefficients, BondForceModel, BondStrain, BrittleState, MaterialState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrittleBond {
    elastic: ElasticBond,
    critical_strain: f64,
}

impl BrittleBond {
    pub fn new(elastic: ElasticBond, critical_strain: f64) -> LpmResult<Self> {
        if !(critical_strain.is_finite() && critical_strain > 0.0) {
            return Err(LpmError::InvalidMaterial(format!(
                "critical bond strain must be positive, got {critical_strain}"
            )));
        }
        Ok(Self {
            elastic,
            critical_strain,
        })
    }

    pub fn critical_strain(&self) -> f64 {
        self.critical_strain
    }
}

impl BondForceModel for BrittleBond {
    fn name(&self) -> &str {
        "elastic_brittle"
    }

    fn coefficients(&self, cell: &UnitCell) -> BondCoefficients {
        self.elastic.coefficients(cell)
    }

    fn initial_state(&self) -> MaterialState {
        MaterialState::Brittle(BrittleState::default())
    }

    fn bond_damage(&self, bond: &BondStrain, _state: &MaterialState) -> f64 {
        if bond.strain() >= self.critical_strain {
            1.0
        } else {
            bond.damage
        }
    }

    fn record_damage(&self, state: &mut MaterialState, newly_broken: usize) {
        if let MaterialState::Brittle(s) = state {
            s.broken_bonds += newly_broken;
        }
    }
}
