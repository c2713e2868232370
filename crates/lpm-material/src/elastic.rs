//! Linear elastic bonds.

use lpm_lattice::UnitCell;

use crate::properties::ElasticConstants;
use crate::traits::{BondCoefficients, BondForceModel};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stiffness {
    Constants(ElasticConstants),
    Coefficients(BondCoefficients),
}

/// Elastic bond model: the default force law, no damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticBond {
    stiffness: Stiffness,
}

impl ElasticBond {
    /// Bond coefficients derived from elastic constants through the unit cell.
    pub fn new(constants: ElasticConstants) -> Self {
        Self {
            stiffness: Stiffness::Constants(constants),
        }
    }

    /// Bond coefficients given directly, independent of the lattice.
    pub fn from_coefficients(coefficients: BondCoefficients) -> Self {
        Self {
            stiffness: Stiffness::Coefficients(coefficients),
        }
    }
}

impl BondForceModel for ElasticBond {
    fn name(&self) -> &str {
        "elastic"
    }

    fn coefficients(&self, cell: &UnitCell) -> BondCoefficients {
        match self.stiffness {
            Stiffness::Constants(c) => {
                let [kn0, kn1, tv] = cell.map_elastic(c.as_array());
                BondCoefficients {
                    kn: [kn0, kn1],
                    tv,
                }
            }
            Stiffness::Coefficients(k) => k,
        }
    }
}
