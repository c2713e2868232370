//! Elastic constants and material presets.

use std::sync::Arc;

use lpm_types::{LpmError, LpmResult};
use serde::{Deserialize, Serialize};

use crate::brittle::BrittleBond;
use crate::elastic::ElasticBond;
use crate::traits::BondForceModel;

/// Cubic elastic constants in Voigt notation.
///
/// Isotropic materials are the special case `C44 = (C11 − C12) / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticConstants {
    pub c11: f64,
    pub c12: f64,
    pub c44: f64,
}

impl ElasticConstants {
    /// Constants of an isotropic solid with Young's modulus `e` and Poisson ratio `nu`.
    pub fn isotropic(e: f64, nu: f64) -> LpmResult<Self> {
        if !(e.is_finite() && e > 0.0) {
            return Err(LpmError::InvalidMaterial(format!(
                "Young's modulus must be positive, got {e}"
            )));
        }
        if !(nu > -1.0 && nu < 0.5) {
            return Err(LpmError::InvalidMaterial(format!(
                "Poisson ratio must lie in (-1, 0.5), got {nu}"
            )));
        }
        let lambda_scale = e / ((1.0 + nu) * (1.0 - 2.0 * nu));
        Ok(Self {
            c11: lambda_scale * (1.0 - nu),
            c12: lambda_scale * nu,
            c44: e / (2.0 * (1.0 + nu)),
        })
    }

    pub fn cubic(c11: f64, c12: f64, c44: f64) -> LpmResult<Self> {
        if !(c11 > 0.0 && c44 > 0.0 && c11 > c12.abs()) {
            return Err(LpmError::InvalidMaterial(format!(
                "cubic constants ({c11}, {c12}, {c44}) are not positive definite"
            )));
        }
        Ok(Self { c11, c12, c44 })
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.c11, self.c12, self.c44]
    }
}

/// A named material preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub name: String,
    /// Young's modulus (same stress unit as the applied loads).
    pub youngs_modulus: f64,
    pub poisson_ratio: f64,
    /// Bond strain at which bonds break; `None` for a purely elastic material.
    #[serde(default)]
    pub critical_bond_strain: Option<f64>,
}

impl MaterialProperties {
    pub fn constants(&self) -> LpmResult<ElasticConstants> {
        ElasticConstants::isotropic(self.youngs_modulus, self.poisson_ratio)
    }

    /// Builds the bond force model described by this preset.
    pub fn model(&self) -> LpmResult<Arc<dyn BondForceModel>> {
        let elastic = ElasticBond::new(self.constants()?);
        match self.critical_bond_strain {
            None => Ok(Arc::new(elastic)),
            Some(strain) => Ok(Arc::new(BrittleBond::new(elastic, strain)?)),
        }
    }
}
