//! Load steps: displacement and force boundary conditions.

use lpm_types::{LpmError, LpmResult, ParticleId};
use serde::{Deserialize, Serialize};

/// How a boundary-condition value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Target measured from the initial configuration.
    Absolute,
    /// Increment added on top of the current state.
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Parses `'x'`, `'y'` or `'z'`.
    pub fn from_char(c: char) -> LpmResult<Self> {
        match c.to_ascii_lowercase() {
            'x' => Ok(Self::X),
            'y' => Ok(Self::Y),
            'z' => Ok(Self::Z),
            other => Err(LpmError::InvalidBoundaryCondition(format!(
                "unknown axis '{other}'"
            ))),
        }
    }
}

/// Prescribed displacement of a group along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispBC {
    pub group: Vec<ParticleId>,
    pub axis: Axis,
    pub mode: LoadMode,
    pub value: f64,
}

/// Total force applied to a group, shared evenly between its particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceBC {
    pub group: Vec<ParticleId>,
    pub mode: LoadMode,
    pub force: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadStep {
    #[serde(default)]
    pub disp_bcs: Vec<DispBC>,
    #[serde(default)]
    pub force_bcs: Vec<ForceBC>,
}

impl LoadStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a displacement BC.
    pub fn displace(mut self, group: &[ParticleId], axis: Axis, mode: LoadMode, value: f64) -> Self {
        self.disp_bcs.push(DispBC {
            group: group.to_vec(),
            axis,
            mode,
            value,
        });
        self
    }

    /// Holds `group` in place along every axis of a `dim`-dimensional problem.
    pub fn fix(mut self, group: &[ParticleId], dim: usize) -> Self {
        for axis in [Axis::X, Axis::Y, Axis::Z].into_iter().take(dim) {
            self = self.displace(group, axis, LoadMode::Relative, 0.0);
        }
        self
    }

    /// Adds a force BC.
    pub fn push(mut self, group: &[ParticleId], mode: LoadMode, force: [f64; 3]) -> Self {
        self.force_bcs.push(ForceBC {
            group: group.to_vec(),
            mode,
            force,
        });
        self
    }

    /// Checks particle ids and axes against an assembly of `len` particles.
    pub fn validate(&self, len: usize, dim: usize) -> LpmResult<()> {
        let check_group = |group: &[ParticleId]| -> LpmResult<()> {
            if group.is_empty() {
                return Err(LpmError::InvalidBoundaryCondition("empty particle group".into()));
            }
            if let Some(id) = group.iter().find(|id| id.index() >= len) {
                return Err(LpmError::InvalidBoundaryCondition(format!(
                    "particle {id} does not exist ({len} particles)"
                )));
            }
            Ok(())
        };
        for bc in &self.disp_bcs {
            check_group(&bc.group)?;
            if bc.axis.index() >= dim {
                return Err(LpmError::InvalidBoundaryCondition(format!(
                    "axis {:?} is not available in {dim}D",
                    bc.axis
                )));
            }
        }
        for bc in &self.force_bcs {
            check_group(&bc.group)?;
        }
        Ok(())
    }
}
