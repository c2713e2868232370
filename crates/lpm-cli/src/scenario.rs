//! Scenario files: everything needed to run one simulation.
//!
//! A scenario is a TOML document describing the lattice, the box it
//! fills, the material, named particle groups and the load steps that
//! act on them, plus an optional `[solver]` table. See
//! [`Scenario::example`] for a complete file.

use std::path::Path;
use std::sync::Arc;

use lpm_lattice::generators::cuboid;
use lpm_lattice::{LatticeType, UnitCell};
use lpm_material::{
    BondForceModel, BrittleBond, ElasticBond, ElasticConstants, MaterialLibrary,
};
use lpm_solver::{Assembly, Axis, LoadMode, LoadStep, SolverConfig};
use lpm_types::{LpmError, LpmResult, ParticleId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeSpec {
    #[serde(rename = "type")]
    pub lattice: LatticeType,
    pub radius: f64,
}

/// Material given by library preset, isotropic constants or cubic constants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youngs_modulus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poisson_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c11: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c12: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c44: Option<f64>,
    /// Overrides the preset's critical bond strain when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_bond_strain: Option<f64>,
}

impl MaterialSpec {
    /// Resolves the material table into a bond force model.
    pub fn model(&self, library: &MaterialLibrary) -> LpmResult<Arc<dyn BondForceModel>> {
        let (constants, preset_strain) = match (
            &self.preset,
            (self.youngs_modulus, self.poisson_ratio),
            (self.c11, self.c12, self.c44),
        ) {
            (Some(name), (None, None), (None, None, None)) => {
                let props = library.get(name).ok_or_else(|| {
                    LpmError::InvalidMaterial(format!(
                        "unknown material preset '{name}'. Available: {}",
                        library.names().join(", ")
                    ))
                })?;
                (props.constants()?, props.critical_bond_strain)
            }
            (None, (Some(e), Some(nu)), (None, None, None)) => {
                (ElasticConstants::isotropic(e, nu)?, None)
            }
            (None, (None, None), (Some(c11), Some(c12), Some(c44))) => {
                (ElasticConstants::cubic(c11, c12, c44)?, None)
            }
            _ => {
                return Err(LpmError::InvalidMaterial(
                    "material needs exactly one of: preset, youngs_modulus + poisson_ratio, \
                     or c11 + c12 + c44"
                        .into(),
                ));
            }
        };

        let elastic = ElasticBond::new(constants);
        match self.critical_bond_strain.or(preset_strain) {
            None => Ok(Arc::new(elastic)),
            Some(strain) => Ok(Arc::new(BrittleBond::new(elastic, strain)?)),
        }
    }
}

/// Particles whose coordinate along `axis` lies in `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub axis: Axis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl GroupSpec {
    fn contains(&self, coordinate: f64) -> bool {
        self.min.map_or(true, |m| coordinate >= m) && self.max.map_or(true, |m| coordinate <= m)
    }
}

fn relative() -> LoadMode {
    LoadMode::Relative
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispSpec {
    pub group: String,
    pub axis: Axis,
    #[serde(default = "relative")]
    pub mode: LoadMode,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceSpec {
    pub group: String,
    #[serde(default = "relative")]
    pub mode: LoadMode,
    pub force: [f64; 3],
}

fn once() -> usize {
    1
}

/// One load step, optionally repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(default = "once")]
    pub repeat: usize,
    /// Groups held in place along every axis.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disp: Vec<DispSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub force: Vec<ForceSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    pub bounds: [f64; 6],
    pub lattice: LatticeSpec,
    pub material: MaterialSpec,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// A scenario resolved into solver inputs.
pub struct Problem {
    pub assembly: Assembly,
    pub steps: Vec<LoadStep>,
    pub config: SolverConfig,
}

impl Scenario {
    pub fn from_toml(text: &str) -> LpmResult<Self> {
        toml::from_str(text).map_err(|e| LpmError::Serialization(e.to_string()))
    }

    pub fn load(path: &Path) -> LpmResult<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn to_toml(&self) -> LpmResult<String> {
        toml::to_string_pretty(self).map_err(|e| LpmError::Serialization(e.to_string()))
    }

    /// Builds the assembly and load steps.
    pub fn build(&self) -> LpmResult<Problem> {
        self.solver.validate()?;
        let cell = UnitCell::new(self.lattice.lattice, self.lattice.radius)?;
        let coords = cuboid(&cell, self.bounds)?;
        let model = self.material.model(&MaterialLibrary::with_defaults())?;
        let assembly = Assembly::new(&coords, cell, model)?;

        let mut steps = Vec::new();
        for spec in &self.steps {
            let step = self.load_step(&assembly, spec)?;
            step.validate(assembly.len(), assembly.dim())?;
            steps.extend(std::iter::repeat(step).take(spec.repeat));
        }
        if steps.is_empty() {
            return Err(LpmError::InvalidConfig(format!(
                "scenario '{}' has no load steps",
                self.name
            )));
        }

        tracing::info!(
            scenario = %self.name,
            particles = assembly.len(),
            steps = steps.len(),
            "scenario built"
        );
        Ok(Problem {
            assembly,
            steps,
            config: self.solver.clone(),
        })
    }

    /// Particle ids of the named group.
    pub fn group(&self, assembly: &Assembly, name: &str) -> LpmResult<Vec<ParticleId>> {
        let spec = self
            .groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| LpmError::InvalidConfig(format!("unknown group '{name}'")))?;
        let axis = spec.axis.index();
        let ids = assembly.select(|p| spec.contains(p.xyz[axis]));
        if ids.is_empty() {
            return Err(LpmError::InvalidConfig(format!("group '{name}' selects no particles")));
        }
        Ok(ids)
    }

    fn load_step(&self, assembly: &Assembly, spec: &StepSpec) -> LpmResult<LoadStep> {
        let mut step = LoadStep::new();
        for name in &spec.fixed {
            step = step.fix(&self.group(assembly, name)?, assembly.dim());
        }
        for d in &spec.disp {
            step = step.displace(&self.group(assembly, &d.group)?, d.axis, d.mode, d.value);
        }
        for f in &spec.force {
            step = step.push(&self.group(assembly, &f.group)?, f.mode, f.force);
        }
        Ok(step)
    }

    /// Aluminum column on a simple cubic lattice: top face fixed, bottom
    /// face pushed up with a total force of 2000.
    pub fn example() -> Self {
        let radius = 0.8;
        let bounds = [0.0, 10.0, -0.4, 10.0, -0.4, 30.0];
        Self {
            name: "isotropic_elasticity_3d".into(),
            bounds,
            lattice: LatticeSpec {
                lattice: LatticeType::SimpleCubic3D,
                radius,
            },
            material: MaterialSpec {
                youngs_modulus: Some(69.0e3),
                poisson_ratio: Some(0.3),
                ..MaterialSpec::default()
            },
            solver: SolverConfig::fast(),
            groups: vec![
                GroupSpec {
                    name: "top".into(),
                    axis: Axis::Z,
                    min: Some(bounds[5] - 2.0 * radius),
                    max: None,
                },
                GroupSpec {
                    name: "bottom".into(),
                    axis: Axis::Z,
                    min: None,
                    max: Some(bounds[4] + 2.0 * radius),
                },
            ],
            steps: vec![StepSpec {
                repeat: 1,
                fixed: vec!["top".into()],
                disp: Vec::new(),
                force: vec![ForceSpec {
                    group: "bottom".into(),
                    mode: LoadMode::Relative,
                    force: [0.0, 0.0, 2000.0],
                }],
            }],
        }
    }
}
