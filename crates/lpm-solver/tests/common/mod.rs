//! Shared fixtures for the lpm-solver integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use lpm_lattice::generators::cuboid;
use lpm_lattice::{LatticeType, UnitCell};
use lpm_material::{
    BondCoefficients, BondForceModel, ElasticBond, ElasticConstants, MaterialProperties,
};
use lpm_math::DVec3;
use lpm_solver::Assembly;
use lpm_types::ParticleId;

/// Aluminum-like isotropic elasticity.
pub fn aluminum() -> Arc<dyn BondForceModel> {
    Arc::new(ElasticBond::new(ElasticConstants::isotropic(69.0e3, 0.3).unwrap()))
}

/// `n × n × n` simple cubic block of particles with radius `radius`.
pub fn cube(n: usize, radius: f64, model: Arc<dyn BondForceModel>) -> Assembly {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, radius).unwrap();
    let side = 2.0 * radius * n as f64;
    let coords = cuboid(&cell, [0.0, side, 0.0, side, 0.0, side]).unwrap();
    assert_eq!(coords.len(), n * n * n);
    Assembly::new(&coords, cell, model).unwrap()
}

/// `n × n` square lattice in the z = 0 plane.
pub fn square(n: usize, radius: f64) -> Assembly {
    let cell = UnitCell::new(LatticeType::Square2D, radius).unwrap();
    let side = 2.0 * radius * n as f64;
    let coords = cuboid(&cell, [0.0, side, 0.0, side, 0.0, 0.0]).unwrap();
    let model = MaterialProperties {
        name: "plate".into(),
        youngs_modulus: 1.0e3,
        poisson_ratio: 0.3,
        critical_bond_strain: None,
    }
    .model()
    .unwrap();
    Assembly::new(&coords, cell, model).unwrap()
}

/// Two particles one nearest-neighbor spacing apart along x.
pub fn two_particles(model: Arc<dyn BondForceModel>) -> Assembly {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 0.5).unwrap();
    let coords = [DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0)];
    Assembly::new(&coords, cell, model).unwrap()
}

/// Elastic model with explicit coefficients and no volumetric coupling.
pub fn axial_spring(kn: f64) -> Arc<dyn BondForceModel> {
    Arc::new(ElasticBond::from_coefficients(BondCoefficients {
        kn: [kn, kn],
        tv: 0.0,
    }))
}

/// Particles whose coordinate `axis` is within `tol` of `value`.
pub fn face(assembly: &Assembly, axis: usize, value: f64) -> Vec<ParticleId> {
    assembly.select(|p| (p.xyz[axis] - value).abs() < 1e-9)
}

/// Applies a smooth, non-affine displacement field and refreshes.
pub fn deform(assembly: &mut Assembly, amplitude: f64) {
    for p in assembly.particles_mut() {
        let x = p.xyz;
        let u = DVec3::new(
            (0.7 * x.y + 0.3 * x.z).sin(),
            (0.5 * x.x - 0.2 * x.z).cos() - 1.0,
            0.4 * x.x * x.y - 0.1 * x.z * x.z,
        );
        p.move_by(amplitude * u);
    }
    assembly.refresh();
}
