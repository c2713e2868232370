//! Unit cell descriptor.
//!
//! A unit cell fixes the lattice arrangement, the particle radius `R`,
//! the neighbor shells (layers) with their cutoff distances and the
//! linear map from elastic constants `[C11, C12, C44]` to the bond
//! coefficients `[Kn0, Kn1, Tv]`.

use lpm_types::constants::{LAYER_CUTOFF_FACTOR, MAX_LAYERS};
use lpm_types::{LpmError, LpmResult};
use serde::{Deserialize, Serialize};

/// Supported lattice arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatticeType {
    /// 2D square lattice, plane strain, unit thickness.
    #[serde(rename = "square")]
    Square2D,
    /// 3D simple cubic lattice.
    #[serde(rename = "simple_cubic")]
    SimpleCubic3D,
}

/// Geometry and stiffness mapping of one lattice arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCell {
    pub lattice: LatticeType,
    /// Particle radius; the nearest-neighbor spacing is `2R`.
    pub radius: f64,
    /// Spatial dimension (2 or 3).
    pub dim: usize,
    /// Neighbors of an interior particle, all layers.
    pub nneighbors: usize,
    /// Neighbors of an interior particle, per layer.
    pub nneighbors_layer: [usize; MAX_LAYERS],
    /// Neighbor distance of each layer.
    pub neighbor_cutoff: [f64; MAX_LAYERS],
    /// Volume (area in 2D) represented by one particle.
    pub particle_volume: f64,
    /// Rows map `[C11, C12, C44]` to `Kn0`, `Kn1`, `Tv`.
    pub el_mapping: [[f64; 3]; 3],
    /// Scale applied on top of `el_mapping` (`R` in 3D, 1 in 2D).
    pub el_scale: f64,
}

impl UnitCell {
    pub fn new(lattice: LatticeType, radius: f64) -> LpmResult<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(LpmError::InvalidLattice(format!(
                "particle radius must be positive, got {radius}"
            )));
        }
        let sqrt2 = std::f64::consts::SQRT_2;
        let cell = match lattice {
            LatticeType::Square2D => Self {
                lattice,
                radius,
                dim: 2,
                nneighbors: 8,
                nneighbors_layer: [4, 4],
                neighbor_cutoff: [2.0 * radius, 2.0 * sqrt2 * radius],
                particle_volume: (2.0 * radius).powi(2),
                el_mapping: [
                    [1.0, -1.0, 0.0],
                    [0.0, 0.0, 1.0],
                    [0.0, 1.0 / 6.0, -1.0 / 6.0],
                ],
                el_scale: 1.0,
            },
            LatticeType::SimpleCubic3D => Self {
                lattice,
                radius,
                dim: 3,
                nneighbors: 18,
                nneighbors_layer: [6, 12],
                neighbor_cutoff: [2.0 * radius, 2.0 * sqrt2 * radius],
                particle_volume: (2.0 * radius).powi(3),
                el_mapping: [
                    [2.0, -2.0, -2.0],
                    [0.0, 0.0, 2.0],
                    [0.0, 1.0 / 9.0, -1.0 / 9.0],
                ],
                el_scale: radius,
            },
        };
        Ok(cell)
    }

    /// Number of neighbor layers.
    pub fn nlayer(&self) -> usize {
        MAX_LAYERS
    }

    /// Largest distance at which a bond is created.
    pub fn search_radius(&self) -> f64 {
        LAYER_CUTOFF_FACTOR * self.neighbor_cutoff[MAX_LAYERS - 1]
    }

    /// Layer of a bond of initial length `dis`, if it is a bond at all.
    pub fn layer_of(&self, dis: f64) -> Option<usize> {
        let c0 = LAYER_CUTOFF_FACTOR * self.neighbor_cutoff[0];
        let c1 = LAYER_CUTOFF_FACTOR * self.neighbor_cutoff[1];
        if dis < c0 {
            Some(0)
        } else if dis > c0 && dis < c1 {
            Some(1)
        } else {
            None
        }
    }

    /// Maps `[C11, C12, C44]` to `[Kn0, Kn1, Tv]`.
    pub fn map_elastic(&self, c: [f64; 3]) -> [f64; 3] {
        let mut k = [0.0; 3];
        for (row, out) in self.el_mapping.iter().zip(k.iter_mut()) {
            *out = self.el_scale * (row[0] * c[0] + row[1] * c[1] + row[2] * c[2]);
        }
        k
    }
}
