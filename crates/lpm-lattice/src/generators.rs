//! Regular particle arrangements for scenarios and tests.
//!
//! Generators are deterministic: particles are emitted with x varying
//! fastest, then y, then z, so particle ids are predictable.

use lpm_math::DVec3;
use lpm_types::{LpmError, LpmResult};

use crate::unit_cell::UnitCell;

/// Fills the box `[xmin, xmax, ymin, ymax, zmin, zmax]` with the cell's lattice.
///
/// The first particle sits at `min + R` on every axis and neighbors are
/// `2R` apart; every particle lies fully inside the box. 2D cells ignore
/// the z extent and place particles at `z = 0`.
pub fn cuboid(cell: &UnitCell, bounds: [f64; 6]) -> LpmResult<Vec<DVec3>> {
    let spacing = 2.0 * cell.radius;
    let count = |min: f64, max: f64| -> usize {
        if max <= min {
            0
        } else {
            ((max - min) / spacing + 1e-9).floor() as usize
        }
    };

    let nx = count(bounds[0], bounds[1]);
    let ny = count(bounds[2], bounds[3]);
    let nz = if cell.dim == 3 { count(bounds[4], bounds[5]) } else { 1 };
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(LpmError::InvalidLattice(format!(
            "box {bounds:?} is too small for particles of radius {}",
            cell.radius
        )));
    }

    let z0 = if cell.dim == 3 { bounds[4] + cell.radius } else { 0.0 };
    let mut positions = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                positions.push(DVec3::new(
                    bounds[0] + cell.radius + spacing * i as f64,
                    bounds[2] + cell.radius + spacing * j as f64,
                    z0 + spacing * k as f64,
                ));
            }
        }
    }
    Ok(positions)
}

/// Axis-aligned bounds `[xmin, xmax, ymin, ymax, zmin, zmax]` of a point set.
pub fn bounding_box(positions: &[DVec3]) -> [f64; 6] {
    let mut b = [
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
    ];
    for p in positions {
        for axis in 0..3 {
            b[2 * axis] = b[2 * axis].min(p[axis]);
            b[2 * axis + 1] = b[2 * axis + 1].max(p[axis]);
        }
    }
    b
}
