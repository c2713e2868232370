//! Spatial-hash neighbor search.
//!
//! Bins particles into a uniform grid whose cell size equals the search
//! radius, so every neighbor of a particle lies in its own cell or one of
//! the 26 adjacent cells.

use std::collections::HashMap;

use lpm_math::DVec3;
use lpm_types::constants::COINCIDENT_DISTANCE;
use lpm_types::{LpmError, LpmResult};

/// Uniform-grid neighbor search with a fixed radius.
pub struct NeighborSearch {
    radius: f64,
    /// Inverse cell size (cached).
    inv_cell_size: f64,
}

impl NeighborSearch {
    pub fn new(radius: f64) -> Self {
        let radius = radius.max(1e-12);
        Self {
            radius,
            inv_cell_size: 1.0 / radius,
        }
    }

    fn cell_key(&self, p: DVec3) -> (i64, i64, i64) {
        (
            (p.x * self.inv_cell_size).floor() as i64,
            (p.y * self.inv_cell_size).floor() as i64,
            (p.z * self.inv_cell_size).floor() as i64,
        )
    }

    /// Sorted neighbor indices of every particle within the search radius.
    ///
    /// Coincident particles are rejected.
    pub fn build(&self, positions: &[DVec3]) -> LpmResult<Vec<Vec<usize>>> {
        let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
        for (i, &p) in positions.iter().enumerate() {
            grid.entry(self.cell_key(p)).or_default().push(i);
        }

        let mut neighbors = vec![Vec::new(); positions.len()];
        for (i, &p) in positions.iter().enumerate() {
            let (cx, cy, cz) = self.cell_key(p);
            let list = &mut neighbors[i];
            for dx in -1..=1_i64 {
                for dy in -1..=1_i64 {
                    for dz in -1..=1_i64 {
                        let Some(cell) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        for &j in cell {
                            if j == i {
                                continue;
                            }
                            let dist = p.distance(positions[j]);
                            if dist < COINCIDENT_DISTANCE {
                                return Err(LpmError::InvalidLattice(format!(
                                    "particles {i} and {j} are coincident"
                                )));
                            }
                            if dist < self.radius {
                                list.push(j);
                            }
                        }
                    }
                }
            }
            list.sort_unstable();
        }
        Ok(neighbors)
    }
}
