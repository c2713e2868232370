//! Integration tests for lpm-lattice.

use approx::assert_relative_eq;
use lpm_lattice::generators::{bounding_box, cuboid};
use lpm_lattice::{LatticeType, NeighborSearch, UnitCell};
use lpm_math::DVec3;

// ─── Unit Cell Tests ─────────────────────────────────────────

#[test]
fn simple_cubic_shells() {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 0.8).unwrap();
    assert_eq!(cell.dim, 3);
    assert_eq!(cell.nneighbors, 18);
    assert_relative_eq!(cell.neighbor_cutoff[0], 1.6);
    assert_relative_eq!(cell.neighbor_cutoff[1], 1.6 * 2f64.sqrt());
    assert_relative_eq!(cell.particle_volume, 1.6f64.powi(3), max_relative = 1e-12);
}

#[test]
fn layer_assignment_by_cutoff() {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 0.5).unwrap();
    assert_eq!(cell.layer_of(1.0), Some(0));
    assert_eq!(cell.layer_of(1.005), Some(0));
    assert_eq!(cell.layer_of(2f64.sqrt()), Some(1));
    assert_eq!(cell.layer_of(3f64.sqrt()), None);
}

#[test]
fn simple_cubic_elastic_mapping() {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 1.0).unwrap();
    let [kn0, kn1, tv] = cell.map_elastic([10.0, 4.0, 2.0]);
    assert_relative_eq!(kn0, 2.0 * (10.0 - 4.0 - 2.0));
    assert_relative_eq!(kn1, 4.0);
    assert_relative_eq!(tv, (4.0 - 2.0) / 9.0);
}

#[test]
fn three_dimensional_mapping_scales_with_radius() {
    let small = UnitCell::new(LatticeType::SimpleCubic3D, 1.0).unwrap();
    let large = UnitCell::new(LatticeType::SimpleCubic3D, 2.0).unwrap();
    let c = [10.0, 4.0, 2.0];
    assert_relative_eq!(large.map_elastic(c)[0], 2.0 * small.map_elastic(c)[0]);
}

#[test]
fn square_mapping_is_radius_independent() {
    let a = UnitCell::new(LatticeType::Square2D, 1.0).unwrap();
    let b = UnitCell::new(LatticeType::Square2D, 3.0).unwrap();
    assert_eq!(a.map_elastic([9.0, 3.0, 3.0]), b.map_elastic([9.0, 3.0, 3.0]));
    assert_eq!(a.dim, 2);
}

#[test]
fn invalid_radius_rejected() {
    assert!(UnitCell::new(LatticeType::Square2D, 0.0).is_err());
    assert!(UnitCell::new(LatticeType::SimpleCubic3D, f64::NAN).is_err());
}

#[test]
fn unit_cell_round_trips_through_toml() {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 0.8).unwrap();
    let text = toml::to_string(&cell).unwrap();
    assert!(text.contains("simple_cubic"));
    let back: UnitCell = toml::from_str(&text).unwrap();
    assert_eq!(back, cell);
}

// ─── Generator Tests ─────────────────────────────────────────

#[test]
fn cuboid_three_by_three_by_three() {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 0.8).unwrap();
    let pts = cuboid(&cell, [0.0, 4.8, 0.0, 4.8, 0.0, 4.8]).unwrap();
    assert_eq!(pts.len(), 27);
    assert_relative_eq!(pts[0].x, 0.8);
    assert_relative_eq!(pts[1].x, 2.4);
    assert_relative_eq!(pts[26].z, 4.0);
}

#[test]
fn cuboid_partial_cells_are_dropped() {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 0.8).unwrap();
    let pts = cuboid(&cell, [0.0, 10.0, -0.4, 10.0, -0.4, 30.0]).unwrap();
    // 10/1.6 → 6, 10.4/1.6 → 6, 30.4/1.6 → 19
    assert_eq!(pts.len(), 6 * 6 * 19);
}

#[test]
fn square_cuboid_is_planar() {
    let cell = UnitCell::new(LatticeType::Square2D, 0.5).unwrap();
    let pts = cuboid(&cell, [0.0, 3.0, 0.0, 2.0, 0.0, 0.0]).unwrap();
    assert_eq!(pts.len(), 6);
    assert!(pts.iter().all(|p| p.z == 0.0));
}

#[test]
fn cuboid_too_small_is_an_error() {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 1.0).unwrap();
    assert!(cuboid(&cell, [0.0, 1.0, 0.0, 5.0, 0.0, 5.0]).is_err());
}

#[test]
fn bounding_box_of_points() {
    let b = bounding_box(&[DVec3::new(1.0, -2.0, 3.0), DVec3::new(-1.0, 4.0, 0.0)]);
    assert_eq!(b, [-1.0, 1.0, -2.0, 4.0, 0.0, 3.0]);
}

// ─── Neighbor Search Tests ───────────────────────────────────

#[test]
fn interior_simple_cubic_particle_has_eighteen_neighbors() {
    let cell = UnitCell::new(LatticeType::SimpleCubic3D, 0.5).unwrap();
    let pts = cuboid(&cell, [0.0, 3.0, 0.0, 3.0, 0.0, 3.0]).unwrap();
    let lists = NeighborSearch::new(cell.search_radius()).build(&pts).unwrap();
    // Centre of the 3×3×3 block.
    assert_eq!(lists[13].len(), 18);
    // Corner: 3 face neighbors + 3 in-plane diagonals.
    assert_eq!(lists[0].len(), 6);
}

#[test]
fn neighbor_lists_are_sorted_and_symmetric() {
    let cell = UnitCell::new(LatticeType::Square2D, 0.5).unwrap();
    let pts = cuboid(&cell, [0.0, 4.0, 0.0, 3.0, 0.0, 0.0]).unwrap();
    let lists = NeighborSearch::new(cell.search_radius()).build(&pts).unwrap();
    for (i, list) in lists.iter().enumerate() {
        assert!(list.windows(2).all(|w| w[0] < w[1]));
        for &j in list {
            assert!(lists[j].contains(&i));
        }
    }
}

#[test]
fn coincident_particles_rejected() {
    let pts = [DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0), DVec3::ZERO];
    assert!(NeighborSearch::new(1.5).build(&pts).is_err());
}
