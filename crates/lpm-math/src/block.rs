//! 3×3 block helpers for tangent-stiffness kernels.
//!
//! Blocks are indexed `(row, col)` with `row` the force component and
//! `col` the displacement component, i.e. `m.col(col)[row]`.

use glam::{DMat3, DVec3};

/// Outer product `a ⊗ b`, entry `(r, s) = a[r] · b[s]`.
#[inline]
pub fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Projector onto the plane orthogonal to the unit vector `n`.
#[inline]
pub fn projector(n: DVec3) -> DMat3 {
    DMat3::IDENTITY - outer(n, n)
}

/// Entry `(row, col)` of a block.
#[inline]
pub fn entry(m: &DMat3, row: usize, col: usize) -> f64 {
    m.col(col)[row]
}

/// Largest absolute entry of the leading `dim × dim` sub-block.
pub fn max_abs(m: &DMat3, dim: usize) -> f64 {
    let mut max = 0.0f64;
    for r in 0..dim {
        for s in 0..dim {
            max = max.max(entry(m, r, s).abs());
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_product_layout() {
        let m = outer(DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 5.0, 6.0));
        assert_eq!(entry(&m, 0, 1), 5.0);
        assert_eq!(entry(&m, 2, 0), 12.0);
    }

    #[test]
    fn projector_annihilates_direction() {
        let n = DVec3::new(1.0, 1.0, 0.0).normalize();
        let p = projector(n);
        assert!((p * n).length() < 1e-15);
    }
}
