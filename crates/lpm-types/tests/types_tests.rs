//! Integration tests for lpm-types.

use lpm_types::constants::{DEFAULT_NEWTON_TOLERANCE, LAYER_CUTOFF_FACTOR};
use lpm_types::{BondId, LpmError, ParticleId};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn particle_id_index() {
    let id = ParticleId(42);
    assert_eq!(id.index(), 42);
}

#[test]
fn particle_id_dof_layout() {
    let id = ParticleId(5);
    assert_eq!(id.dof(3, 0), 15);
    assert_eq!(id.dof(3, 2), 17);
    assert_eq!(id.dof(2, 1), 11);
}

#[test]
fn ids_order_by_value() {
    assert!(ParticleId(1) < ParticleId(2));
    assert!(BondId(10) > BondId(3));
}

#[test]
fn ids_are_serializable() {
    let id = ParticleId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: ParticleId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

#[test]
fn particle_id_display() {
    assert_eq!(ParticleId(7).to_string(), "p7");
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = LpmError::InvalidTopology("particle 3 missing from connection list of 1".into());
    assert!(err.to_string().contains("missing from connection list"));
}

#[test]
fn divergence_error_reports_iterations() {
    let err = LpmError::SolverDivergence {
        iterations: 31,
        residual: 1.5e-2,
    };
    let msg = err.to_string();
    assert!(msg.contains("31"));
    assert!(msg.contains("1.50e-2"));
}

#[test]
fn linear_solver_error_carries_status() {
    let err = LpmError::LinearSolver {
        solver: "cg".into(),
        status: -2,
        message: "breakdown".into(),
    };
    assert!(err.to_string().contains("status -2"));
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: LpmError = io.into();
    assert!(matches!(err, LpmError::Io(_)));
}

// ─── Constant Tests ───────────────────────────────────────────

#[test]
fn defaults_are_sane() {
    assert!(LAYER_CUTOFF_FACTOR > 1.0);
    assert!(DEFAULT_NEWTON_TOLERANCE > 0.0 && DEFAULT_NEWTON_TOLERANCE < 1.0);
}
