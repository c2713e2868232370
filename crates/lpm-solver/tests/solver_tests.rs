//! Integration tests for the Newton-Raphson solver and load steps.

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use lpm_material::{BondCoefficients, BondForceModel, BrittleBond, ElasticBond};
use lpm_math::DVec3;
use lpm_solver::dump::{PositionRecord, write_matrix_arrays, write_positions};
use lpm_solver::{
    Axis, LinearSolverKind, LoadMode, LoadStep, RecordingObserver, Solver, SolverConfig,
    SolverEvent, StiffnessMode,
};
use lpm_types::{LpmError, ParticleId};

use common::{aluminum, axial_spring, cube, face, square, two_particles};

const RADIUS: f64 = 0.8;
const LOAD: f64 = 2000.0;

fn tight(stiffness_mode: StiffnessMode, linear_solver: LinearSolverKind) -> SolverConfig {
    SolverConfig {
        stiffness_mode,
        linear_solver,
        newton_tolerance: 1e-9,
        ..SolverConfig::default()
    }
}

/// Top face fixed, bottom face pushed up with a total force of `LOAD`.
fn compression_step(solver: &Solver) -> LoadStep {
    let assembly = solver.assembly();
    let top = face(assembly, 2, 5.0 * RADIUS);
    let bottom = face(assembly, 2, RADIUS);
    assert_eq!(top.len(), 9);
    assert_eq!(bottom.len(), 9);
    LoadStep::new()
        .fix(&top, 3)
        .push(&bottom, LoadMode::Relative, [0.0, 0.0, LOAD])
}

fn displacements(solver: &Solver) -> Vec<DVec3> {
    solver
        .assembly()
        .particles()
        .iter()
        .map(|p| p.xyz - p.xyz_initial)
        .collect()
}

fn assert_same_field(a: &[DVec3], b: &[DVec3], tol: f64) {
    for (u, v) in a.iter().zip(b) {
        assert!((*u - *v).length() < tol, "{u:?} vs {v:?}");
    }
}

fn cube_solution(config: SolverConfig) -> Vec<DVec3> {
    let mut solver = Solver::new(cube(3, RADIUS, aluminum()), config).unwrap();
    let step = compression_step(&solver);
    solver.solve_load_step(&step).unwrap();
    displacements(&solver)
}

// ─── Two-Particle Tests ──────────────────────────────────────

#[test]
fn single_spring_conjugate_gradient() {
    let kn = 250.0;
    let force = 5.0;
    let config = SolverConfig {
        linear_solver: LinearSolverKind::ConjugateGradient,
        ..SolverConfig::default()
    };
    let mut solver = Solver::new(two_particles(axial_spring(kn)), config).unwrap();
    let step = LoadStep::new()
        .fix(&[ParticleId(0)], 3)
        .push(&[ParticleId(1)], LoadMode::Relative, [force, 0.0, 0.0]);

    let result = solver.solve_load_step(&step).unwrap();
    assert_eq!(result.iterations, 1);
    assert!(result.converged);
    let u = displacements(&solver)[1];
    assert_relative_eq!(u.x, force / kn, max_relative = 1e-10);
    assert!(u.y.abs() < 1e-14 && u.z.abs() < 1e-14);
}

#[test]
fn single_spring_direct() {
    let kn = 250.0;
    let force = -3.0;
    let mut solver = Solver::new(two_particles(axial_spring(kn)), SolverConfig::default()).unwrap();
    let step = LoadStep::new()
        .fix(&[ParticleId(0)], 3)
        .displace(&[ParticleId(1)], Axis::Y, LoadMode::Relative, 0.0)
        .displace(&[ParticleId(1)], Axis::Z, LoadMode::Relative, 0.0)
        .push(&[ParticleId(1)], LoadMode::Absolute, [force, 0.0, 0.0]);

    let result = solver.solve_load_step(&step).unwrap();
    assert_eq!(result.iterations, 1);
    assert_relative_eq!(displacements(&solver)[1].x, force / kn, max_relative = 1e-10);

    // Support reaction balances the applied load.
    let rx: f64 = solver
        .reaction_force()
        .iter()
        .filter(|r| r.axis == 0)
        .map(|r| r.force)
        .sum();
    assert_relative_eq!(rx, -force, max_relative = 1e-8);
}

#[test]
fn prescribed_stretch_needs_no_iteration() {
    let mut solver = Solver::new(two_particles(axial_spring(100.0)), SolverConfig::default()).unwrap();
    let step = LoadStep::new()
        .fix(&[ParticleId(0)], 3)
        .fix(&[ParticleId(1)], 3)
        .displace(&[ParticleId(1)], Axis::X, LoadMode::Relative, 0.01);

    let result = solver.solve_load_step(&step).unwrap();
    assert_eq!(result.iterations, 0);
    let reaction = solver
        .reaction_force()
        .iter()
        .find(|r| r.particle == ParticleId(1) && r.axis == 0)
        .unwrap();
    assert_relative_eq!(reaction.force, 1.0, max_relative = 1e-9);
}

#[test]
fn reaction_ignores_force_on_constrained_dof() {
    let mut solver = Solver::new(two_particles(axial_spring(100.0)), SolverConfig::default()).unwrap();
    let step = LoadStep::new()
        .fix(&[ParticleId(0)], 3)
        .fix(&[ParticleId(1)], 3)
        .displace(&[ParticleId(1)], Axis::X, LoadMode::Relative, 0.01)
        .push(&[ParticleId(1)], LoadMode::Relative, [7.0, 0.0, 0.0]);

    let result = solver.solve_load_step(&step).unwrap();
    assert_eq!(result.iterations, 0);
    assert_eq!(solver.assembly().particle(ParticleId(1)).pex.x, 7.0);

    let reaction = solver
        .reaction_force()
        .iter()
        .find(|r| r.particle == ParticleId(1) && r.axis == 0)
        .unwrap();
    assert_relative_eq!(reaction.force, 1.0, max_relative = 1e-9);
    assert_relative_eq!(
        result.passes[0].tolerance_scale,
        2.0f64.sqrt(),
        max_relative = 1e-9
    );
}

#[test]
fn brittle_pair_breaks_under_prescribed_stretch() {
    let elastic = ElasticBond::from_coefficients(BondCoefficients {
        kn: [100.0, 100.0],
        tv: 0.0,
    });
    let model: Arc<dyn BondForceModel> = Arc::new(BrittleBond::new(elastic, 1.0e-3).unwrap());
    let mut solver = Solver::new(two_particles(model), SolverConfig::default()).unwrap();
    let step = LoadStep::new()
        .fix(&[ParticleId(0)], 3)
        .fix(&[ParticleId(1)], 3)
        .displace(&[ParticleId(1)], Axis::X, LoadMode::Relative, 0.01);

    let result = solver.solve_load_step(&step).unwrap();
    assert_eq!(result.broken_bonds, 2);
    assert_eq!(result.passes.len(), 2);
    assert!(result.converged);
    assert!(solver.reaction_force().iter().all(|r| r.force == 0.0));
}

// ─── Cube Tests ──────────────────────────────────────────────

#[test]
fn cube_compression_converges_monotonically() {
    let mut solver = Solver::new(cube(3, RADIUS, aluminum()), SolverConfig::default()).unwrap();
    let step = compression_step(&solver);
    let result = solver.solve_load_step(&step).unwrap();

    assert!(result.converged);
    assert!(result.iterations >= 1);
    let history = &result.passes[0].residual_history;
    assert_eq!(history.len(), result.iterations as usize + 1);
    assert!(history.windows(2).all(|w| w[1] < w[0]), "{history:?}");
    assert!(result.final_residual <= 1e-5 * result.passes[0].tolerance_scale);

    // The loaded face moves toward the fixed one.
    let u = displacements(&solver);
    assert!(u[4].z > 0.0);
    assert!(u[22].length() < 1e-14);
}

#[test]
fn reactions_balance_applied_load() {
    let mut solver = Solver::new(
        cube(3, RADIUS, aluminum()),
        tight(StiffnessMode::Analytical, LinearSolverKind::Direct),
    )
    .unwrap();
    let step = compression_step(&solver);
    solver.solve_load_step(&step).unwrap();

    let mut total = [0.0; 3];
    for r in solver.reaction_force() {
        total[r.axis] += r.force;
    }
    assert_eq!(solver.reaction_force().len(), 27);
    assert_relative_eq!(total[2], -LOAD, max_relative = 1e-6);
    assert!(total[0].abs() < 1e-6 * LOAD);
    assert!(total[1].abs() < 1e-6 * LOAD);
}

#[test]
fn tangent_modes_reach_same_equilibrium() {
    let exact = cube_solution(tight(StiffnessMode::Analytical, LinearSolverKind::Direct));
    let approx = cube_solution(tight(StiffnessMode::FiniteDifference, LinearSolverKind::Direct));
    assert_same_field(&exact, &approx, 1e-7);
}

#[test]
fn linear_back_ends_reach_same_equilibrium() {
    let direct = cube_solution(tight(StiffnessMode::Analytical, LinearSolverKind::Direct));
    let cg = cube_solution(tight(StiffnessMode::Analytical, LinearSolverKind::ConjugateGradient));
    assert_same_field(&direct, &cg, 1e-7);
}

#[test]
fn loading_in_two_steps_matches_one_step() {
    let config = tight(StiffnessMode::Analytical, LinearSolverKind::Direct);
    let once = cube_solution(config.clone());

    let mut solver = Solver::new(cube(3, RADIUS, aluminum()), config).unwrap();
    let top = face(solver.assembly(), 2, 5.0 * RADIUS);
    let bottom = face(solver.assembly(), 2, RADIUS);
    let half = LoadStep::new()
        .fix(&top, 3)
        .push(&bottom, LoadMode::Relative, [0.0, 0.0, 0.5 * LOAD]);
    let results = solver.solve_problem(&[half.clone(), half]).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].step, 1);

    assert_same_field(&once, &displacements(&solver), 1e-7);
}

#[test]
fn absolute_displacement_is_idempotent() {
    let config = tight(StiffnessMode::Analytical, LinearSolverKind::Direct);
    let mut solver = Solver::new(cube(3, RADIUS, aluminum()), config).unwrap();
    let top = face(solver.assembly(), 2, 5.0 * RADIUS);
    let bottom = face(solver.assembly(), 2, RADIUS);
    let step = LoadStep::new()
        .fix(&bottom, 3)
        .displace(&top, Axis::Z, LoadMode::Absolute, -0.01);

    solver.solve_load_step(&step).unwrap();
    let first = displacements(&solver);
    solver.solve_load_step(&step).unwrap();
    assert_same_field(&first, &displacements(&solver), 1e-8);
    for &id in &top {
        assert_relative_eq!(first[id.index()].z, -0.01, epsilon = 1e-12);
    }
}

#[test]
fn square_plate_tension_with_finite_difference() {
    let assembly = square(4, 0.5);
    let mut solver = Solver::new(assembly, SolverConfig::reference()).unwrap();
    let left = face(solver.assembly(), 0, 0.5);
    let right = face(solver.assembly(), 0, 3.5);
    let step = LoadStep::new()
        .fix(&left, 2)
        .push(&right, LoadMode::Relative, [4.0, 0.0, 9.0]);

    let result = solver.solve_load_step(&step).unwrap();
    assert!(result.converged);
    let u = displacements(&solver);
    assert!(right.iter().all(|id| u[id.index()].x > 0.0));
    assert!(u.iter().all(|d| d.z == 0.0));
}

// ─── Failure Tests ───────────────────────────────────────────

#[test]
fn exhausted_iterations_report_divergence() {
    let config = SolverConfig {
        max_newton_iterations: 0,
        ..SolverConfig::default()
    };
    let mut solver = Solver::new(cube(3, RADIUS, aluminum()), config).unwrap();
    let step = compression_step(&solver);
    match solver.solve_load_step(&step) {
        Err(LpmError::SolverDivergence {
            iterations,
            residual,
        }) => {
            assert_eq!(iterations, 0);
            assert!(residual > 0.0);
        }
        other => panic!("expected divergence, got {other:?}"),
    }
}

#[test]
fn invalid_load_step_is_rejected() {
    let mut solver = Solver::new(two_particles(axial_spring(1.0)), SolverConfig::default()).unwrap();
    let step = LoadStep::new().push(&[ParticleId(7)], LoadMode::Relative, [1.0, 0.0, 0.0]);
    assert!(matches!(
        solver.solve_load_step(&step),
        Err(LpmError::InvalidBoundaryCondition(_))
    ));
}

#[test]
fn analytical_two_dimensional_solver_is_unsupported() {
    assert!(matches!(
        Solver::new(square(3, 0.5), SolverConfig::default()),
        Err(LpmError::Unsupported(_))
    ));
}

// ─── Config and Observer Tests ───────────────────────────────

#[test]
fn solver_config_round_trips_through_toml() {
    let config = SolverConfig {
        stiffness_mode: StiffnessMode::FiniteDifference,
        linear_solver: LinearSolverKind::ConjugateGradient,
        max_newton_iterations: 12,
        ..SolverConfig::default()
    };
    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("finite_difference"));
    let back: SolverConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);

    let partial: SolverConfig = toml::from_str("newton_tolerance = 1e-7").unwrap();
    assert_eq!(partial.newton_tolerance, 1e-7);
    assert_eq!(partial.stiffness_mode, StiffnessMode::Analytical);
}

#[test]
fn invalid_config_is_rejected() {
    let config = SolverConfig {
        newton_tolerance: 0.0,
        ..SolverConfig::default()
    };
    assert!(matches!(config.validate(), Err(LpmError::InvalidConfig(_))));
    assert!(Solver::new(two_particles(axial_spring(1.0)), config).is_err());
}

#[test]
fn recording_observer_sees_every_stage() {
    let mut solver = Solver::new(cube(3, RADIUS, aluminum()), SolverConfig::default()).unwrap();
    let recorder = RecordingObserver::new();
    solver.clear_observers();
    solver.add_observer(Box::new(recorder.clone()));

    let step = compression_step(&solver);
    let result = solver.solve_load_step(&step).unwrap();
    let events = recorder.events();

    assert_eq!(events.first(), Some(&SolverEvent::LoadStepBegin { step: 0 }));
    assert!(matches!(events[1], SolverEvent::NewtonStart { step: 0, .. }));
    let starts = events
        .iter()
        .filter(|e| matches!(e, SolverEvent::NewtonStart { .. }))
        .count();
    assert_eq!(starts, result.passes.len());
    let iterations = events
        .iter()
        .filter(|e| matches!(e, SolverEvent::Iteration { .. }))
        .count();
    assert_eq!(iterations, result.iterations as usize);
    assert_eq!(
        events.last(),
        Some(&SolverEvent::LoadStepEnd {
            step: 0,
            iterations: result.iterations,
            converged: true,
        })
    );
}

// ─── Dump Tests ──────────────────────────────────────────────

#[test]
fn matrix_and_position_dumps() {
    let mut solver = Solver::new(cube(3, RADIUS, aluminum()), SolverConfig::default()).unwrap();
    let step = compression_step(&solver);
    solver.solve_load_step(&step).unwrap();

    let dir = std::env::temp_dir().join(format!("lpm-dump-{}", std::process::id()));
    write_matrix_arrays(&dir, solver.stiffness()).unwrap();

    let pointer = std::fs::read_to_string(dir.join("matrix_K_pointer.txt")).unwrap();
    let lines: Vec<&str> = pointer.lines().collect();
    assert_eq!(lines.len(), 28);
    assert_eq!(lines[0], " 0");

    let values = std::fs::read_to_string(dir.join("matrix_K_global.txt")).unwrap();
    assert_eq!(values.lines().count(), solver.stiffness().matrix().values().len());
    assert!(values.lines().all(|l| l.starts_with(' ') && l.contains('e')));

    let ik = std::fs::read_to_string(dir.join("matrix_IK.txt")).unwrap();
    assert_eq!(ik.lines().count(), 82);

    let path = dir.join("positions.json");
    write_positions(&path, solver.assembly()).unwrap();
    let records: Vec<PositionRecord> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(records.len(), 27);
    assert_eq!(records[13].id, ParticleId(13));

    std::fs::remove_dir_all(&dir).unwrap();
}
