//! Newton-Raphson equilibrium solver.
//!
//! Each load step applies its boundary conditions, then iterates
//!
//! `K(x) Δx = Pex − Pin(x)`, `x ← x + Δx`
//!
//! until the residual over the free dofs falls below
//! `tol · max(‖r₀‖, ‖reaction₀‖)`. If the material breaks bonds at the
//! converged state, the step is re-solved at the same load until no more
//! bonds break.

use std::time::Instant;

use lpm_math::{DVec3, LinearSolve, SolveReport};
use lpm_types::{LpmError, LpmResult, ParticleId};
use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::config::SolverConfig;
use crate::load_step::{LoadMode, LoadStep};
use crate::observer::{SolverObserver, TracingObserver};
use crate::stiffness::Stiffness;

/// Internal force `Pin` carried by one constrained dof.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub particle: ParticleId,
    pub axis: usize,
    pub force: f64,
}

/// Outcome of one converged equilibrium solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewtonReport {
    /// Newton iterations performed.
    pub iterations: u32,
    /// Residual norm before the first iteration and after each one.
    pub residual_history: Vec<f64>,
    /// `max(‖r₀‖, ‖reaction₀‖)`; the tolerance is relative to this.
    pub tolerance_scale: f64,
}

impl NewtonReport {
    pub fn final_residual(&self) -> f64 {
        self.residual_history.last().copied().unwrap_or(0.0)
    }
}

/// Outcome of one load step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadStepResult {
    /// Zero-based index of the step in the solver's history.
    pub step: usize,
    /// One report per equilibrium pass; the first is the initial solve.
    pub passes: Vec<NewtonReport>,
    /// Newton iterations over all passes.
    pub iterations: u32,
    pub final_residual: f64,
    /// Bonds broken during this step.
    pub broken_bonds: usize,
    /// `false` if bonds were still breaking when the pass limit was hit.
    pub converged: bool,
    /// Wall-clock time of the step (seconds).
    pub wall_time: f64,
}

/// Newton-Raphson solver owning the assembly it drives.
pub struct Solver {
    assembly: Assembly,
    stiffness: Stiffness,
    linear: Box<dyn LinearSolve>,
    config: SolverConfig,
    increment: Vec<f64>,
    reaction_force: Vec<Reaction>,
    observers: Vec<Box<dyn SolverObserver>>,
    step_index: usize,
}

impl Solver {
    /// Reserves the stiffness pattern and builds the configured back end.
    ///
    /// A [`TracingObserver`] is installed by default.
    pub fn new(assembly: Assembly, config: SolverConfig) -> LpmResult<Self> {
        config.validate()?;
        let stiffness = Stiffness::new(&assembly, config.stiffness_mode, config.fd_epsilon)?;
        let linear = config.linear_solver.build(&config.cg);
        let increment = vec![0.0; assembly.dofs()];

        tracing::info!(
            particles = assembly.len(),
            bonds = assembly.bond_count(),
            dofs = assembly.dofs(),
            stiffness = ?config.stiffness_mode,
            linear = linear.name(),
            "solver ready"
        );

        Ok(Self {
            assembly,
            stiffness,
            linear,
            config,
            increment,
            reaction_force: Vec::new(),
            observers: vec![Box::new(TracingObserver)],
            step_index: 0,
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn SolverObserver>) {
        self.observers.push(observer);
    }

    /// Removes every observer, including the default one.
    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    /// Replaces the linear back end.
    pub fn set_linear_solver(&mut self, linear: Box<dyn LinearSolve>) {
        self.linear = linear;
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn assembly_mut(&mut self) -> &mut Assembly {
        &mut self.assembly
    }

    pub fn into_assembly(self) -> Assembly {
        self.assembly
    }

    pub fn stiffness(&self) -> &Stiffness {
        &self.stiffness
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Reactions at the constrained dofs, from the last residual update.
    pub fn reaction_force(&self) -> &[Reaction] {
        &self.reaction_force
    }

    /// Last Newton increment, `dim` entries per particle.
    pub fn increment(&self) -> &[f64] {
        &self.increment
    }

    /// Moves constrained groups and sets their constraint flags.
    pub fn update_displacement_bc(&mut self, step: &LoadStep) {
        for bc in &step.disp_bcs {
            let k = bc.axis.index();
            for &id in &bc.group {
                let p = self.assembly.particle_mut(id);
                let current = p.xyz[k] - p.xyz_initial[k];
                let delta = match bc.mode {
                    LoadMode::Relative => bc.value,
                    LoadMode::Absolute => bc.value - current,
                };
                p.xyz[k] += delta;
                p.disp_constraint[k] = true;
            }
        }
    }

    /// Distributes each group force evenly over its particles.
    pub fn update_force_bc(&mut self, step: &LoadStep) {
        let dim = self.assembly.dim();
        for bc in &step.force_bcs {
            let mut share = DVec3::from_array(bc.force) / bc.group.len() as f64;
            if dim == 2 {
                share.z = 0.0;
            }
            for &id in &bc.group {
                let p = self.assembly.particle_mut(id);
                match bc.mode {
                    LoadMode::Relative => p.pex += share,
                    LoadMode::Absolute => p.pex = share,
                }
            }
        }
    }

    /// Writes `Pex − Pin` into the residual at free dofs and zero at
    /// constrained ones, and collects the internal forces `Pin` of the
    /// constrained dofs. Returns `(‖residual‖, ‖reaction‖)`.
    pub fn update_residual_and_reaction(&mut self) -> (f64, f64) {
        let dim = self.assembly.dim();
        let residual = self.stiffness.residual_mut();
        self.reaction_force.clear();
        for p in self.assembly.particles() {
            for k in 0..dim {
                let dof = p.id.dof(dim, k);
                if p.is_dof_constrained(k) {
                    residual[dof] = 0.0;
                    self.reaction_force.push(Reaction {
                        particle: p.id,
                        axis: k,
                        force: p.pin[k],
                    });
                } else {
                    residual[dof] = p.pex[k] - p.pin[k];
                }
            }
        }
        let residual_norm = norm(residual);
        let reaction_norm = self
            .reaction_force
            .iter()
            .map(|r| r.force * r.force)
            .sum::<f64>()
            .sqrt();
        (residual_norm, reaction_norm)
    }

    /// Solves `K Δx = r` into the increment buffer.
    pub fn solve_linear_system(&mut self) -> LpmResult<SolveReport> {
        self.increment.fill(0.0);
        let report = self.linear.solve(
            self.stiffness.matrix().csr(),
            self.stiffness.residual(),
            &mut self.increment,
        )?;
        if !report.converged {
            tracing::warn!(
                solver = self.linear.name(),
                iterations = report.iterations,
                residual = report.residual,
                "linear solve stopped before reaching its tolerance"
            );
        }
        Ok(report)
    }

    fn apply_increment(&mut self) {
        let dim = self.assembly.dim();
        for (p, du) in self
            .assembly
            .particles_mut()
            .iter_mut()
            .zip(self.increment.chunks_exact(dim))
        {
            let mut delta = DVec3::ZERO;
            for (k, &u) in du.iter().enumerate() {
                delta[k] = u;
            }
            p.move_by(delta);
        }
    }

    /// Iterates Newton-Raphson to equilibrium at the current loads.
    ///
    /// Fails with [`LpmError::SolverDivergence`] once more than
    /// `max_newton_iterations` iterations would be needed.
    pub fn newton_iteration(&mut self) -> LpmResult<NewtonReport> {
        let step = self.step_index;
        self.assembly.refresh();
        let (mut residual, reaction) = self.update_residual_and_reaction();
        let tolerance_scale = residual.max(reaction);
        let target = self.config.newton_tolerance * tolerance_scale;
        for obs in &mut self.observers {
            obs.on_newton_start(step, residual, reaction);
        }

        let mut history = vec![residual];
        let mut iterations = 0u32;
        while residual > target {
            if iterations >= self.config.max_newton_iterations {
                return Err(LpmError::SolverDivergence {
                    iterations,
                    residual,
                });
            }
            iterations += 1;

            self.stiffness.assemble(&mut self.assembly)?;
            self.solve_linear_system()?;
            self.apply_increment();
            self.assembly.refresh();
            residual = self.update_residual_and_reaction().0;
            history.push(residual);

            let ratio = residual / tolerance_scale;
            for obs in &mut self.observers {
                obs.on_iteration(step, iterations, residual, ratio);
            }
        }

        Ok(NewtonReport {
            iterations,
            residual_history: history,
            tolerance_scale,
        })
    }

    /// Applies one load step and brings the assembly to equilibrium.
    ///
    /// Constraint flags from earlier steps are cleared first; a group
    /// stays fixed only if the step constrains it again.
    pub fn solve_load_step(&mut self, step: &LoadStep) -> LpmResult<LoadStepResult> {
        let start = Instant::now();
        step.validate(self.assembly.len(), self.assembly.dim())?;
        let index = self.step_index;
        for obs in &mut self.observers {
            obs.on_load_step_begin(index);
        }

        self.assembly.clear_constraints();
        self.update_displacement_bc(step);
        self.update_force_bc(step);

        let mut passes = vec![self.newton_iteration()?];
        let mut broken_bonds = 0;
        let mut converged = true;
        for pass in 1..=self.config.max_broken_bond_passes {
            let broken = self.assembly.update_damage();
            if broken == 0 {
                break;
            }
            broken_bonds += broken;
            for obs in &mut self.observers {
                obs.on_bonds_broken(index, pass, broken);
            }
            passes.push(self.newton_iteration()?);
            if pass == self.config.max_broken_bond_passes {
                converged = false;
            }
        }
        if !converged {
            tracing::warn!(
                step = index,
                passes = self.config.max_broken_bond_passes,
                "bonds still breaking after the last re-equilibration pass"
            );
        }
        self.assembly.commit();

        let result = LoadStepResult {
            step: index,
            iterations: passes.iter().map(|p| p.iterations).sum(),
            final_residual: passes.last().map_or(0.0, NewtonReport::final_residual),
            passes,
            broken_bonds,
            converged,
            wall_time: start.elapsed().as_secs_f64(),
        };
        for obs in &mut self.observers {
            obs.on_load_step_end(index, &result);
        }
        self.step_index += 1;
        Ok(result)
    }

    /// Runs every step in order, stopping at the first failure.
    pub fn solve_problem(&mut self, steps: &[LoadStep]) -> LpmResult<Vec<LoadStepResult>> {
        steps.iter().map(|step| self.solve_load_step(step)).collect()
    }
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
