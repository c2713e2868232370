//! Solver progress observers.
//!
//! The Newton driver reports its progress through [`SolverObserver`]
//! hooks. Observers are registered once on the [`Solver`](crate::Solver)
//! and called synchronously, in registration order, from the solving
//! thread.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::solver::LoadStepResult;

/// Trait for consumers of solver progress.
///
/// Every hook has an empty default so implementations only override
/// what they need.
pub trait SolverObserver: Send {
    /// Returns a human-readable name for this observer.
    fn name(&self) -> &str;

    fn on_load_step_begin(&mut self, _step: usize) {}

    /// Residual and reaction norms before the first Newton iteration.
    fn on_newton_start(&mut self, _step: usize, _residual: f64, _reaction: f64) {}

    /// One Newton iteration finished. `ratio` is the residual norm over
    /// the tolerance scale.
    fn on_iteration(&mut self, _step: usize, _iteration: u32, _residual: f64, _ratio: f64) {}

    /// Bonds broke after an equilibrium pass; the step is re-solved.
    fn on_bonds_broken(&mut self, _step: usize, _pass: u32, _count: usize) {}

    fn on_load_step_end(&mut self, _step: usize, _result: &LoadStepResult) {}
}

/// Forwards progress to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SolverObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    fn on_load_step_begin(&mut self, step: usize) {
        tracing::info!(step, "load step started");
    }

    fn on_newton_start(&mut self, step: usize, residual: f64, reaction: f64) {
        let scale_from = if residual >= reaction { "residual" } else { "reaction" };
        tracing::info!(step, residual, reaction, scale_from, "newton iteration started");
    }

    fn on_iteration(&mut self, step: usize, iteration: u32, residual: f64, ratio: f64) {
        tracing::info!(step, iteration, residual, ratio, "newton iteration");
    }

    fn on_bonds_broken(&mut self, step: usize, pass: u32, count: usize) {
        tracing::info!(step, pass, count, "bonds broken, re-solving");
    }

    fn on_load_step_end(&mut self, step: usize, result: &LoadStepResult) {
        tracing::info!(
            step,
            iterations = result.iterations,
            residual = result.final_residual,
            broken = result.broken_bonds,
            wall_ms = result.wall_time * 1e3,
            "load step finished"
        );
    }
}

/// One recorded observer call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolverEvent {
    LoadStepBegin {
        step: usize,
    },
    NewtonStart {
        step: usize,
        residual: f64,
        reaction: f64,
    },
    Iteration {
        step: usize,
        iteration: u32,
        residual: f64,
        ratio: f64,
    },
    BondsBroken {
        step: usize,
        pass: u32,
        count: usize,
    },
    LoadStepEnd {
        step: usize,
        iterations: u32,
        converged: bool,
    },
}

/// Keeps every event in memory. Clones share the same log, so a clone
/// can be handed to the solver and the original inspected afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<SolverEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<SolverEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: SolverEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl SolverObserver for RecordingObserver {
    fn name(&self) -> &str {
        "recording"
    }

    fn on_load_step_begin(&mut self, step: usize) {
        self.push(SolverEvent::LoadStepBegin { step });
    }

    fn on_newton_start(&mut self, step: usize, residual: f64, reaction: f64) {
        self.push(SolverEvent::NewtonStart {
            step,
            residual,
            reaction,
        });
    }

    fn on_iteration(&mut self, step: usize, iteration: u32, residual: f64, ratio: f64) {
        self.push(SolverEvent::Iteration {
            step,
            iteration,
            residual,
            ratio,
        });
    }

    fn on_bonds_broken(&mut self, step: usize, pass: u32, count: usize) {
        self.push(SolverEvent::BondsBroken { step, pass, count });
    }

    fn on_load_step_end(&mut self, step: usize, result: &LoadStepResult) {
        self.push(SolverEvent::LoadStepEnd {
            step,
            iterations: result.iterations,
            converged: result.converged,
        });
    }
}
