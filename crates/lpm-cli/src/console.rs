//! Console progress output for the `simulate` command.

use lpm_solver::{LoadStepResult, SolverObserver};

/// Prints one line per solver stage to stdout.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    /// Also print every Newton iteration.
    pub verbose: bool,
}

impl ConsoleObserver {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl SolverObserver for ConsoleObserver {
    fn name(&self) -> &str {
        "console"
    }

    fn on_load_step_begin(&mut self, step: usize) {
        println!("Load step {step}");
    }

    fn on_newton_start(&mut self, _step: usize, residual: f64, reaction: f64) {
        println!("  residual {residual:.4e}, reaction {reaction:.4e}");
    }

    fn on_iteration(&mut self, _step: usize, iteration: u32, residual: f64, ratio: f64) {
        if self.verbose {
            println!("  iter {iteration:>3}  residual {residual:.4e}  ratio {ratio:.3e}");
        }
    }

    fn on_bonds_broken(&mut self, _step: usize, pass: u32, count: usize) {
        println!("  pass {pass}: {count} bonds broken, re-solving");
    }

    fn on_load_step_end(&mut self, _step: usize, result: &LoadStepResult) {
        println!(
            "  done: {} iterations, residual {:.4e}, {} broken bonds, {:.3}s",
            result.iterations, result.final_residual, result.broken_bonds, result.wall_time
        );
        if !result.converged {
            println!("  warning: bonds were still breaking at the pass limit");
        }
    }
}
