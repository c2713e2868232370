//! CLI command implementations.

use std::path::Path;

use lpm_cli::{ConsoleObserver, Scenario};
use lpm_solver::dump::{write_matrix_arrays, write_positions};
use lpm_solver::{Solver, SolverConfig};

/// Run a scenario from file.
pub fn simulate(
    config_path: &str,
    dump_matrix: Option<&str>,
    positions: Option<&str>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("LPM Simulation");
    println!("──────────────");
    println!("Config: {config_path}");

    let scenario = Scenario::load(Path::new(config_path))?;
    let problem = scenario.build()?;
    println!("Scenario:   {}", scenario.name);
    println!("Particles:  {}", problem.assembly.len());
    println!("Bonds:      {}", problem.assembly.bond_count());
    println!("Steps:      {}", problem.steps.len());
    println!(
        "Solver:     {:?} stiffness, {:?} linear solve",
        problem.config.stiffness_mode, problem.config.linear_solver
    );
    println!();

    let mut solver = Solver::new(problem.assembly, problem.config)?;
    solver.add_observer(Box::new(ConsoleObserver::new(verbose)));
    let results = solver.solve_problem(&problem.steps)?;

    let iterations: u32 = results.iter().map(|r| r.iterations).sum();
    let wall: f64 = results.iter().map(|r| r.wall_time).sum();
    let max_disp = solver
        .assembly()
        .particles()
        .iter()
        .map(|p| (p.xyz - p.xyz_initial).length())
        .fold(0.0f64, f64::max);
    println!();
    println!("Newton iterations: {iterations}");
    println!("Solve time:        {wall:.3}s");
    println!("Max displacement:  {max_disp:.6e}");

    if let Some(dir) = dump_matrix {
        write_matrix_arrays(Path::new(dir), solver.stiffness())?;
        println!("Stiffness arrays written to: {dir}");
    }
    if let Some(path) = positions {
        write_positions(Path::new(path), solver.assembly())?;
        println!("Positions written to: {path}");
    }
    Ok(())
}

/// Validate a scenario, or a bare solver config.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("LPM Validator");
    println!("─────────────");
    println!();

    let text = std::fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&text)?;
    if table.contains_key("lattice") {
        let scenario = Scenario::from_toml(&text)?;
        let problem = scenario.build()?;
        println!("Scenario '{}' is valid.", scenario.name);
        println!("  Particles:  {}", problem.assembly.len());
        println!("  Dofs:       {}", problem.assembly.dofs());
        println!("  Load steps: {}", problem.steps.len());
    } else {
        let config: SolverConfig = toml::from_str(&text)?;
        config.validate()?;
        println!("Solver config is valid.");
        println!("  Stiffness:      {:?}", config.stiffness_mode);
        println!("  Linear solver:  {:?}", config.linear_solver);
        println!("  Max iterations: {}", config.max_newton_iterations);
        println!("  Tolerance:      {:e}", config.newton_tolerance);
    }
    Ok(())
}

/// Print the built-in example scenario as TOML.
pub fn example() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", Scenario::example().to_toml()?);
    Ok(())
}
