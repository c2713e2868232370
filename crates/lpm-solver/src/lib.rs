//! # lpm-solver
//!
//! Nonlinear static equilibrium of a lattice particle assembly.
//!
//! ## Key Types
//!
//! - [`Bond`]: directed pairwise interaction with geometric and force state
//! - [`Particle`]: owns its bonds, grouped by neighbor layer
//! - [`Assembly`]: particle arena; bulk geometry/force refresh
//! - [`Stiffness`]: sparse tangent assembly (analytical or finite difference)
//!   and displacement-BC row/column modification
//! - [`Solver`]: Newton-Raphson driver with interchangeable linear back ends
//! - [`LoadStep`]: displacement and force boundary conditions of one step

pub mod assembly;
pub mod bond;
pub mod config;
pub mod dump;
pub mod load_step;
pub mod observer;
pub mod particle;
pub mod solver;
pub mod stiffness;

pub use assembly::Assembly;
pub use bond::Bond;
pub use config::{LinearSolverKind, SolverConfig, StiffnessMode};
pub use load_step::{Axis, DispBC, ForceBC, LoadMode, LoadStep};
pub use observer::{RecordingObserver, SolverEvent, SolverObserver, TracingObserver};
pub use particle::{Particle, von_mises};
pub use solver::{LoadStepResult, NewtonReport, Reaction, Solver};
pub use stiffness::Stiffness;
