//! Error types for the LPM solver.
//!
//! All crates return `LpmResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the LPM solver.
#[derive(Debug, Error)]
pub enum LpmError {
    /// Unit cell or lattice geometry is malformed.
    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    /// Neighbor or connection lists are inconsistent.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Material parameter is out of valid range.
    #[error("Invalid material parameter: {0}")]
    InvalidMaterial(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A load step references particles or axes that do not exist.
    #[error("Invalid boundary condition: {0}")]
    InvalidBoundaryCondition(String),

    /// The requested combination of options has no implementation.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Newton-Raphson iteration exceeded its cap.
    #[error("Solver did not converge after {iterations} iterations (residual: {residual:.2e})")]
    SolverDivergence {
        iterations: u32,
        residual: f64,
    },

    /// A linear-solve back end reported a failure.
    #[error("Linear solver '{solver}' failed with status {status}: {message}")]
    LinearSolver {
        solver: String,
        status: i32,
        message: String,
    },
}

/// Convenience alias for `Result<T, LpmError>`.
pub type LpmResult<T> = Result<T, LpmError>;
