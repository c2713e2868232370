//! Numerical constants and solver defaults.

/// Tolerance for "damage has reached one" and similar scalar comparisons.
pub const EPS: f64 = 1.0e-6;

/// Bonds are assigned to a neighbor layer when their length falls below
/// this multiple of the layer's cutoff radius.
pub const LAYER_CUTOFF_FACTOR: f64 = 1.01;

/// Maximum number of neighbor layers a unit cell can describe.
pub const MAX_LAYERS: usize = 2;

/// Default finite-difference perturbation, as a fraction of particle radius.
pub const DEFAULT_FD_EPSILON: f64 = 1.0e-6;

/// Default Newton-Raphson iteration cap per load step.
pub const DEFAULT_MAX_NEWTON_ITERATIONS: u32 = 30;

/// Default relative Newton-Raphson tolerance.
pub const DEFAULT_NEWTON_TOLERANCE: f64 = 1.0e-5;

/// Default relative and absolute tolerance of the conjugate-gradient back end.
pub const DEFAULT_CG_TOLERANCE: f64 = 1.0e-12;

/// Default iteration cap of the conjugate-gradient back end.
pub const DEFAULT_CG_MAX_ITERATIONS: usize = 10_000;

/// Distance below which two particles are considered coincident.
pub const COINCIDENT_DISTANCE: f64 = 1.0e-12;
