//! # lpm-types
//!
//! Shared identifiers, error types, and numerical constants for the
//! lattice particle method (LPM) solver.
//!
//! This crate has no domain logic. It defines the vocabulary that
//! every other LPM crate speaks.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{LpmError, LpmResult};
pub use ids::{BondId, ParticleId};
