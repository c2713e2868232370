//! # lpm-material
//!
//! Bond force models and the material library.
//!
//! ## Design
//!
//! The [`BondForceModel`] trait is the only contract the solver has
//! with materials: given a bond's current elastic length change, produce
//! its force, and given its strain, produce its damage. Models carry
//! their per-particle bookkeeping in an explicit [`MaterialState`].
//!
//! The [`MaterialLibrary`] stores named presets with isotropic elastic
//! constants and an optional critical bond strain.

pub mod brittle;
pub mod database;
pub mod elastic;
pub mod properties;
pub mod traits;

pub use brittle::BrittleBond;
pub use database::MaterialLibrary;
pub use elastic::ElasticBond;
pub use properties::{ElasticConstants, MaterialProperties};
pub use traits::{BondCoefficients, BondForceModel, BondStrain, BrittleState, MaterialState};
