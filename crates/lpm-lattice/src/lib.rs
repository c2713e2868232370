//! # lpm-lattice
//!
//! Lattice descriptions for the LPM solver.
//!
//! - [`UnitCell`]: lattice type, particle radius, neighbor shells and the
//!   mapping from elastic constants to bond coefficients
//! - [`generators`]: regular particle arrangements inside a box
//! - [`neighbors`]: spatial-hash neighbor search

pub mod generators;
pub mod neighbors;
pub mod unit_cell;

pub use neighbors::NeighborSearch;
pub use unit_cell::{LatticeType, UnitCell};
