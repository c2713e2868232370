//! Strongly-typed identifiers for solver entities.
//!
//! A particle id doubles as its index into the assembly arena and as
//! its block index in the global stiffness matrix, so the newtype keeps
//! it from being mixed up with bond ids or raw dof indices.

use serde::{Deserialize, Serialize};

/// Index into the particle arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

/// Ascending bond identifier handed out by the owning assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BondId(pub u32);

impl ParticleId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Index of this particle's dof `axis` in the global dof vector.
    #[inline]
    pub fn dof(self, dim: usize, axis: usize) -> usize {
        self.index() * dim + axis
    }
}

impl BondId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ParticleId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<usize> for ParticleId {
    fn from(val: usize) -> Self {
        Self(val as u32)
    }
}

impl From<u32> for BondId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}
