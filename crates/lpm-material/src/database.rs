//! Material library with common engineering presets.
//!
//! Moduli are in MPa, so lengths in mm give forces in N.

use std::collections::HashMap;

use crate::properties::MaterialProperties;

/// A named collection of material presets.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    materials: HashMap<String, MaterialProperties>,
}

impl MaterialLibrary {
    /// Creates a library with the built-in presets.
    pub fn with_defaults() -> Self {
        let mut lib = Self::empty();
        lib.register(preset("aluminum", 69.0e3, 0.3, None));
        lib.register(preset("steel", 200.0e3, 0.3, None));
        lib.register(preset("titanium", 110.0e3, 0.34, None));
        lib.register(preset("copper", 117.0e3, 0.34, None));
        lib.register(preset("glass", 70.0e3, 0.22, Some(1.0e-3)));
        lib
    }

    pub fn empty() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    /// Registers a material. Overwrites if the name already exists.
    pub fn register(&mut self, props: MaterialProperties) {
        self.materials.insert(props.name.clone(), props);
    }

    pub fn get(&self, name: &str) -> Option<&MaterialProperties> {
        self.materials.get(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn preset(name: &str, e: f64, nu: f64, critical: Option<f64>) -> MaterialProperties {
    MaterialProperties {
        name: name.into(),
        youngs_modulus: e,
        poisson_ratio: nu,
        critical_bond_strain: critical,
    }
}
