//! Service classes (duty categories)
//!
//! A service class selects which allowable stress factor of a material
//! applies. The one class whose stress factor key is [`SEVERE_STRESS_KEY`]
//! also switches on the Bergsträsser correction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fallback;

/// Stress factor key of the severe (fast dynamic) duty class
pub const SEVERE_STRESS_KEY: &str = "severe_dynamic";

/// A duty category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClass {
    /// Table key (e.g., "MEDIUM_DYNAMIC")
    pub key: String,
    /// Key into the material's stress limits
    pub stress_factor_key: String,
    /// Apply the Bergsträsser correction
    pub severe: bool,
    #[serde(default)]
    pub description: String,
}

impl ServiceClass {
    pub fn new(key: impl Into<String>, stress_factor_key: impl Into<String>, description: impl Into<String>) -> Self {
        let stress_factor_key = stress_factor_key.into();
        ServiceClass {
            key: key.into(),
            severe: stress_factor_key == SEVERE_STRESS_KEY,
            stress_factor_key,
            description: description.into(),
        }
    }

    /// Class used when a key is not in the table
    pub fn fallback(key: &str) -> Self {
        ServiceClass::new(key, fallback::STRESS_FACTOR_KEY, "")
    }
}

/// Service classes keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTable(BTreeMap<String, ServiceClass>);

impl ServiceTable {
    pub fn new() -> Self {
        ServiceTable(BTreeMap::new())
    }

    pub fn insert(&mut self, class: ServiceClass) {
        self.0.insert(class.key.clone(), class);
    }

    pub fn get(&self, key: &str) -> Option<&ServiceClass> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceClass> {
        self.0.values()
    }

    /// Number of classes flagged severe; a well-formed table has exactly one
    pub fn severe_count(&self) -> usize {
        self.0.values().filter(|c| c.severe).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
