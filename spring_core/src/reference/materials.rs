//! Spring wire materials
//!
//! Each material carries its shear modulus, a tensile strength table keyed by
//! wire diameter range, and allowable stress factors per service class.
//! Display metadata (code, corrosion behaviour, treatments) rides along for
//! hosts that show a material picker; the engine ignores it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row of the tensile strength table: `d_min ≤ d < d_max → Rm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RmRow {
    /// Lower diameter bound, inclusive (mm)
    pub d_min_mm: f64,
    /// Upper diameter bound, exclusive (mm)
    pub d_max_mm: f64,
    /// Tensile strength Rm (daN/mm²)
    pub rm_dan_mm2: f64,
}

impl RmRow {
    /// True if `d_mm` falls inside this row's half-open range
    pub fn contains(&self, d_mm: f64) -> bool {
        self.d_min_mm <= d_mm && d_mm < self.d_max_mm
    }
}

/// Display-only information about a material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub description: String,
    /// Standard designation (e.g., "EN 10270-1 DH")
    pub code: String,
    pub corrosion_resistance: Option<String>,
    pub max_temperature_c: Option<f64>,
    #[serde(default)]
    pub treatments: Vec<String>,
}

/// A spring material as used by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Table key (e.g., "PIANO_WIRE")
    pub key: String,

    /// Shear modulus G (daN/mm²)
    pub shear_modulus_dan_mm2: f64,

    /// Tensile strength rows, ascending by diameter
    pub rm_table: Vec<RmRow>,

    /// Allowable stress factor by stress factor key (fraction of Rm)
    pub stress_factors: BTreeMap<String, f64>,

    /// Set-to-solid stress factor, if the table provides one
    pub set_solid_factor: Option<f64>,

    pub info: MaterialInfo,
}

impl MaterialSpec {
    /// Tensile strength at wire diameter `d_mm`.
    ///
    /// Uses the row whose range contains `d_mm`; any diameter outside every
    /// row (above the table, or below it) takes the last row. Returns `None`
    /// only for an empty table.
    pub fn tensile_strength(&self, d_mm: f64) -> Option<f64> {
        self.rm_table
            .iter()
            .find(|row| row.contains(d_mm))
            .or_else(|| self.rm_table.last())
            .map(|row| row.rm_dan_mm2)
    }

    /// Allowable stress factor for a stress factor key
    pub fn stress_factor(&self, stress_key: &str) -> Option<f64> {
        self.stress_factors.get(stress_key).copied()
    }
}

/// Materials keyed by name, in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTable(BTreeMap<String, MaterialSpec>);

impl MaterialTable {
    pub fn new() -> Self {
        MaterialTable(BTreeMap::new())
    }

    pub fn insert(&mut self, spec: MaterialSpec) {
        self.0.insert(spec.key.clone(), spec);
    }

    pub fn get(&self, key: &str) -> Option<&MaterialSpec> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialSpec> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
