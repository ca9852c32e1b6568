//! # Reference Data
//!
//! Material, service class, end type and wire diameter tables used by the
//! sizing engine. Tables are parsed once into an immutable [`ReferenceData`]
//! value which is then passed by reference into every calculation.
//!
//! ## Fallbacks
//!
//! Lookups never fail. A missing key or an empty table degrades to the
//! constants in [`fallback`], and the returned [`Resolved`] says which of the
//! two happened so callers can tell "found" from "defaulted". Callers that
//! would rather refuse an unknown key use [`ReferenceData::require_known`].
//!
//! ## Example
//!
//! ```rust
//! use spring_core::reference::ReferenceData;
//!
//! let data = ReferenceData::builtin().unwrap();
//!
//! let g = data.shear_modulus("PIANO_WIRE");
//! assert!(!g.is_fallback());
//!
//! let unknown = data.shear_modulus("UNOBTAINIUM");
//! assert!(unknown.is_fallback());
//! assert_eq!(unknown.value(), 8150.0);
//! ```

pub mod end_types;
pub mod loader;
pub mod materials;
pub mod service;
pub mod wire_diameters;

pub use end_types::{DeadCoilRule, EndTypeSpec, EndTypeTable};
pub use loader::{LoadIssue, FILE_DIAMETERS, FILE_END_TYPES, FILE_MATERIALS};
pub use materials::{MaterialInfo, MaterialSpec, MaterialTable, RmRow};
pub use service::{ServiceClass, ServiceTable, SEVERE_STRESS_KEY};
pub use wire_diameters::WireDiameterTable;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Values used when a key or a whole table is absent.
pub mod fallback {
    /// Shear modulus G (daN/mm²)
    pub const SHEAR_MODULUS: f64 = 8150.0;
    /// Tensile strength Rm (daN/mm²)
    pub const TENSILE_STRENGTH: f64 = 150.0;
    /// Allowable stress factor (fraction of Rm)
    pub const STRESS_FACTOR: f64 = 0.40;
    /// Set-to-solid stress factor (fraction of Rm)
    pub const SET_SOLID_FACTOR: f64 = 0.80;
    /// Minimum dead coils per end for an unknown end type
    pub const DEAD_COILS_MIN: f64 = 2.0;
    /// Stress factor key for an unknown service class
    pub const STRESS_FACTOR_KEY: &str = "medium_dynamic";
    /// Wire diameter domain (mm) when no diameter table is loaded
    pub const WIRE_DIAMETERS: [f64; 8] = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0];
}

/// Outcome of a reference lookup: the value, and whether it came from the
/// table or from a fallback constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value")]
pub enum Resolved<T> {
    /// Value read from the reference table
    Found(T),
    /// Key or table absent; value is the documented default
    Fallback(T),
}

impl<T> Resolved<T> {
    /// Unwrap the value regardless of where it came from
    pub fn value(self) -> T {
        match self {
            Resolved::Found(v) | Resolved::Fallback(v) => v,
        }
    }

    /// Borrow the value
    pub fn get(&self) -> &T {
        match self {
            Resolved::Found(v) | Resolved::Fallback(v) => v,
        }
    }

    /// True if the value is a default rather than table data
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolved::Fallback(_))
    }

    /// Transform the value, keeping the source
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        match self {
            Resolved::Found(v) => Resolved::Found(f(v)),
            Resolved::Fallback(v) => Resolved::Fallback(f(v)),
        }
    }

    fn found_or(found: Option<T>, default: T) -> Self {
        match found {
            Some(v) => Resolved::Found(v),
            None => Resolved::Fallback(default),
        }
    }
}

/// Immutable set of reference tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    pub materials: MaterialTable,
    pub services: ServiceTable,
    pub end_types: EndTypeTable,
    pub wire_diameters: WireDiameterTable,
    /// Problems found while loading (skipped entries, missing files)
    #[serde(default)]
    pub issues: Vec<LoadIssue>,
}

impl ReferenceData {
    /// Reference data with every table empty. All lookups fall back.
    pub fn empty() -> Self {
        ReferenceData::default()
    }

    /// The tables shipped with the crate.
    pub fn builtin() -> CalcResult<Self> {
        Self::from_json(
            include_str!("../../data/spring_materials_database.json"),
            include_str!("../../data/wire_diameters_database.json"),
            include_str!("../../data/end_types_database.json"),
        )
    }

    /// Build from the three JSON documents. Fails only when a document is not
    /// valid JSON at the top level; malformed entries are skipped and recorded
    /// in [`ReferenceData::issues`].
    pub fn from_json(materials_json: &str, diameters_json: &str, end_types_json: &str) -> CalcResult<Self> {
        let mut issues = Vec::new();

        let (materials, services, mut material_issues) = loader::parse_materials(materials_json)?;
        issues.append(&mut material_issues);

        let (wire_diameters, mut diameter_issues) = loader::parse_wire_diameters(diameters_json)?;
        issues.append(&mut diameter_issues);

        let (end_types, mut end_type_issues) = loader::parse_end_types(end_types_json)?;
        issues.append(&mut end_type_issues);

        for issue in &issues {
            log::warn!("reference data: {}", issue);
        }

        Ok(ReferenceData {
            materials,
            services,
            end_types,
            wire_diameters,
            issues,
        })
    }

    /// Shear modulus G (daN/mm²) of a material
    pub fn shear_modulus(&self, material: &str) -> Resolved<f64> {
        let found = self.materials.get(material).map(|m| m.shear_modulus_dan_mm2);
        Resolved::found_or(found, fallback::SHEAR_MODULUS)
    }

    /// Tensile strength Rm (daN/mm²) of a material at wire diameter `d_mm`
    pub fn tensile_strength(&self, material: &str, d_mm: f64) -> Resolved<f64> {
        let found = self.materials.get(material).and_then(|m| m.tensile_strength(d_mm));
        Resolved::found_or(found, fallback::TENSILE_STRENGTH)
    }

    /// Allowable stress factor of a material for a stress factor key
    pub fn stress_factor(&self, material: &str, stress_key: &str) -> Resolved<f64> {
        let found = self.materials.get(material).and_then(|m| m.stress_factor(stress_key));
        Resolved::found_or(found, fallback::STRESS_FACTOR)
    }

    /// Set-to-solid stress factor of a material
    pub fn set_solid_factor(&self, material: &str) -> Resolved<f64> {
        let found = self.materials.get(material).and_then(|m| m.set_solid_factor);
        Resolved::found_or(found, fallback::SET_SOLID_FACTOR)
    }

    /// Service class by key
    pub fn service_class(&self, key: &str) -> Resolved<ServiceClass> {
        match self.services.get(key) {
            Some(class) => Resolved::Found(class.clone()),
            None => Resolved::Fallback(ServiceClass::fallback(key)),
        }
    }

    /// End type by key
    pub fn end_type(&self, key: &str) -> Resolved<EndTypeSpec> {
        match self.end_types.get(key) {
            Some(spec) => Resolved::Found(spec.clone()),
            None => Resolved::Fallback(EndTypeSpec::fallback(key)),
        }
    }

    /// Strict check of the keys an input refers to.
    ///
    /// An empty table accepts any key, since every lookup into it falls back
    /// anyway.
    pub fn require_known(&self, material: &str, service_class: &str, end_type: &str) -> CalcResult<()> {
        if !self.materials.is_empty() && self.materials.get(material).is_none() {
            return Err(CalcError::unknown_reference("materials", material));
        }
        if !self.services.is_empty() && self.services.get(service_class).is_none() {
            return Err(CalcError::unknown_reference("service classes", service_class));
        }
        if !self.end_types.is_empty() && self.end_types.get(end_type).is_none() {
            return Err(CalcError::unknown_reference("end types", end_type));
        }
        Ok(())
    }

    /// Ordered wire diameter domain (mm)
    pub fn wire_diameters(&self) -> Resolved<&[f64]> {
        if self.wire_diameters.is_empty() {
            Resolved::Fallback(&fallback::WIRE_DIAMETERS[..])
        } else {
            Resolved::Found(self.wire_diameters.as_slice())
        }
    }
}
