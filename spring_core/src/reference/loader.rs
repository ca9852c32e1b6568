//! Reference table parsing
//!
//! The JSON documents are parsed entry by entry. A malformed entry is skipped
//! and reported as a [`LoadIssue`] instead of failing the whole table, so one
//! bad material never takes the others down with it.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::end_types::{DeadCoilRule, EndTypeSpec, EndTypeTable};
use super::materials::{MaterialInfo, MaterialSpec, MaterialTable, RmRow};
use super::service::{ServiceClass, ServiceTable};
use super::wire_diameters::WireDiameterTable;
use super::ReferenceData;
use crate::errors::{CalcError, CalcResult};

/// Material and service class document
pub const FILE_MATERIALS: &str = "spring_materials_database.json";
/// Wire diameter document
pub const FILE_DIAMETERS: &str = "wire_diameters_database.json";
/// End type document
pub const FILE_END_TYPES: &str = "end_types_database.json";

/// Stress limit entry holding the set-to-solid factor rather than a service factor
const SET_SOLID_KEY: &str = "set_solid";

/// A problem found while loading reference data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadIssue {
    /// Table the problem belongs to (e.g., "materials")
    pub table: String,
    /// Offending entry, if the problem is entry-specific
    pub key: Option<String>,
    pub reason: String,
}

impl LoadIssue {
    fn table(table: &str, reason: impl Into<String>) -> Self {
        LoadIssue {
            table: table.to_string(),
            key: None,
            reason: reason.into(),
        }
    }

    fn entry(table: &str, key: &str, reason: impl Into<String>) -> Self {
        LoadIssue {
            table: table.to_string(),
            key: Some(key.to_string()),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}[{}]: {}", self.table, key, self.reason),
            None => write!(f, "{}: {}", self.table, self.reason),
        }
    }
}

// ============================================================================
// Raw document shapes
// ============================================================================

#[derive(Deserialize)]
struct RawMaterial {
    #[serde(default)]
    description: String,
    #[serde(default)]
    code: String,
    #[serde(rename = "shear_modulus_G")]
    shear_modulus: RawShearModulus,
    #[serde(rename = "tensile_strength_Rm")]
    tensile_strength: RawRmTable,
    #[serde(default)]
    stress_limits: BTreeMap<String, RawFactor>,
    #[serde(default)]
    corrosion_resistance: Option<String>,
    #[serde(default, rename = "max_temperature_C")]
    max_temperature_c: Option<f64>,
    #[serde(default)]
    treatments: Vec<String>,
}

#[derive(Deserialize)]
struct RawShearModulus {
    #[serde(rename = "value_daN")]
    value: f64,
}

#[derive(Deserialize)]
struct RawRmTable {
    table: Vec<RawRmRow>,
}

#[derive(Deserialize)]
struct RawRmRow {
    d_min: f64,
    d_max: f64,
    #[serde(rename = "Rm_daN")]
    rm: f64,
}

#[derive(Deserialize)]
struct RawFactor {
    factor: f64,
}

#[derive(Deserialize)]
struct RawWorkType {
    stress_factor_key: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct RawEndType {
    dead_coils: RawDeadCoils,
    #[serde(default)]
    grinding_required: bool,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct RawDeadCoils {
    #[serde(default)]
    minimum: f64,
    #[serde(default)]
    maximum: Option<f64>,
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_document(table: &str, json: &str) -> CalcResult<Value> {
    serde_json::from_str(json)
        .map_err(|e| CalcError::invalid_reference(table, format!("not valid JSON: {}", e)))
}

/// Object member `name` of `doc`, or an issue if it is absent or not an object
fn object_member<'a>(
    doc: &'a Value,
    table: &str,
    name: &str,
    issues: &mut Vec<LoadIssue>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match doc.get(name) {
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            issues.push(LoadIssue::table(table, format!("'{}' is not an object", name)));
            None
        }
        None => {
            issues.push(LoadIssue::table(table, format!("missing '{}'", name)));
            None
        }
    }
}

fn build_material(key: &str, raw: RawMaterial) -> Result<MaterialSpec, String> {
    let g = raw.shear_modulus.value;
    if !(g.is_finite() && g > 0.0) {
        return Err(format!("shear modulus {} is not positive", g));
    }
    if raw.tensile_strength.table.is_empty() {
        return Err("tensile strength table is empty".to_string());
    }

    let mut rm_table = Vec::with_capacity(raw.tensile_strength.table.len());
    for row in raw.tensile_strength.table {
        if !(row.d_max > row.d_min && row.rm > 0.0) {
            return Err(format!(
                "tensile strength row [{}, {}) -> {} is invalid",
                row.d_min, row.d_max, row.rm
            ));
        }
        rm_table.push(RmRow {
            d_min_mm: row.d_min,
            d_max_mm: row.d_max,
            rm_dan_mm2: row.rm,
        });
    }
    rm_table.sort_by(|a, b| a.d_min_mm.total_cmp(&b.d_min_mm));

    let mut stress_factors = BTreeMap::new();
    let mut set_solid_factor = None;
    for (name, limit) in raw.stress_limits {
        if !(limit.factor > 0.0 && limit.factor <= 1.0) {
            return Err(format!("stress factor '{}' = {} is outside (0, 1]", name, limit.factor));
        }
        if name == SET_SOLID_KEY {
            set_solid_factor = Some(limit.factor);
        } else {
            stress_factors.insert(name, limit.factor);
        }
    }

    Ok(MaterialSpec {
        key: key.to_string(),
        shear_modulus_dan_mm2: g,
        rm_table,
        stress_factors,
        set_solid_factor,
        info: MaterialInfo {
            description: raw.description,
            code: raw.code,
            corrosion_resistance: raw.corrosion_resistance,
            max_temperature_c: raw.max_temperature_c,
            treatments: raw.treatments,
        },
    })
}

/// Parse the materials document into material and service class tables.
pub fn parse_materials(json: &str) -> CalcResult<(MaterialTable, ServiceTable, Vec<LoadIssue>)> {
    let doc = parse_document("materials", json)?;
    let mut issues = Vec::new();
    let mut materials = MaterialTable::new();
    let mut services = ServiceTable::new();

    if let Some(entries) = object_member(&doc, "materials", "materials", &mut issues) {
        for (key, value) in entries {
            let built = serde_json::from_value::<RawMaterial>(value.clone())
                .map_err(|e| e.to_string())
                .and_then(|raw| build_material(key, raw));
            match built {
                Ok(spec) => materials.insert(spec),
                Err(reason) => issues.push(LoadIssue::entry("materials", key, reason)),
            }
        }
    }

    if let Some(entries) = object_member(&doc, "work_types", "work_types", &mut issues) {
        for (key, value) in entries {
            match serde_json::from_value::<RawWorkType>(value.clone()) {
                Ok(raw) => services.insert(ServiceClass::new(key.as_str(), raw.stress_factor_key, raw.description)),
                Err(e) => issues.push(LoadIssue::entry("work_types", key, e.to_string())),
            }
        }
        if !services.is_empty() && services.severe_count() != 1 {
            issues.push(LoadIssue::table(
                "work_types",
                format!("expected exactly one severe class, found {}", services.severe_count()),
            ));
        }
    }

    Ok((materials, services, issues))
}

/// Parse the wire diameter document.
pub fn parse_wire_diameters(json: &str) -> CalcResult<(WireDiameterTable, Vec<LoadIssue>)> {
    let doc = parse_document("wire_diameters", json)?;
    let mut issues = Vec::new();

    let raw = doc
        .get("standard_wire_diameters")
        .and_then(|s| s.get("all_diameters"))
        .cloned();
    let Some(raw) = raw else {
        issues.push(LoadIssue::table("wire_diameters", "missing 'standard_wire_diameters.all_diameters'"));
        return Ok((WireDiameterTable::default(), issues));
    };

    let table = serde_json::from_value::<Vec<f64>>(raw)
        .map_err(|e| e.to_string())
        .and_then(|list| WireDiameterTable::new(list).map_err(|e| e.to_string()));
    match table {
        Ok(table) => Ok((table, issues)),
        Err(reason) => {
            issues.push(LoadIssue::table("wire_diameters", reason));
            Ok((WireDiameterTable::default(), issues))
        }
    }
}

/// Parse the end type document.
pub fn parse_end_types(json: &str) -> CalcResult<(EndTypeTable, Vec<LoadIssue>)> {
    let doc = parse_document("end_types", json)?;
    let mut issues = Vec::new();
    let mut table = EndTypeTable::new();

    if let Some(entries) = object_member(&doc, "end_types", "end_types", &mut issues) {
        for (key, value) in entries {
            let raw = match serde_json::from_value::<RawEndType>(value.clone()) {
                Ok(raw) => raw,
                Err(e) => {
                    issues.push(LoadIssue::entry("end_types", key, e.to_string()));
                    continue;
                }
            };
            let rule = DeadCoilRule {
                minimum: raw.dead_coils.minimum,
                maximum: raw.dead_coils.maximum,
            };
            if rule.minimum < 0.0 || rule.maximum.is_some_and(|max| max < rule.minimum) {
                issues.push(LoadIssue::entry("end_types", key, "dead coil range is inverted or negative"));
                continue;
            }
            table.insert(EndTypeSpec {
                key: key.clone(),
                dead_coils: rule,
                grinding_required: raw.grinding_required,
                description: raw.description,
            });
        }
    }

    match doc.get("selection_order").cloned().map(serde_json::from_value::<Vec<String>>) {
        Some(Ok(order)) => {
            for key in order.iter().filter(|k| table.get(k).is_none()) {
                issues.push(LoadIssue::entry("end_types", key, "listed in selection_order but not defined"));
            }
            table.set_selection_order(order);
        }
        Some(Err(e)) => issues.push(LoadIssue::table("end_types", format!("bad selection_order: {}", e))),
        None => {}
    }

    Ok((table, issues))
}

impl ReferenceData {
    /// Load the three documents from `dir`.
    ///
    /// Never fails: a missing or unreadable document leaves its tables empty
    /// (so lookups fall back) and is recorded in [`ReferenceData::issues`].
    pub fn load_dir(dir: &Path) -> Self {
        let mut issues = Vec::new();

        let materials_json = read_document(dir, FILE_MATERIALS, &mut issues);
        let diameters_json = read_document(dir, FILE_DIAMETERS, &mut issues);
        let end_types_json = read_document(dir, FILE_END_TYPES, &mut issues);

        let (materials, services) = match materials_json.as_deref().map(parse_materials) {
            Some(Ok((m, s, mut found))) => {
                issues.append(&mut found);
                (m, s)
            }
            Some(Err(e)) => {
                issues.push(LoadIssue::table("materials", e.to_string()));
                (MaterialTable::default(), ServiceTable::default())
            }
            None => (MaterialTable::default(), ServiceTable::default()),
        };

        let wire_diameters = match diameters_json.as_deref().map(parse_wire_diameters) {
            Some(Ok((table, mut found))) => {
                issues.append(&mut found);
                table
            }
            Some(Err(e)) => {
                issues.push(LoadIssue::table("wire_diameters", e.to_string()));
                WireDiameterTable::default()
            }
            None => WireDiameterTable::default(),
        };

        let end_types = match end_types_json.as_deref().map(parse_end_types) {
            Some(Ok((table, mut found))) => {
                issues.append(&mut found);
                table
            }
            Some(Err(e)) => {
                issues.push(LoadIssue::table("end_types", e.to_string()));
                EndTypeTable::default()
            }
            None => EndTypeTable::default(),
        };

        for issue in &issues {
            log::warn!("reference data: {}", issue);
        }
        log::debug!(
            "loaded reference data from {}: {} materials, {} services, {} end types, {} diameters",
            dir.display(),
            materials.len(),
            services.len(),
            end_types.len(),
            wire_diameters.len()
        );

        ReferenceData {
            materials,
            services,
            end_types,
            wire_diameters,
            issues,
        }
    }
}

fn read_document(dir: &Path, file: &str, issues: &mut Vec<LoadIssue>) -> Option<String> {
    let path = dir.join(file);
    match fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) => {
            issues.push(LoadIssue::table(file, format!("cannot read {}: {}", path.display(), e)));
            None
        }
    }
}
