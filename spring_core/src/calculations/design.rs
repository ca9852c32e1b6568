//! # Compression Spring Design
//!
//! Sizes a helical compression spring per EN 13906-1 from a target diameter,
//! a working load and the geometric limits of its housing.
//!
//! ## Procedure
//!
//! 1. Resolve material, service class and end type from [`ReferenceData`]
//! 2. Iterate wire and mean diameter to convergence ([`super::sizing`])
//! 3. Derive turns, solid length, rate and free length ([`super::turns`])
//! 4. Run the validity checks ([`super::alerts`])
//!
//! Missing reference entries never fail a calculation; they fall back to
//! documented defaults and are listed in [`SpringDesign::fallbacks`].
//!
//! ## Example
//!
//! ```rust
//! use spring_core::calculations::design::{compute_design, SpringInput};
//! use spring_core::reference::ReferenceData;
//!
//! let data = ReferenceData::builtin().unwrap();
//! let input = SpringInput {
//!     target_diameter_mm: 20.0,
//!     load_dan: 30.0,
//!     height_under_load_mm: 80.0,
//!     max_solid_length_mm: 60.0,
//!     ..SpringInput::default()
//! };
//!
//! let design = compute_design(&input, &data).unwrap();
//! println!("d = {:.2} mm, L0 = {:.2} mm", design.wire_diameter_mm, design.turns.free_length_mm);
//! for alert in &design.alerts {
//!     println!("{}", alert);
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::alerts::{self, Alert, CheckValues};
use super::diameter::DiameterType;
use super::sizing::{Convergence, SelectionMode, SizingProblem};
use super::stress::{self, StressBasis, StressState};
use super::turns::{self, TurnGeometry, TurnInput};
use crate::config::EngineSettings;
use crate::errors::{CalcError, CalcResult};
use crate::reference::{ReferenceData, Resolved};

/// Winding direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    pub fn is_left(self) -> bool {
        self == Handedness::Left
    }
}

impl FromStr for Handedness {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" | "r" => Ok(Handedness::Right),
            "left" | "l" => Ok(Handedness::Left),
            _ => Err(CalcError::invalid_input("handedness", s, "Expected 'right' or 'left'")),
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Right => f.write_str("right"),
            Handedness::Left => f.write_str("left"),
        }
    }
}

/// Input parameters for a compression spring.
///
/// Units: mm for lengths, daN for loads. Reference entries are named by key
/// and resolved at calculation time.
///
/// ## JSON Example
///
/// ```json
/// {
///   "material": "PIANO_WIRE",
///   "service_class": "MEDIUM_DYNAMIC",
///   "end_type": "CLOSED_GROUND",
///   "diameter_type": "Mean",
///   "target_diameter_mm": 20.0,
///   "wire_diameter_mm": 2.0,
///   "load_dan": 30.0,
///   "height_under_load_mm": 80.0,
///   "max_solid_length_mm": 60.0,
///   "dead_turns": 1.0,
///   "handedness": "Right",
///   "selection_mode": "ForceMinimum"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringInput {
    /// Material key (e.g., "PIANO_WIRE")
    pub material: String,

    /// Service class key (e.g., "SEVERE_DYNAMIC")
    pub service_class: String,

    /// End type key (e.g., "CLOSED_GROUND")
    pub end_type: String,

    /// Which coil diameter `target_diameter_mm` refers to
    #[serde(default)]
    pub diameter_type: DiameterType,

    /// Target coil diameter (mm)
    pub target_diameter_mm: f64,

    /// Starting wire diameter (mm); a non-finite or non-positive value starts at 1.0
    pub wire_diameter_mm: f64,

    /// Working load F (daN)
    pub load_dan: f64,

    /// Spring height under the working load H (mm)
    pub height_under_load_mm: f64,

    /// Maximum allowed solid length Lc_max (mm)
    pub max_solid_length_mm: f64,

    /// Requested dead turns per end, clamped by the end type
    #[serde(default)]
    pub dead_turns: f64,

    #[serde(default)]
    pub handedness: Handedness,

    #[serde(default)]
    pub selection_mode: SelectionMode,
}

impl Default for SpringInput {
    fn default() -> Self {
        SpringInput {
            material: "PIANO_WIRE".to_string(),
            service_class: "MEDIUM_DYNAMIC".to_string(),
            end_type: "CLOSED_GROUND".to_string(),
            diameter_type: DiameterType::Mean,
            target_diameter_mm: 20.0,
            wire_diameter_mm: 2.0,
            load_dan: 10.0,
            height_under_load_mm: 50.0,
            max_solid_length_mm: 30.0,
            dead_turns: 1.0,
            handedness: Handedness::Right,
            selection_mode: SelectionMode::ForceMinimum,
        }
    }
}

impl SpringInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        fn positive(field: &str, value: f64, reason: &str) -> CalcResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(CalcError::invalid_input(field, value.to_string(), reason))
            }
        }

        positive("target_diameter_mm", self.target_diameter_mm, "Target diameter must be positive")?;
        positive("load_dan", self.load_dan, "Load must be positive")?;
        positive(
            "height_under_load_mm",
            self.height_under_load_mm,
            "Height under load must be positive",
        )?;
        positive(
            "max_solid_length_mm",
            self.max_solid_length_mm,
            "Maximum solid length must be positive",
        )?;
        if !(self.dead_turns.is_finite() && self.dead_turns >= 0.0) {
            return Err(CalcError::invalid_input(
                "dead_turns",
                self.dead_turns.to_string(),
                "Dead turns cannot be negative",
            ));
        }
        if self.material.trim().is_empty() {
            return Err(CalcError::missing_field("material"));
        }
        if self.service_class.trim().is_empty() {
            return Err(CalcError::missing_field("service_class"));
        }
        if self.end_type.trim().is_empty() {
            return Err(CalcError::missing_field("end_type"));
        }
        Ok(())
    }
}

/// A reference lookup that used its default value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackUse {
    /// What was looked up (e.g., "tensile_strength")
    pub lookup: String,
    /// Key that was not found
    pub key: String,
}

/// Informational set-to-solid stress check (no alert is raised)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetSolidCheck {
    /// Load at solid length (daN)
    pub load_at_solid_dan: f64,
    /// Uncorrected shear stress at solid (daN/mm²)
    pub tau_solid: f64,
    /// `Rm × set_solid_factor` (daN/mm²)
    pub tau_solid_adm: f64,
}

impl SetSolidCheck {
    pub fn passes(&self) -> bool {
        self.tau_solid <= self.tau_solid_adm
    }
}

/// Computed spring. Immutable once produced; recalculate to change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringDesign {
    /// Inputs this design was computed from
    pub input: SpringInput,

    // === Geometry ===
    pub wire_diameter_mm: f64,
    pub mean_diameter_mm: f64,
    pub inner_diameter_mm: f64,
    pub outer_diameter_mm: f64,

    // === Material ===
    /// Shear modulus G (daN/mm²)
    pub shear_modulus: f64,
    /// Service class applies the Bergsträsser correction
    pub severe: bool,
    /// Ends are ground
    pub grinding: bool,

    // === Stress ===
    pub stress: StressState,
    /// τ / τ_adm_eff in percent
    pub utilization_pct: f64,
    pub set_solid: SetSolidCheck,

    // === Turns and lengths ===
    pub turns: TurnGeometry,

    // === Sizing ===
    /// Wire diameters at least `d_min` (largest five when none qualify)
    pub valid_diameters: Vec<f64>,
    pub convergence: Convergence,
    pub fallbacks: Vec<FallbackUse>,
    pub alerts: Vec<Alert>,
}

impl SpringDesign {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// True when no alert was raised
    pub fn is_valid(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn spring_index(&self) -> f64 {
        self.stress.spring_index
    }

    pub fn d_min_mm(&self) -> f64 {
        self.stress.d_min_mm
    }

    /// Target value expressed in the input's diameter type for the final d/Dm.
    ///
    /// Equals the entered target unless the `Dm > d` guard moved the mean
    /// diameter; see [`SpringDesign::is_target_adjusted`].
    pub fn target_diameter_mm(&self) -> f64 {
        self.input
            .diameter_type
            .target_from_mean(self.mean_diameter_mm, self.wire_diameter_mm)
    }

    /// True when the built spring no longer matches the entered target
    pub fn is_target_adjusted(&self) -> bool {
        (self.target_diameter_mm() - self.input.target_diameter_mm).abs() > 1e-6
    }

    /// The fields a host persists on apply
    pub fn properties(&self) -> SpringProperties {
        let h = &self.turns.heights;
        SpringProperties {
            wire_diameter: self.wire_diameter_mm,
            mean_diameter: self.mean_diameter_mm,
            inner_diameter: self.inner_diameter_mm,
            outer_diameter: self.outer_diameter_mm,
            active_turns_qty: self.turns.active_turns,
            total_turns_qty: self.turns.total_turns,
            dead_turns_qty: self.turns.dead_turns,
            diameter_type: self.input.diameter_type,
            target_diameter: self.input.target_diameter_mm,
            free_length: self.turns.free_length_mm,
            on_load_height: self.input.height_under_load_mm,
            min_height: self.input.max_solid_length_mm,
            solid_height: self.turns.solid_length_mm,
            active_turns_height: h.active_mm,
            dead_turns_height: h.dead_mm,
            min_active_turns_height: h.min_active_mm,
            max_active_turns_height: h.max_active_mm,
            spring_rate: self.turns.spring_rate,
            load: self.input.load_dan,
            load_type: self.input.service_class.clone(),
            material: self.input.material.clone(),
            extreme_turns: self.input.end_type.clone(),
            grinded: self.grinding,
            left_handed: self.input.handedness.is_left(),
        }
    }
}

/// Persistent spring properties, named the way document hosts store them.
///
/// Lengths in mm, load in daN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringProperties {
    pub wire_diameter: f64,
    pub mean_diameter: f64,
    pub inner_diameter: f64,
    pub outer_diameter: f64,
    pub active_turns_qty: f64,
    pub total_turns_qty: f64,
    /// Dead turns per end
    pub dead_turns_qty: f64,
    pub diameter_type: DiameterType,
    pub target_diameter: f64,
    /// L0, free representation height
    pub free_length: f64,
    /// H, loaded representation height
    pub on_load_height: f64,
    /// Lc_max, solid representation height
    pub min_height: f64,
    /// Real solid length
    pub solid_height: f64,
    pub active_turns_height: f64,
    pub dead_turns_height: f64,
    pub min_active_turns_height: f64,
    pub max_active_turns_height: f64,
    /// Spring rate R (daN/mm)
    pub spring_rate: f64,
    pub load: f64,
    /// Service class key
    pub load_type: String,
    pub material: String,
    /// End type key
    pub extreme_turns: String,
    pub grinded: bool,
    pub left_handed: bool,
}

impl SpringProperties {
    /// Flatten to key/value pairs for hosts with per-property storage.
    pub fn to_property_map(&self) -> CalcResult<BTreeMap<String, serde_json::Value>> {
        match serde_json::to_value(self).map_err(CalcError::serialization)? {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(CalcError::Internal {
                message: format!("property record serialized to {} instead of an object", other),
            }),
        }
    }
}

/// Compute a design with default engine settings.
pub fn compute_design(input: &SpringInput, data: &ReferenceData) -> CalcResult<SpringDesign> {
    compute_design_with(input, data, &EngineSettings::default())
}

/// Compute a design.
///
/// Fails only on invalid inputs or settings; reference lookups degrade to
/// defaults and non-convergence is reported in [`SpringDesign::convergence`].
pub fn compute_design_with(
    input: &SpringInput,
    data: &ReferenceData,
    settings: &EngineSettings,
) -> CalcResult<SpringDesign> {
    input.validate()?;
    settings.validate()?;

    let mut fallbacks = Vec::new();
    let mut note = |lookup: &str, key: &str, fell_back: bool| {
        if fell_back {
            log::warn!("{} for '{}' not found, using default", lookup, key);
            fallbacks.push(FallbackUse {
                lookup: lookup.to_string(),
                key: key.to_string(),
            });
        }
    };

    let material = input.material.as_str();

    let g = data.shear_modulus(material);
    note("shear_modulus", material, g.is_fallback());

    let service = data.service_class(&input.service_class);
    note("service_class", &input.service_class, service.is_fallback());
    let service = service.value();

    let factor = data.stress_factor(material, &service.stress_factor_key);
    note("stress_factor", &service.stress_factor_key, factor.is_fallback());

    let end_type = data.end_type(&input.end_type);
    note("end_type", &input.end_type, end_type.is_fallback());
    let end_type = end_type.value();

    let domain = data.wire_diameters();
    note("wire_diameters", "standard_wire_diameters", domain.is_fallback());
    let domain = domain.value();

    let rm_at = |d: f64| data.tensile_strength(material, d).value();
    let problem = SizingProblem {
        target_mm: input.target_diameter_mm,
        diameter_type: input.diameter_type,
        basis: StressBasis {
            load_dan: input.load_dan,
            stress_factor: factor.value(),
            severe: service.severe,
        },
        domain,
        rm_at: &rm_at,
        max_iterations: settings.max_iterations,
        tolerance: settings.tolerance,
    };
    let sized = problem.solve(input.wire_diameter_mm, input.selection_mode);
    let (d, dm) = (sized.d_mm, sized.dm_mm);

    let rm: Resolved<f64> = data.tensile_strength(material, d);
    note("tensile_strength", material, rm.is_fallback());

    let turns = turns::derive(
        &TurnInput {
            d_mm: d,
            dm_mm: dm,
            load_dan: input.load_dan,
            height_under_load_mm: input.height_under_load_mm,
            max_solid_length_mm: input.max_solid_length_mm,
            requested_dead_turns: input.dead_turns,
            shear_modulus: g.value(),
        },
        &end_type,
    );

    let set_solid_factor = data.set_solid_factor(material);
    note("set_solid_factor", material, set_solid_factor.is_fallback());
    let load_at_solid = if turns.free_length_mm > turns.solid_length_mm {
        turns.spring_rate * (turns.free_length_mm - turns.solid_length_mm)
    } else {
        0.0
    };
    let set_solid = SetSolidCheck {
        load_at_solid_dan: load_at_solid,
        tau_solid: stress::solid_stress(load_at_solid, d, dm),
        tau_solid_adm: sized.stress.rm_dan_mm2 * set_solid_factor.value(),
    };

    let alerts = alerts::check(
        &CheckValues {
            d_mm: d,
            d_min_mm: sized.stress.d_min_mm,
            dm_mm: dm,
            tau_real: sized.stress.tau_real,
            tau_adm_eff: sized.stress.tau_adm_eff,
            solid_length_mm: turns.solid_length_mm,
            max_solid_length_mm: input.max_solid_length_mm,
            free_length_mm: turns.free_length_mm,
            spring_index: sized.stress.spring_index,
            height_under_load_mm: input.height_under_load_mm,
            dead_turns: turns.dead_turns,
            active_turns: turns.active_turns,
        },
        settings,
    );

    log::info!(
        "spring sized: d = {:.2} mm, Dm = {:.2} mm, n = {:.2}, L0 = {:.2} mm, {} alert(s)",
        d,
        dm,
        turns.active_turns,
        turns.free_length_mm,
        alerts.len()
    );

    Ok(SpringDesign {
        input: input.clone(),
        wire_diameter_mm: d,
        mean_diameter_mm: dm,
        inner_diameter_mm: dm - d,
        outer_diameter_mm: dm + d,
        shear_modulus: g.value(),
        severe: service.severe,
        grinding: end_type.is_ground(),
        utilization_pct: sized.stress.utilization_pct(),
        stress: sized.stress,
        set_solid,
        turns,
        valid_diameters: sized.valid_diameters,
        convergence: sized.convergence,
        fallbacks,
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ReferenceData {
        ReferenceData::builtin().unwrap()
    }

    fn input() -> SpringInput {
        SpringInput {
            target_diameter_mm: 20.0,
            load_dan: 30.0,
            height_under_load_mm: 80.0,
            max_solid_length_mm: 60.0,
            dead_turns: 1.0,
            ..SpringInput::default()
        }
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let mut i = input();
        i.load_dan = 0.0;
        assert_eq!(i.validate().unwrap_err().error_code(), "INVALID_INPUT");

        let mut i = input();
        i.target_diameter_mm = f64::NAN;
        assert!(i.validate().is_err());

        let mut i = input();
        i.dead_turns = -1.0;
        assert!(i.validate().is_err());

        let mut i = input();
        i.material = "  ".to_string();
        assert_eq!(i.validate().unwrap_err().error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_bad_wire_candidate_is_not_an_error() {
        let mut i = input();
        i.wire_diameter_mm = f64::NAN;
        let design = compute_design(&i, &data()).unwrap();
        assert!(design.wire_diameter_mm > 0.0);
    }

    #[test]
    fn test_design_is_consistent() {
        let design = compute_design(&input(), &data()).unwrap();
        let d = design.wire_diameter_mm;

        assert!(data().wire_diameters.as_slice().contains(&d));
        assert!(d >= design.d_min_mm());
        assert!((design.inner_diameter_mm - (design.mean_diameter_mm - d)).abs() < 1e-12);
        assert!((design.outer_diameter_mm - (design.mean_diameter_mm + d)).abs() < 1e-12);
        assert!(design.fallbacks.is_empty());
        assert!(design.convergence.converged);
        assert!(design.grinding);
        assert!(!design.severe);
        assert!(design.turns.dead_turns >= 1.0);
    }

    #[test]
    fn test_unknown_material_falls_back() {
        let mut i = input();
        i.material = "UNOBTAINIUM".to_string();
        let design = compute_design(&i, &data()).unwrap();

        assert_eq!(design.shear_modulus, 8150.0);
        assert_eq!(design.stress.rm_dan_mm2, 150.0);
        let lookups: Vec<&str> = design.fallbacks.iter().map(|f| f.lookup.as_str()).collect();
        assert!(lookups.contains(&"shear_modulus"));
        assert!(lookups.contains(&"tensile_strength"));
        assert!(lookups.contains(&"stress_factor"));
    }

    #[test]
    fn test_severe_service_uses_corrected_allowable() {
        let mut i = input();
        i.service_class = "SEVERE_DYNAMIC".to_string();
        let design = compute_design(&i, &data()).unwrap();

        assert!(design.severe);
        assert!(design.stress.bergstrasser_k > 1.0);
        assert!(design.stress.tau_adm_eff < design.stress.tau_adm);
        let expected = design.stress.tau_real / design.stress.tau_adm_eff * 100.0;
        assert!((design.utilization_pct - expected).abs() < 1e-9);
    }

    #[test]
    fn test_properties_and_map() {
        let mut i = input();
        i.handedness = Handedness::Left;
        let design = compute_design(&i, &data()).unwrap();
        let props = design.properties();

        assert_eq!(props.wire_diameter, design.wire_diameter_mm);
        assert_eq!(props.min_height, 60.0);
        assert_eq!(props.on_load_height, 80.0);
        assert!(props.left_handed);
        assert!(props.grinded);

        let map = props.to_property_map().unwrap();
        assert_eq!(map["wireDiameter"], serde_json::json!(design.wire_diameter_mm));
        assert_eq!(map["extremeTurns"], serde_json::json!("CLOSED_GROUND"));
        assert_eq!(map["diameterType"], serde_json::json!("Mean"));
        assert!(map.contains_key("maxActiveTurnsHeight"));
    }

    #[test]
    fn test_target_diameter_round_trip() {
        let mut i = input();
        i.diameter_type = DiameterType::Inner;
        i.target_diameter_mm = 18.0;
        let design = compute_design(&i, &data()).unwrap();
        assert!((design.target_diameter_mm() - 18.0).abs() < 1e-9);
        assert!(!design.is_target_adjusted());
    }

    #[test]
    fn test_guarded_target_is_reported() {
        // Outer diameter smaller than any admissible wire
        let mut i = input();
        i.diameter_type = DiameterType::Outer;
        i.target_diameter_mm = 2.0;
        let design = compute_design(&i, &data()).unwrap();

        assert!(design.mean_diameter_mm > design.wire_diameter_mm);
        assert!(design.is_target_adjusted());
        assert_eq!(design.input.target_diameter_mm, 2.0);
        assert!(design.target_diameter_mm() > 2.0);
    }

    #[test]
    fn test_handedness_parse() {
        assert_eq!("Left".parse::<Handedness>().unwrap(), Handedness::Left);
        assert_eq!("r".parse::<Handedness>().unwrap(), Handedness::Right);
        assert!("up".parse::<Handedness>().is_err());
    }

    #[test]
    fn test_design_serializes() {
        let design = compute_design(&input(), &data()).unwrap();
        let json = serde_json::to_string(&design).unwrap();
        let back: SpringDesign = serde_json::from_str(&json).unwrap();
        assert_eq!(back.wire_diameter_mm, design.wire_diameter_mm);
        assert_eq!(back.alerts.len(), design.alerts.len());
        assert_eq!(back.input, design.input);
    }
}
