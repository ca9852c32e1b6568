//! # Validity Alerts
//!
//! Advisory checks run on every computed design. Alerts never stop a
//! calculation; they are reported in a fixed order and must be confirmed
//! before a design with alerts is applied to a project.
//!
//! Each alert has a stable message key (`alert.*`) for hosts that translate
//! messages, carries its numeric parameters as fields, and renders an English
//! message through `Display`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineSettings;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum Alert {
    /// Selected wire is thinner than the minimum admissible diameter
    WireDiameter { d_mm: f64, d_min_mm: f64 },
    /// Real shear stress above the effective allowable
    Stress { tau_real: f64, tau_adm: f64 },
    /// Real solid length above the allowed maximum
    SolidLength { solid_length_mm: f64, max_solid_length_mm: f64 },
    /// Free length shorter than the solid length
    Impossible { free_length_mm: f64, solid_length_mm: f64 },
    IndexLow { spring_index: f64 },
    IndexHigh { spring_index: f64 },
    /// Slender spring, needs a guide rod or bore (buckling)
    Guidance { ratio: f64 },
    /// Active coil pitch under load smaller than the wire
    Pitch { pitch_mm: f64, d_mm: f64 },
    /// Remediation hint accompanying [`Alert::Pitch`]
    PitchHint,
}

impl Alert {
    /// Stable message key
    pub fn key(&self) -> &'static str {
        match self {
            Alert::WireDiameter { .. } => "alert.wire_diameter",
            Alert::Stress { .. } => "alert.stress",
            Alert::SolidLength { .. } => "alert.solid_length",
            Alert::Impossible { .. } => "alert.impossible",
            Alert::IndexLow { .. } => "alert.index_low",
            Alert::IndexHigh { .. } => "alert.index_high",
            Alert::Guidance { .. } => "alert.guidance",
            Alert::Pitch { .. } => "alert.pitch",
            Alert::PitchHint => "alert.pitch_hint",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::WireDiameter { d_mm, d_min_mm } => write!(
                f,
                "⚠ Wire diameter d = {:.2} mm is below the minimum admissible {:.2} mm",
                d_mm, d_min_mm
            ),
            Alert::Stress { tau_real, tau_adm } => write!(
                f,
                "⚠ Shear stress {:.1} daN/mm² exceeds the allowable {:.1} daN/mm²",
                tau_real, tau_adm
            ),
            Alert::SolidLength { solid_length_mm, max_solid_length_mm } => write!(
                f,
                "⚠ Solid length {:.2} mm exceeds the maximum {:.2} mm",
                solid_length_mm, max_solid_length_mm
            ),
            Alert::Impossible { free_length_mm, solid_length_mm } => write!(
                f,
                "⚠ Impossible spring: free length {:.2} mm is shorter than solid length {:.2} mm",
                free_length_mm, solid_length_mm
            ),
            Alert::IndexLow { spring_index } => write!(
                f,
                "⚠ Spring index c = {:.2} is too low (hard to coil)",
                spring_index
            ),
            Alert::IndexHigh { spring_index } => write!(
                f,
                "⚠ Spring index c = {:.2} is too high (unstable coiling)",
                spring_index
            ),
            Alert::Guidance { ratio } => write!(
                f,
                "⚠ L0/Dm = {:.2}: guide the spring on a rod or in a bore (buckling risk)",
                ratio
            ),
            Alert::Pitch { pitch_mm, d_mm } => write!(
                f,
                "⚠ Active pitch {:.2} mm under load is smaller than the wire diameter {:.2} mm",
                pitch_mm, d_mm
            ),
            Alert::PitchHint => f.write_str(
                "   Increase the height under load, reduce the solid length or reduce the dead turns",
            ),
        }
    }
}

/// Design values the checks read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckValues {
    pub d_mm: f64,
    pub d_min_mm: f64,
    pub dm_mm: f64,
    pub tau_real: f64,
    pub tau_adm_eff: f64,
    pub solid_length_mm: f64,
    pub max_solid_length_mm: f64,
    pub free_length_mm: f64,
    pub spring_index: f64,
    pub height_under_load_mm: f64,
    pub dead_turns: f64,
    pub active_turns: f64,
}

/// Run every check in reporting order.
pub fn check(v: &CheckValues, settings: &EngineSettings) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if v.d_mm < v.d_min_mm {
        alerts.push(Alert::WireDiameter { d_mm: v.d_mm, d_min_mm: v.d_min_mm });
    }
    if v.tau_real > v.tau_adm_eff {
        alerts.push(Alert::Stress { tau_real: v.tau_real, tau_adm: v.tau_adm_eff });
    }
    if v.solid_length_mm > v.max_solid_length_mm {
        alerts.push(Alert::SolidLength {
            solid_length_mm: v.solid_length_mm,
            max_solid_length_mm: v.max_solid_length_mm,
        });
    }
    if v.free_length_mm < v.solid_length_mm {
        alerts.push(Alert::Impossible {
            free_length_mm: v.free_length_mm,
            solid_length_mm: v.solid_length_mm,
        });
    }
    if v.spring_index < settings.index_min {
        alerts.push(Alert::IndexLow { spring_index: v.spring_index });
    } else if v.spring_index > settings.index_max {
        alerts.push(Alert::IndexHigh { spring_index: v.spring_index });
    }
    if v.dm_mm > 0.0 {
        let ratio = v.free_length_mm / v.dm_mm;
        if ratio > settings.guidance_ratio {
            alerts.push(Alert::Guidance { ratio });
        }
    }
    if v.active_turns > 0.0 {
        let active_height = v.height_under_load_mm - 2.0 * v.dead_turns * v.d_mm;
        let pitch = active_height / v.active_turns;
        if pitch < v.d_mm {
            alerts.push(Alert::Pitch { pitch_mm: pitch, d_mm: v.d_mm });
            alerts.push(Alert::PitchHint);
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> CheckValues {
        CheckValues {
            d_mm: 3.0,
            d_min_mm: 2.7,
            dm_mm: 20.0,
            tau_real: 56.7,
            tau_adm_eff: 78.75,
            solid_length_mm: 60.0,
            max_solid_length_mm: 60.0,
            free_length_mm: 78.0,
            spring_index: 6.67,
            height_under_load_mm: 70.0,
            dead_turns: 1.0,
            active_turns: 18.0,
        }
    }

    fn keys(alerts: &[Alert]) -> Vec<&'static str> {
        alerts.iter().map(Alert::key).collect()
    }

    #[test]
    fn test_healthy_design_has_no_alerts() {
        assert!(check(&healthy(), &EngineSettings::default()).is_empty());
    }

    #[test]
    fn test_alert_order() {
        let v = CheckValues {
            d_mm: 2.0,
            d_min_mm: 2.5,
            tau_real: 120.0,
            solid_length_mm: 65.0,
            free_length_mm: 66.0,
            spring_index: 3.0,
            dm_mm: 6.0,
            height_under_load_mm: 30.0,
            dead_turns: 1.0,
            active_turns: 30.0,
            ..healthy()
        };
        let alerts = check(&v, &EngineSettings::default());
        assert_eq!(
            keys(&alerts),
            vec![
                "alert.wire_diameter",
                "alert.stress",
                "alert.solid_length",
                "alert.index_low",
                "alert.guidance",
                "alert.pitch",
                "alert.pitch_hint",
            ]
        );
    }

    #[test]
    fn test_impossible_and_high_index() {
        let v = CheckValues {
            free_length_mm: 50.0,
            spring_index: 17.0,
            ..healthy()
        };
        let alerts = check(&v, &EngineSettings::default());
        assert_eq!(keys(&alerts), vec!["alert.impossible", "alert.index_high"]);
    }

    #[test]
    fn test_index_bounds_are_inclusive() {
        let settings = EngineSettings::default();
        assert!(check(&CheckValues { spring_index: 4.0, ..healthy() }, &settings).is_empty());
        assert!(check(&CheckValues { spring_index: 16.0, ..healthy() }, &settings).is_empty());
    }

    #[test]
    fn test_guidance_ratio_from_settings() {
        let v = CheckValues { free_length_mm: 90.0, ..healthy() };
        assert_eq!(keys(&check(&v, &EngineSettings::default())), vec!["alert.guidance"]);

        let relaxed = EngineSettings { guidance_ratio: 5.0, ..EngineSettings::default() };
        assert!(check(&v, &relaxed).is_empty());
    }

    #[test]
    fn test_display_and_serialization() {
        let alert = Alert::Stress { tau_real: 90.0, tau_adm: 78.75 };
        assert_eq!(
            alert.to_string(),
            "⚠ Shear stress 90.0 daN/mm² exceeds the allowable 78.8 daN/mm²"
        );

        let json = serde_json::to_value(alert).unwrap();
        assert_eq!(json["key"], "stress");
        assert_eq!(json["tau_real"], 90.0);
    }
}
