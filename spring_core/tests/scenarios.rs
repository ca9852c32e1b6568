//! End-to-end sizing scenarios against the built-in reference tables.

use spring_core::calculations::design::{compute_design, compute_design_with, SpringInput};
use spring_core::calculations::diameter::DiameterType;
use spring_core::calculations::sizing::SelectionMode;
use spring_core::calculations::stress::bergstrasser_factor;
use spring_core::config::EngineSettings;
use spring_core::file_io::{load_project, save_project};
use spring_core::helix::HelixPlan;
use spring_core::project::Project;
use spring_core::reference::{ReferenceData, WireDiameterTable};
use spring_core::representation::Representation;
use spring_core::session::DesignSession;
use spring_core::Alert;

fn builtin() -> ReferenceData {
    ReferenceData::builtin().unwrap()
}

fn piano_wire(target: f64, load: f64) -> SpringInput {
    SpringInput {
        material: "PIANO_WIRE".to_string(),
        service_class: "MEDIUM_DYNAMIC".to_string(),
        end_type: "CLOSED_GROUND".to_string(),
        diameter_type: DiameterType::Mean,
        target_diameter_mm: target,
        load_dan: load,
        height_under_load_mm: 80.0,
        max_solid_length_mm: 60.0,
        dead_turns: 1.0,
        ..SpringInput::default()
    }
}

fn has_alert(alerts: &[Alert], key: &str) -> bool {
    alerts.iter().any(|a| a.key() == key)
}

fn with_diameters(values: &[f64]) -> ReferenceData {
    ReferenceData {
        wire_diameters: WireDiameterTable::new(values.to_vec()).unwrap(),
        ..builtin()
    }
}

const STANDARD_DOMAIN: [f64; 8] = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0];

#[test]
fn test_reference_scenario() {
    let data = with_diameters(&STANDARD_DOMAIN);
    let input = SpringInput {
        dead_turns: 3.0,
        ..piano_wire(20.0, 30.0)
    };
    let design = compute_design(&input, &data).unwrap();

    // d_min ≈ 2.69 mm, so 3.0 is the smallest admissible wire
    assert_eq!(design.wire_diameter_mm, 3.0);
    assert!(design.d_min_mm() > 2.5 && design.d_min_mm() < 3.0);
    assert_eq!(design.mean_diameter_mm, 20.0);
    assert!(design.convergence.converged);
    assert!(design.convergence.iterations <= 10);

    let t = &design.turns;
    assert_eq!(t.dead_turns, 3.0);
    assert!((t.total_turns - 20.0).abs() < 1e-9);
    assert!((t.active_turns - 14.0).abs() < 1e-9);
    assert!((t.solid_length_mm - 60.0).abs() < 1e-9);
    assert!((t.free_length_mm - 120.72).abs() < 0.01);

    // c = 6.67 is in range; only the slenderness guidance fires (L0/Dm ≈ 6)
    let keys: Vec<&str> = design.alerts.iter().map(|a| a.key()).collect();
    assert_eq!(keys, vec!["alert.guidance"]);
}

#[test]
fn test_builtin_table_reference_scenario() {
    let data = builtin();
    let input = SpringInput {
        dead_turns: 3.0,
        ..piano_wire(20.0, 30.0)
    };
    let design = compute_design(&input, &data).unwrap();

    assert!(data.wire_diameters.as_slice().contains(&design.wire_diameter_mm));
    assert!(design.wire_diameter_mm >= design.d_min_mm());
    assert!(design.convergence.iterations <= 10);
    assert!(design.turns.solid_length_mm <= 60.0 + 1e-9);
    assert!(!has_alert(&design.alerts, "alert.stress"));
}

#[test]
fn test_tiny_load_takes_smallest_wire() {
    let data = builtin();
    let design = compute_design(&piano_wire(500.0, 0.01), &data).unwrap();

    assert_eq!(design.wire_diameter_mm, 0.5);
    assert!(design.d_min_mm() < 0.5);
    assert!(!has_alert(&design.alerts, "alert.stress"));
    assert!(!has_alert(&design.alerts, "alert.wire_diameter"));
    assert!(has_alert(&design.alerts, "alert.index_high"));
}

#[test]
fn test_severe_service_scenario() {
    let data = builtin();
    let input = SpringInput {
        service_class: "SEVERE_DYNAMIC".to_string(),
        ..piano_wire(10.0, 30.0)
    };
    let design = compute_design(&input, &data).unwrap();
    let s = &design.stress;

    assert!(design.severe);
    assert!((s.bergstrasser_k - bergstrasser_factor(s.spring_index)).abs() < 1e-12);
    assert!(s.bergstrasser_k > 1.0);
    assert!((s.tau_adm_eff - s.tau_adm / s.bergstrasser_k).abs() < 1e-9);
    assert!((design.utilization_pct - s.tau_real / s.tau_adm_eff * 100.0).abs() < 1e-9);
}

#[test]
fn test_inner_target_round_trip() {
    let data = builtin();
    let inner = SpringInput {
        diameter_type: DiameterType::Inner,
        ..piano_wire(18.0, 30.0)
    };
    let design = compute_design(&inner, &data).unwrap();
    assert!((design.target_diameter_mm() - 18.0).abs() < 1e-6);
    assert!((design.mean_diameter_mm - (18.0 + design.wire_diameter_mm)).abs() < 1e-6);

    // Same spring described by its mean diameter
    let mean = SpringInput {
        diameter_type: DiameterType::Mean,
        target_diameter_mm: design.mean_diameter_mm,
        wire_diameter_mm: design.wire_diameter_mm,
        selection_mode: SelectionMode::KeepCurrent,
        ..inner
    };
    let again = compute_design(&mean, &data).unwrap();
    assert_eq!(again.wire_diameter_mm, design.wire_diameter_mm);
    assert!((again.mean_diameter_mm - design.mean_diameter_mm).abs() < 1e-6);
}

#[test]
fn test_converged_design_is_a_fixed_point() {
    let data = builtin();
    let first = compute_design(&piano_wire(20.0, 30.0), &data).unwrap();

    let rerun = SpringInput {
        wire_diameter_mm: first.wire_diameter_mm,
        selection_mode: SelectionMode::KeepCurrent,
        ..first.input.clone()
    };
    let second = compute_design(&rerun, &data).unwrap();

    assert_eq!(second.wire_diameter_mm, first.wire_diameter_mm);
    assert!((second.mean_diameter_mm - first.mean_diameter_mm).abs() < 1e-9);
    assert!(second.convergence.converged);
    assert_eq!(second.convergence.iterations, 1);
}

#[test]
fn test_minimum_wire_grows_with_load() {
    let data = builtin();
    let mut previous = 0.0;
    for load in [2.0, 5.0, 10.0, 20.0, 40.0, 80.0] {
        let design = compute_design(&piano_wire(20.0, load), &data).unwrap();
        assert!(
            design.d_min_mm() >= previous,
            "d_min dropped at F = {}: {} < {}",
            load,
            design.d_min_mm(),
            previous
        );
        previous = design.d_min_mm();
    }
}

#[test]
fn test_end_type_branching() {
    let data = builtin();
    for end_type in ["CUT", "CUT_GROUND"] {
        let input = SpringInput {
            end_type: end_type.to_string(),
            dead_turns: 3.0,
            ..piano_wire(20.0, 30.0)
        };
        let design = compute_design(&input, &data).unwrap();
        assert_eq!(design.turns.dead_turns, 0.0, "{}", end_type);
        assert_eq!(design.turns.active_turns, design.turns.total_turns, "{}", end_type);
    }
    for end_type in ["CLOSED", "CLOSED_GROUND"] {
        let input = SpringInput {
            end_type: end_type.to_string(),
            dead_turns: 0.0,
            ..piano_wire(20.0, 30.0)
        };
        let design = compute_design(&input, &data).unwrap();
        let minimum = data.end_type(end_type).value().dead_coils.minimum;
        assert!(design.turns.dead_turns >= minimum, "{}", end_type);
    }
}

#[test]
fn test_custom_diameter_domain() {
    let data = with_diameters(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    for load in [1.0, 15.0, 30.0, 60.0] {
        let design = compute_design(&piano_wire(20.0, load), &data).unwrap();
        assert!(
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0].contains(&design.wire_diameter_mm),
            "d = {} at F = {}",
            design.wire_diameter_mm,
            load
        );
        assert!(design.convergence.iterations <= 10);
    }
}

#[test]
fn test_empty_reference_data_still_computes() {
    let data = ReferenceData::empty();
    let design = compute_design(&piano_wire(20.0, 30.0), &data).unwrap();

    assert!(!design.fallbacks.is_empty());
    assert!(spring_core::reference::fallback::WIRE_DIAMETERS.contains(&design.wire_diameter_mm));
}

#[test]
fn test_settings_change_alert_thresholds() {
    let data = builtin();
    let slender = SpringInput {
        height_under_load_mm: 120.0,
        max_solid_length_mm: 60.0,
        ..piano_wire(10.0, 5.0)
    };
    let strict = compute_design(&slender, &data).unwrap();
    assert!(has_alert(&strict.alerts, "alert.guidance"));

    let relaxed = EngineSettings {
        guidance_ratio: 100.0,
        ..EngineSettings::default()
    };
    let design = compute_design_with(&slender, &data, &relaxed).unwrap();
    assert!(!has_alert(&design.alerts, "alert.guidance"));
}

#[test]
fn test_session_to_project_file() {
    let data = builtin();
    let settings = EngineSettings::default();
    let mut session = DesignSession::new(&data, settings.clone(), piano_wire(20.0, 30.0)).unwrap();
    session.set_end_type("CLOSED").unwrap();
    session.set_diameter_type(DiameterType::Outer).unwrap();

    let design = session.design().clone();
    let plan = HelixPlan::new(&design, &Representation::Free, &settings);
    assert!((plan.display.display_height_mm - design.turns.free_length_mm).abs() < 1e-12);

    let mut project = Project::new("Designer", "26-007", "Valve Co");
    let mut item = project.new_spring("V-1");
    item.representation = Representation::custom_height(&design, 70.0);
    item.apply(&design, true).unwrap();
    let id = project.add_spring(item);

    let path = std::env::temp_dir().join(format!("spring_scenario_{}.spring", std::process::id()));
    save_project(&project, &path).unwrap();
    let loaded = load_project(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let stored = loaded.get_spring(&id).unwrap();
    let props = stored.applied.as_ref().unwrap();
    assert_eq!(props.extreme_turns, "CLOSED");
    assert_eq!(props.diameter_type, DiameterType::Outer);
    assert!((props.wire_diameter - design.wire_diameter_mm).abs() < 1e-12);
    assert_eq!(stored.input.end_type, "CLOSED");
    assert!((stored.input.target_diameter_mm - design.input.target_diameter_mm).abs() < 1e-9);
    assert!(matches!(stored.representation, Representation::CustomHeight { height_mm, .. } if height_mm == 70.0));
}
