//! Plain-text reports for the terminal.

use spring_core::calculations::design::SpringDesign;
use spring_core::file_io::LockInfo;
use spring_core::helix::HelixPlan;
use spring_core::project::{Project, SpringItem};
use spring_core::reference::ReferenceData;
use spring_core::representation::LoadCurve;

const RULE: &str = "═══════════════════════════════════════";

fn status_icon(pass: bool) -> &'static str {
    if pass {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

pub fn print_design(design: &SpringDesign) {
    let input = &design.input;
    let s = &design.stress;
    let t = &design.turns;

    println!("{}", RULE);
    println!("  COMPRESSION SPRING (EN 13906-1)");
    println!("{}", RULE);
    println!();
    println!("Input:");
    println!("  Material:      {}", input.material);
    println!("  Service:       {}", input.service_class);
    println!("  End type:      {}", input.end_type);
    println!(
        "  Target:        {} = {:.2} mm",
        input.diameter_type, input.target_diameter_mm
    );
    println!("  Load:          {:.2} daN", input.load_dan);
    println!("  Height (load): {:.2} mm", input.height_under_load_mm);
    println!("  Max solid:     {:.2} mm", input.max_solid_length_mm);
    println!();
    println!("Geometry:");
    println!(
        "  d = {:.2} mm   Dm = {:.2} mm   Di = {:.2} mm   De = {:.2} mm",
        design.wire_diameter_mm, design.mean_diameter_mm, design.inner_diameter_mm, design.outer_diameter_mm
    );
    if design.is_target_adjusted() {
        println!(
            "  {} adjusted to {:.2} mm to keep Dm > d",
            input.diameter_type,
            design.target_diameter_mm()
        );
    }
    println!("  c = Dm/d = {:.2}", s.spring_index);
    println!(
        "  nt = {:.2}   n = {:.2}   nm = {:.2} per end   ({})",
        t.total_turns,
        t.active_turns,
        t.dead_turns,
        if design.grinding { "ground" } else { "not ground" }
    );
    println!(
        "  L0 = {:.2} mm   Lc = {:.2} mm   f = {:.2} mm",
        t.free_length_mm, t.solid_length_mm, t.deflection_mm
    );
    println!("  R = {:.4} daN/mm", t.spring_rate);
    println!("  Winding: {}", input.handedness);
    println!();
    println!("Stress:");
    println!("  Rm = {:.1} daN/mm²   τ_adm = {:.1} daN/mm²", s.rm_dan_mm2, s.tau_adm);
    if design.severe {
        println!("  K = {:.3}   τ_adm,eff = {:.1} daN/mm²", s.bergstrasser_k, s.tau_adm_eff);
    }
    println!(
        "  τ = {:.1} daN/mm²   ({:.0}%) {}",
        s.tau_real,
        design.utilization_pct,
        status_icon(s.tau_real <= s.tau_adm_eff)
    );
    println!(
        "  d_min = {:.3} mm {}",
        s.d_min_mm,
        status_icon(design.wire_diameter_mm >= s.d_min_mm)
    );
    println!(
        "  Set to solid: τ = {:.1} / {:.1} daN/mm² {}",
        design.set_solid.tau_solid,
        design.set_solid.tau_solid_adm,
        status_icon(design.set_solid.passes())
    );

    let curve = LoadCurve::of(design);
    println!("  Load at solid: {:.2} daN", curve.max_load());
    println!();

    if !design.convergence.converged {
        println!(
            "Sizing did not converge after {} iteration(s).",
            design.convergence.iterations
        );
        println!();
    }
    if !design.fallbacks.is_empty() {
        println!("Defaults used:");
        for f in &design.fallbacks {
            println!("  {} for '{}'", f.lookup, f.key);
        }
        println!();
    }

    if design.has_alerts() {
        println!("Alerts:");
        for alert in &design.alerts {
            println!("  {}", alert);
        }
        println!();
    }

    println!("{}", RULE);
    println!("  RESULT: {}", if design.is_valid() { "VALID" } else { "CHECK ALERTS" });
    println!("{}", RULE);
}

pub fn print_plan(plan: &HelixPlan) {
    println!();
    println!("3D build plan at {:.2} mm:", plan.display.display_height_mm);
    println!(
        "  Profile: Ø{:.3} mm at r = {:.2} mm, z = {:.2} mm",
        plan.profile.diameter_mm, plan.profile.radius_offset_mm, plan.profile.center_height_mm
    );
    println!(
        "  Active helix: pitch {:.2} mm, height {:.2} mm, {:.2} turns",
        plan.main.pitch_mm, plan.main.height_mm, plan.main.turns
    );
    if let Some((lower, _)) = &plan.dead {
        println!(
            "  Dead helices: pitch {:.2} mm, height {:.2} mm, {:.2} turns at each end",
            lower.pitch_mm, lower.height_mm, lower.turns
        );
    }
    if !plan.grinding_planes_mm.is_empty() {
        let planes: Vec<String> = plan.grinding_planes_mm.iter().map(|z| format!("{:.2}", z)).collect();
        println!("  Grinding planes at z = {} mm", planes.join(", "));
    }
    println!("  Winding: {}", plan.handedness);
}

pub fn print_reference(data: &ReferenceData, table: crate::Table) {
    use crate::Table;

    match table {
        Table::Materials => {
            for m in data.materials.iter() {
                let rm = m.rm_table.first().map(|r| r.rm_dan_mm2).unwrap_or(0.0);
                println!(
                    "{:<20} G = {:>6.0} daN/mm²  Rm(d min) = {:>5.0} daN/mm²  {}",
                    m.key, m.shear_modulus_dan_mm2, rm, m.info.description
                );
            }
        }
        Table::Services => {
            for s in data.services.iter() {
                println!(
                    "{:<20} {:<16} {}{}",
                    s.key,
                    s.stress_factor_key,
                    s.description,
                    if s.severe { " (Bergsträsser)" } else { "" }
                );
            }
        }
        Table::EndTypes => {
            for e in data.end_types.ordered() {
                let dead = if e.dead_coils.allows_dead_coils() {
                    format!("≥ {} dead coil(s)", e.dead_coils.minimum)
                } else {
                    "no dead coils".to_string()
                };
                println!(
                    "{:<16} {:<20} {:<12} {}",
                    e.key,
                    dead,
                    if e.is_ground() { "ground" } else { "" },
                    e.description
                );
            }
        }
        Table::Diameters => {
            let values: Vec<String> = data
                .wire_diameters()
                .value()
                .iter()
                .map(|d| d.to_string())
                .collect();
            println!("{}", values.join(" "));
        }
    }
    for issue in &data.issues {
        eprintln!("warning: {}", issue);
    }
}

pub fn print_project(project: &Project, lock: Option<&LockInfo>) {
    println!("{}", RULE);
    println!("  PROJECT {} ({})", project.meta.job_id, project.meta.client);
    println!("{}", RULE);
    if let Some(lock) = lock {
        println!(
            "Locked by {} since {}",
            lock.holder(),
            lock.locked_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    println!("Designer: {}", project.meta.designer);
    println!("Modified: {}", project.meta.modified.format("%Y-%m-%d %H:%M UTC"));
    println!("Springs:  {}", project.spring_count());
    println!();

    let mut items: Vec<&SpringItem> = project.springs.values().collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    for item in items {
        match &item.applied {
            Some(p) => println!(
                "  {:<12} d = {:.2}  Dm = {:.2}  n = {:.2}  L0 = {:.2}  R = {:.3}  [{}]",
                item.label,
                p.wire_diameter,
                p.mean_diameter,
                p.active_turns_qty,
                p.free_length,
                p.spring_rate,
                item.representation.label()
            ),
            None => println!("  {:<12} (not applied)", item.label),
        }
    }
}
