//! # Turn Counts and Heights
//!
//! Derives total, dead and active turns from the allowed solid length, then
//! the spring rate, deflection and free length.
//!
//! Total turns are rounded down to a quarter turn so the real solid length
//! never exceeds the allowed one. Ground ends lose half a wire at each end,
//! so their solid length is `nt·d`; other ends stack to `(nt + 1)·d`.

use serde::{Deserialize, Serialize};

use crate::reference::EndTypeSpec;

/// Lower bound on active turns
pub const MIN_ACTIVE_TURNS: f64 = 0.5;

/// Inputs to the turn derivation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnInput {
    pub d_mm: f64,
    pub dm_mm: f64,
    pub load_dan: f64,
    pub height_under_load_mm: f64,
    pub max_solid_length_mm: f64,
    /// Requested dead turns per end
    pub requested_dead_turns: f64,
    /// Shear modulus G (daN/mm²)
    pub shear_modulus: f64,
}

/// Derived heights stored with the design
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnHeights {
    /// Active coil height under load, `H − 2·nm·d`
    pub active_mm: f64,
    /// Dead coil height per end, `nm·d`
    pub dead_mm: f64,
    /// Active coil height at solid, `n·d`
    pub min_active_mm: f64,
    /// Active coil height when free, `L0 − 2·nm·d`
    pub max_active_mm: f64,
}

/// Turn counts, lengths and stiffness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnGeometry {
    pub total_turns: f64,
    pub dead_turns: f64,
    pub active_turns: f64,
    /// Real solid length Lc (mm)
    pub solid_length_mm: f64,
    /// Spring rate R (daN/mm)
    pub spring_rate: f64,
    /// Deflection under load f (mm)
    pub deflection_mm: f64,
    /// Free length L0 (mm)
    pub free_length_mm: f64,
    pub heights: TurnHeights,
}

/// Total turns and real solid length for a maximum solid length
pub fn total_turns(d_mm: f64, max_solid_length_mm: f64, ground: bool) -> (f64, f64) {
    if d_mm <= 0.0 {
        return (1.0, d_mm);
    }
    let nt_quarter = (4.0 * max_solid_length_mm / d_mm).floor() / 4.0;
    if ground {
        (nt_quarter, nt_quarter * d_mm)
    } else {
        let nt = nt_quarter - 1.0;
        (nt, (nt + 1.0) * d_mm)
    }
}

/// Spring rate `R = G·d⁴ / (8·Dm³·n)`, zero when Dm or n is not positive
pub fn spring_rate(shear_modulus: f64, d_mm: f64, dm_mm: f64, active_turns: f64) -> f64 {
    if dm_mm > 0.0 && active_turns > 0.0 {
        shear_modulus * d_mm.powi(4) / (8.0 * dm_mm.powi(3) * active_turns)
    } else {
        0.0
    }
}

pub fn derive(input: &TurnInput, end_type: &EndTypeSpec) -> TurnGeometry {
    let d = input.d_mm;
    let (nt, lc) = total_turns(d, input.max_solid_length_mm, end_type.is_ground());
    let nm = end_type.dead_turns(input.requested_dead_turns);
    let n = (nt - 2.0 * nm).max(MIN_ACTIVE_TURNS);

    let r = spring_rate(input.shear_modulus, d, input.dm_mm, n);
    let f = if r > 0.0 { input.load_dan / r } else { 0.0 };
    let l0 = input.height_under_load_mm + f;

    TurnGeometry {
        total_turns: nt,
        dead_turns: nm,
        active_turns: n,
        solid_length_mm: lc,
        spring_rate: r,
        deflection_mm: f,
        free_length_mm: l0,
        heights: TurnHeights {
            active_mm: input.height_under_load_mm - 2.0 * nm * d,
            dead_mm: nm * d,
            min_active_mm: n * d,
            max_active_mm: l0 - 2.0 * nm * d,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::DeadCoilRule;

    fn end(ground: bool, rule: DeadCoilRule) -> EndTypeSpec {
        EndTypeSpec {
            key: "T".to_string(),
            dead_coils: rule,
            grinding_required: ground,
            description: String::new(),
        }
    }

    fn input(d: f64, nm: f64) -> TurnInput {
        TurnInput {
            d_mm: d,
            dm_mm: 20.0,
            load_dan: 30.0,
            height_under_load_mm: 80.0,
            max_solid_length_mm: 60.0,
            requested_dead_turns: nm,
            shear_modulus: 8150.0,
        }
    }

    #[test]
    fn test_total_turns_quarter_rounding() {
        // 4 × 60 / 3.5 = 68.57 -> 68 quarters
        let (nt, lc) = total_turns(3.5, 60.0, true);
        assert_eq!(nt, 17.0);
        assert!((lc - 59.5).abs() < 1e-9);

        let (nt, lc) = total_turns(3.5, 60.0, false);
        assert_eq!(nt, 16.0);
        assert!((lc - 59.5).abs() < 1e-9);

        // 4 × 10 / 3 = 13.33 -> 13 quarters
        let (nt, _) = total_turns(3.0, 10.0, true);
        assert_eq!(nt, 3.25);
    }

    #[test]
    fn test_total_turns_zero_wire() {
        assert_eq!(total_turns(0.0, 60.0, true), (1.0, 0.0));
    }

    #[test]
    fn test_solid_length_never_exceeds_allowed() {
        for &d in &[0.5, 0.8, 1.2, 2.2, 3.0, 4.5, 7.0] {
            for &ground in &[true, false] {
                let (_, lc) = total_turns(d, 47.3, ground);
                assert!(lc <= 47.3 + 1e-9, "d = {}, ground = {}", d, ground);
            }
        }
    }

    #[test]
    fn test_cut_ends_have_no_dead_turns() {
        let g = derive(&input(3.0, 2.0), &end(true, DeadCoilRule::NONE));
        assert_eq!(g.dead_turns, 0.0);
        assert_eq!(g.active_turns, g.total_turns);
    }

    #[test]
    fn test_closed_ends_respect_minimum() {
        let g = derive(&input(3.0, 0.0), &end(false, DeadCoilRule::at_least(1.0)));
        assert_eq!(g.dead_turns, 1.0);
        assert_eq!(g.active_turns, g.total_turns - 2.0);
    }

    #[test]
    fn test_active_turns_floor() {
        // 4 × 6 / 3 = 8 quarters = 2 turns, minus 2 × 3 dead turns
        let mut i = input(3.0, 3.0);
        i.max_solid_length_mm = 6.0;
        let g = derive(&i, &end(true, DeadCoilRule::at_least(1.0)));
        assert_eq!(g.active_turns, MIN_ACTIVE_TURNS);
    }

    #[test]
    fn test_rate_deflection_free_length() {
        let g = derive(&input(3.0, 1.0), &end(true, DeadCoilRule::at_least(1.0)));
        // nt = 20, n = 18
        assert_eq!(g.total_turns, 20.0);
        assert_eq!(g.active_turns, 18.0);
        let r = 8150.0 * 81.0 / (8.0 * 8000.0 * 18.0);
        assert!((g.spring_rate - r).abs() < 1e-9);
        assert!((g.deflection_mm - 30.0 / r).abs() < 1e-9);
        assert!((g.free_length_mm - (80.0 + 30.0 / r)).abs() < 1e-9);

        assert!((g.heights.active_mm - 74.0).abs() < 1e-9);
        assert!((g.heights.dead_mm - 3.0).abs() < 1e-9);
        assert!((g.heights.min_active_mm - 54.0).abs() < 1e-9);
        assert!((g.heights.max_active_mm - (g.free_length_mm - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_guards() {
        assert_eq!(spring_rate(8150.0, 3.0, 0.0, 10.0), 0.0);
        assert_eq!(spring_rate(8150.0, 3.0, 20.0, 0.0), 0.0);
    }
}
