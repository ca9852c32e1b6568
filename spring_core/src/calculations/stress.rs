//! # Shear Stress and Minimum Wire Diameter
//!
//! Stress check for a helical compression spring at a given (d, Dm) pair.
//!
//! ## Formulas
//!
//! - Spring index `c = Dm / d`
//! - Bergsträsser factor `K = (c + 0.5) / (c - 0.75)` (2.0 for `c ≤ 0.75`)
//! - Allowable stress `τ_adm = Rm(d) × factor`
//! - Severe duty: `τ_adm_eff = τ_adm / K`, shear stress scaled by `K`
//! - Shear stress `τ = k × 2.55 × F × Dm / d³` (`2.55 ≈ 8/π`)
//! - Minimum wire diameter `d_min = (k × 2.55 × F × Dm / τ_adm_eff)^(1/3)`
//!
//! ## Example
//!
//! ```rust
//! use spring_core::calculations::stress::bergstrasser_factor;
//!
//! assert_eq!(bergstrasser_factor(0.5), 2.0);
//! let k = bergstrasser_factor(8.0);
//! assert!((k - 8.5 / 7.25).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

/// Shear stress constant `8/π`, rounded as in EN 13906-1 worked examples
pub const SHEAR_CONSTANT: f64 = 2.55;

/// Spring index used when the wire diameter is not positive
pub const DEFAULT_SPRING_INDEX: f64 = 10.0;

/// Curvature correction below this index is capped
const BERGSTRASSER_POLE: f64 = 0.75;

/// Bergsträsser stress correction factor for spring index `c`.
///
/// Total: any `c ≤ 0.75` (including zero and negative values) returns 2.0.
pub fn bergstrasser_factor(c: f64) -> f64 {
    if c <= BERGSTRASSER_POLE {
        2.0
    } else {
        (c + 0.5) / (c - BERGSTRASSER_POLE)
    }
}

/// Spring index `Dm / d`, or [`DEFAULT_SPRING_INDEX`] for `d ≤ 0`
pub fn spring_index(d_mm: f64, dm_mm: f64) -> f64 {
    if d_mm > 0.0 {
        dm_mm / d_mm
    } else {
        DEFAULT_SPRING_INDEX
    }
}

/// Material and duty inputs that stay fixed while d and Dm move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressBasis {
    /// Load F (daN)
    pub load_dan: f64,
    /// Allowable stress factor (fraction of Rm)
    pub stress_factor: f64,
    /// Severe duty: apply the Bergsträsser correction
    pub severe: bool,
}

/// Stress state at one (d, Dm) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressState {
    /// Tensile strength Rm(d) (daN/mm²)
    pub rm_dan_mm2: f64,
    /// Spring index c
    pub spring_index: f64,
    /// Bergsträsser factor K (computed for every duty, applied for severe only)
    pub bergstrasser_k: f64,
    /// Stress multiplier actually applied (K for severe duty, else 1)
    pub stress_coefficient: f64,
    /// Allowable stress τ_adm (daN/mm²)
    pub tau_adm: f64,
    /// Effective allowable stress τ_adm_eff (daN/mm²)
    pub tau_adm_eff: f64,
    /// Minimum admissible wire diameter (mm)
    pub d_min_mm: f64,
    /// Real shear stress τ (daN/mm²)
    pub tau_real: f64,
}

impl StressState {
    /// Evaluate the stress check at `(d, Dm)` with tensile strength `rm`.
    pub fn evaluate(basis: &StressBasis, d_mm: f64, dm_mm: f64, rm_dan_mm2: f64) -> Self {
        let c = spring_index(d_mm, dm_mm);
        let k = bergstrasser_factor(c);
        let tau_adm = rm_dan_mm2 * basis.stress_factor;

        let (coef, tau_adm_eff) = if basis.severe {
            (k, if k > 0.0 { tau_adm / k } else { tau_adm })
        } else {
            (1.0, tau_adm)
        };

        let d_min_mm = minimum_wire_diameter(coef, basis.load_dan, dm_mm, tau_adm_eff);

        let tau_real = if d_mm > 0.0 {
            coef * SHEAR_CONSTANT * basis.load_dan * dm_mm / d_mm.powi(3)
        } else {
            0.0
        };

        StressState {
            rm_dan_mm2,
            spring_index: c,
            bergstrasser_k: k,
            stress_coefficient: coef,
            tau_adm,
            tau_adm_eff,
            d_min_mm,
            tau_real,
        }
    }

    /// Utilization `τ / τ_adm_eff` in percent (0 when the allowable is not positive)
    pub fn utilization_pct(&self) -> f64 {
        if self.tau_adm_eff > 0.0 {
            self.tau_real / self.tau_adm_eff * 100.0
        } else {
            0.0
        }
    }

    pub fn is_overstressed(&self) -> bool {
        self.tau_real > self.tau_adm_eff
    }
}

/// Minimum wire diameter carrying `load` at mean diameter `dm` under
/// `tau_adm_eff`. Zero when any of the three is not positive.
pub fn minimum_wire_diameter(coef: f64, load_dan: f64, dm_mm: f64, tau_adm_eff: f64) -> f64 {
    if tau_adm_eff > 0.0 && dm_mm > 0.0 && load_dan > 0.0 {
        let val = coef * SHEAR_CONSTANT * load_dan * dm_mm / tau_adm_eff;
        if val > 0.0 {
            val.cbrt()
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// Uncorrected shear stress at solid, `2.55 × F_solid × Dm / d³`
pub fn solid_stress(load_at_solid_dan: f64, d_mm: f64, dm_mm: f64) -> f64 {
    if d_mm > 0.0 && load_at_solid_dan > 0.0 {
        SHEAR_CONSTANT * load_at_solid_dan * dm_mm / d_mm.powi(3)
    } else {
        0.0
    }
}
