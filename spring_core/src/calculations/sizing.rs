//! # Wire Diameter Sizing
//!
//! Wire diameter and mean diameter depend on each other: the minimum wire
//! diameter grows with Dm, and for inner/outer targets Dm moves with the
//! chosen wire. This module iterates the two to a fixed point over the
//! standard wire diameter table.
//!
//! ## Iteration
//!
//! 1. Guard `Dm > d` (reset to `d + 1`).
//! 2. Evaluate the stress state and `d_min` at `(d, Dm)`.
//! 3. Filter the diameter table to `≥ d_min` and pick a diameter.
//! 4. Re-project Dm from the target with the new wire.
//! 5. Stop when both moved less than the tolerance.
//!
//! The loop is bounded; hitting the cap is reported through [`Convergence`]
//! rather than treated as an error.

use serde::{Deserialize, Serialize};

use super::diameter::DiameterType;
use super::stress::{StressBasis, StressState};
use crate::reference::wire_diameters::{select_diameter, valid_diameters};

/// Wire diameter used when the candidate is not a usable number (mm)
pub const FALLBACK_WIRE_DIAMETER: f64 = 1.0;

/// Clearance added to `d` when Dm collapses onto the wire (mm)
const MEAN_DIAMETER_CLEARANCE: f64 = 1.0;

/// How the wire diameter is picked from the valid list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Keep the current wire if it still satisfies the stress limit
    #[default]
    KeepCurrent,
    /// Always take the smallest admissible wire
    ForceMinimum,
}

/// Outcome of the convergence loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Convergence {
    /// Iterations run (1..=cap)
    pub iterations: u32,
    /// Loop met the tolerance and the final selection did not move the wire
    pub converged: bool,
}

/// Everything the sizing loop needs, resolved from reference data.
pub struct SizingProblem<'a> {
    pub target_mm: f64,
    pub diameter_type: DiameterType,
    pub basis: StressBasis,
    /// Ascending wire diameter domain
    pub domain: &'a [f64],
    /// Tensile strength as a function of wire diameter
    pub rm_at: &'a dyn Fn(f64) -> f64,
    pub max_iterations: u32,
    pub tolerance: f64,
}

/// Sized (d, Dm) pair with its final stress state
#[derive(Debug, Clone, PartialEq)]
pub struct SizingOutcome {
    pub d_mm: f64,
    pub dm_mm: f64,
    pub stress: StressState,
    /// Diameters ≥ d_min at the final state (with the overflow fallback)
    pub valid_diameters: Vec<f64>,
    pub convergence: Convergence,
}

/// Sanitize a wire diameter candidate: non-finite or non-positive -> 1.0
pub fn sanitize_candidate(d_mm: f64) -> f64 {
    if d_mm.is_finite() && d_mm > 0.0 {
        d_mm
    } else {
        FALLBACK_WIRE_DIAMETER
    }
}

/// Mean diameter for wire `d`, kept strictly above `d`.
fn guarded_mean(target_mm: f64, diameter_type: DiameterType, d_mm: f64) -> f64 {
    let dm = diameter_type.mean_from_target(target_mm, d_mm);
    if dm <= d_mm {
        d_mm + MEAN_DIAMETER_CLEARANCE
    } else {
        dm
    }
}

impl SizingProblem<'_> {
    fn evaluate(&self, d_mm: f64, dm_mm: f64) -> StressState {
        StressState::evaluate(&self.basis, d_mm, dm_mm, (self.rm_at)(d_mm))
    }

    /// Run the convergence loop from `candidate`.
    pub fn solve(&self, candidate_mm: f64, mode: SelectionMode) -> SizingOutcome {
        let mut d = sanitize_candidate(candidate_mm);
        let mut dm = self.diameter_type.mean_from_target(self.target_mm, d);
        let mut iterations = 0;
        let mut loop_converged = false;

        let keep = |current: f64| match mode {
            SelectionMode::KeepCurrent => Some(current),
            SelectionMode::ForceMinimum => None,
        };

        while iterations < self.max_iterations {
            iterations += 1;

            if dm <= d {
                dm = d + MEAN_DIAMETER_CLEARANCE;
            }

            let state = self.evaluate(d, dm);
            let valid = valid_diameters(self.domain, state.d_min_mm);
            let d_new = select_diameter(&valid, state.d_min_mm, keep(d)).unwrap_or(d);

            let mut dm_new = self.diameter_type.mean_from_target(self.target_mm, d_new);
            if dm_new <= 0.0 {
                dm_new = d_new + MEAN_DIAMETER_CLEARANCE;
            }

            log::debug!(
                "sizing iteration {}: d {:.3} -> {:.3}, Dm {:.3} -> {:.3}, d_min {:.4}",
                iterations,
                d,
                d_new,
                dm,
                dm_new,
                state.d_min_mm
            );

            let settled = (d_new - d).abs() < self.tolerance && (dm_new - dm).abs() < self.tolerance;
            d = d_new;
            dm = dm_new;
            if settled {
                loop_converged = true;
                break;
            }
        }

        if dm <= d {
            dm = d + MEAN_DIAMETER_CLEARANCE;
        }
        let mut stress = self.evaluate(d, dm);
        let mut reselect_stable = true;

        if mode == SelectionMode::ForceMinimum {
            let valid = valid_diameters(self.domain, stress.d_min_mm);
            if let Some(d_min_pick) = select_diameter(&valid, stress.d_min_mm, None) {
                if (d_min_pick - d).abs() >= self.tolerance {
                    reselect_stable = false;
                    log::debug!("force-minimum reselected d {:.3} -> {:.3}", d, d_min_pick);
                    d = d_min_pick;
                    dm = guarded_mean(self.target_mm, self.diameter_type, d);
                    stress = self.evaluate(d, dm);
                }
            }
        }

        let convergence = Convergence {
            iterations,
            converged: loop_converged && reselect_stable,
        };
        if !convergence.converged {
            log::warn!(
                "wire diameter did not converge after {} iteration(s); using d = {:.3}, Dm = {:.3}",
                iterations,
                d,
                dm
            );
        }

        SizingOutcome {
            d_mm: d,
            dm_mm: dm,
            valid_diameters: valid_diameters(self.domain, stress.d_min_mm),
            stress,
            convergence,
        }
    }
}
