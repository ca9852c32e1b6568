//! Standard wire diameters
//!
//! The ordered picklist of manufacturable wire diameters. The sizing loop
//! filters it down to the diameters that satisfy the stress limit.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Number of largest diameters offered when nothing satisfies `d_min`
pub const OVERFLOW_CANDIDATES: usize = 5;

/// Ascending, distinct wire diameters (mm)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireDiameterTable(Vec<f64>);

impl WireDiameterTable {
    /// Build a table, rejecting unordered, duplicated or non-positive values.
    pub fn new(diameters: Vec<f64>) -> CalcResult<Self> {
        if let Some(bad) = diameters.iter().find(|d| !d.is_finite() || **d <= 0.0) {
            return Err(CalcError::invalid_reference(
                "wire_diameters",
                format!("diameter {} is not a positive number", bad),
            ));
        }
        if let Some(pair) = diameters.windows(2).find(|w| w[1] <= w[0]) {
            return Err(CalcError::invalid_reference(
                "wire_diameters",
                format!("diameters must be ascending and distinct ({} then {})", pair[0], pair[1]),
            ));
        }
        Ok(WireDiameterTable(diameters))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Diameters of `domain` that are at least `d_min`.
///
/// Never empty for a non-empty domain: when nothing qualifies, the largest
/// [`OVERFLOW_CANDIDATES`] diameters are returned instead.
pub fn valid_diameters(domain: &[f64], d_min: f64) -> Vec<f64> {
    let valid: Vec<f64> = domain.iter().copied().filter(|d| *d >= d_min).collect();
    if !valid.is_empty() {
        return valid;
    }
    let start = domain.len().saturating_sub(OVERFLOW_CANDIDATES);
    domain[start..].to_vec()
}

/// Pick a wire diameter from `valid` (as returned by [`valid_diameters`]).
///
/// With `keep` set, the previous selection survives if it is still in the
/// valid list and at least `d_min`; otherwise the smallest valid diameter wins.
pub fn select_diameter(valid: &[f64], d_min: f64, keep: Option<f64>) -> Option<f64> {
    if let Some(current) = keep {
        if current >= d_min && valid.iter().any(|d| (d - current).abs() < 1e-9) {
            return Some(current);
        }
    }
    valid.first().copied()
}
