//! # Target Diameter Normalization
//!
//! The designer specifies one of three coil diameters. The engine always works
//! on the mean diameter `Dm`; this module projects between the two.
//!
//! | Type  | Dm from target | target from Dm |
//! |-------|----------------|----------------|
//! | Mean  | `target`       | `Dm`           |
//! | Inner | `target + d`   | `Dm − d`       |
//! | Outer | `target − d`   | `Dm + d`       |
//!
//! ## Example
//!
//! ```rust
//! use spring_core::calculations::diameter::DiameterType;
//!
//! // 18 mm bore, 2 mm wire -> 20 mm mean
//! assert_eq!(DiameterType::Inner.mean_from_target(18.0, 2.0), 20.0);
//!
//! // Switch the same spring to an outer-diameter target
//! let outer = DiameterType::Inner.retarget(18.0, 2.0, DiameterType::Outer);
//! assert_eq!(outer, 22.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// Which coil diameter the target value refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiameterType {
    #[default]
    Mean,
    Inner,
    Outer,
}

impl DiameterType {
    pub const ALL: [DiameterType; 3] = [DiameterType::Mean, DiameterType::Inner, DiameterType::Outer];

    /// Mean diameter for a target of this type and wire diameter `d`
    pub fn mean_from_target(self, target_mm: f64, d_mm: f64) -> f64 {
        match self {
            DiameterType::Mean => target_mm,
            DiameterType::Inner => target_mm + d_mm,
            DiameterType::Outer => target_mm - d_mm,
        }
    }

    /// Target value of this type describing mean diameter `dm`
    pub fn target_from_mean(self, dm_mm: f64, d_mm: f64) -> f64 {
        match self {
            DiameterType::Mean => dm_mm,
            DiameterType::Inner => dm_mm - d_mm,
            DiameterType::Outer => dm_mm + d_mm,
        }
    }

    /// Re-express a target of this type as a target of type `to`, holding Dm.
    pub fn retarget(self, target_mm: f64, d_mm: f64, to: DiameterType) -> f64 {
        if self == to {
            return target_mm;
        }
        to.target_from_mean(self.mean_from_target(target_mm, d_mm), d_mm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiameterType::Mean => "Dm",
            DiameterType::Inner => "Di",
            DiameterType::Outer => "De",
        }
    }
}

impl fmt::Display for DiameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiameterType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dm" | "mean" => Ok(DiameterType::Mean),
            "di" | "inner" => Ok(DiameterType::Inner),
            "de" | "outer" => Ok(DiameterType::Outer),
            _ => Err(CalcError::invalid_input(
                "diameter_type",
                s,
                "Expected one of Dm, Di, De (mean, inner, outer)",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection() {
        assert_eq!(DiameterType::Mean.mean_from_target(20.0, 2.0), 20.0);
        assert_eq!(DiameterType::Inner.mean_from_target(18.0, 2.0), 20.0);
        assert_eq!(DiameterType::Outer.mean_from_target(22.0, 2.0), 20.0);
    }

    #[test]
    fn test_inner_mean_round_trip() {
        for &(target, d) in &[(18.0, 2.0), (7.3, 0.8), (123.456, 5.5)] {
            let dm = DiameterType::Inner.mean_from_target(target, d);
            let back = DiameterType::Inner.target_from_mean(dm, d);
            assert!((back - target).abs() < 1e-6);

            let as_mean = DiameterType::Inner.retarget(target, d, DiameterType::Mean);
            assert!((as_mean - dm).abs() < 1e-6);
        }
    }

    #[test]
    fn test_retarget_holds_mean() {
        let d = 2.5;
        for from in DiameterType::ALL {
            for to in DiameterType::ALL {
                let t = from.retarget(30.0, d, to);
                let dm_before = from.mean_from_target(30.0, d);
                let dm_after = to.mean_from_target(t, d);
                assert!((dm_before - dm_after).abs() < 1e-9, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_same_type_is_noop() {
        assert_eq!(DiameterType::Outer.retarget(22.0, 2.0, DiameterType::Outer), 22.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Di".parse::<DiameterType>().unwrap(), DiameterType::Inner);
        assert_eq!("outer".parse::<DiameterType>().unwrap(), DiameterType::Outer);
        assert_eq!(" dm ".parse::<DiameterType>().unwrap(), DiameterType::Mean);
        assert!("radius".parse::<DiameterType>().is_err());
    }
}
