//! # Spring Calculations
//!
//! Compression spring sizing per EN 13906-1. The calculation follows the
//! pattern used throughout the crate:
//!
//! - [`SpringInput`] - input parameters (JSON-serializable), with `validate()`
//! - [`SpringDesign`] - computed spring (JSON-serializable)
//! - [`compute_design`] - pure function from input and reference data to design
//!
//! ## Building Blocks
//!
//! - [`stress`] - allowable stress, Bergsträsser correction, minimum wire diameter
//! - [`diameter`] - mean/inner/outer target conversions
//! - [`sizing`] - wire and mean diameter convergence loop
//! - [`turns`] - turn counts, solid length, rate and free length
//! - [`alerts`] - validity checks
//! - [`design`] - orchestration and the persistent property record

pub mod alerts;
pub mod design;
pub mod diameter;
pub mod sizing;
pub mod stress;
pub mod turns;

pub use alerts::Alert;
pub use design::{compute_design, compute_design_with, Handedness, SpringDesign, SpringInput, SpringProperties};
pub use diameter::DiameterType;
pub use sizing::{Convergence, SelectionMode};
