//! # Display Configurations
//!
//! A spring model is shown at one height: free, under load, solid, or at a
//! custom height or load. This module turns a [`SpringDesign`] and a chosen
//! [`Representation`] into the display height, active coil height and pitch
//! the geometry builder consumes.
//!
//! Custom configurations always carry a synchronized (height, load) pair so
//! switching between "custom height" and "custom load" keeps both in step.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::calculations::design::{compute_design, SpringInput};
//! use spring_core::reference::ReferenceData;
//! use spring_core::representation::{DisplayGeometry, Representation};
//!
//! let data = ReferenceData::builtin().unwrap();
//! let design = compute_design(&SpringInput::default(), &data).unwrap();
//!
//! let rep = Representation::custom_load(&design, 5.0);
//! let geometry = DisplayGeometry::new(&design, &rep);
//! assert!(geometry.display_height_mm <= design.turns.free_length_mm);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::design::SpringDesign;

/// Load/height relation of a computed spring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadCurve {
    pub spring_rate: f64,
    pub free_length_mm: f64,
    pub height_under_load_mm: f64,
    pub solid_length_mm: f64,
}

impl LoadCurve {
    pub fn of(design: &SpringDesign) -> Self {
        LoadCurve {
            spring_rate: design.turns.spring_rate,
            free_length_mm: design.turns.free_length_mm,
            height_under_load_mm: design.input.height_under_load_mm,
            solid_length_mm: design.turns.solid_length_mm,
        }
    }

    /// Load at the height under load, `R·(L0 − H)`
    pub fn nominal_load(&self) -> f64 {
        if self.free_length_mm > self.height_under_load_mm {
            self.spring_rate * (self.free_length_mm - self.height_under_load_mm)
        } else {
            0.0
        }
    }

    /// Load at solid, `R·(L0 − Lc)`; twice the nominal load when L0 ≤ Lc
    pub fn max_load(&self) -> f64 {
        if self.free_length_mm > self.solid_length_mm {
            self.spring_rate * (self.free_length_mm - self.solid_length_mm)
        } else {
            2.0 * self.nominal_load()
        }
    }

    /// Load at height `h`, within `[0, max_load]`
    pub fn load_at_height(&self, height_mm: f64) -> f64 {
        let load = self.spring_rate * (self.free_length_mm - height_mm);
        load.max(0.0).min(self.max_load())
    }

    /// Height at load `F`, within `[Lc, L0]`; the height under load if R ≤ 0
    pub fn height_at_load(&self, load_dan: f64) -> f64 {
        if self.spring_rate <= 0.0 {
            return self.height_under_load_mm;
        }
        self.clamp_height(self.free_length_mm - load_dan / self.spring_rate)
    }

    /// Bring a height into `[Lc, L0]`. An impossible spring (L0 < Lc) pins to Lc.
    pub fn clamp_height(&self, height_mm: f64) -> f64 {
        height_mm.min(self.free_length_mm).max(self.solid_length_mm)
    }
}

/// Which configuration the model shows
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum Representation {
    /// Free length L0
    Free,
    /// Height under load H
    #[default]
    Loaded,
    /// Maximum solid length Lc_max
    Solid,
    /// Height chosen by the user, with its load
    CustomHeight { height_mm: f64, load_dan: f64 },
    /// Load chosen by the user, with its height
    CustomLoad { load_dan: f64, height_mm: f64 },
}

impl Representation {
    /// Custom height, held within `[Lc, L0]`
    pub fn custom_height(design: &SpringDesign, height_mm: f64) -> Self {
        let curve = LoadCurve::of(design);
        let height_mm = curve.clamp_height(height_mm);
        let load_dan = if curve.spring_rate > 0.0 {
            curve.load_at_height(height_mm)
        } else {
            curve.nominal_load()
        };
        Representation::CustomHeight { height_mm, load_dan }
    }

    /// Custom load, held within `[0, max_load]`
    pub fn custom_load(design: &SpringDesign, load_dan: f64) -> Self {
        let curve = LoadCurve::of(design);
        let load_dan = load_dan.max(0.0).min(curve.max_load());
        let height_mm = curve.height_at_load(load_dan);
        Representation::CustomLoad { load_dan, height_mm }
    }

    /// Re-synchronize a custom pair against a recomputed design.
    ///
    /// Custom height keeps the height, custom load keeps the load.
    pub fn refreshed(&self, design: &SpringDesign) -> Self {
        match *self {
            Representation::CustomHeight { height_mm, .. } => Self::custom_height(design, height_mm),
            Representation::CustomLoad { load_dan, .. } => Self::custom_load(design, load_dan),
            other => other,
        }
    }

    /// Model height for this configuration (mm)
    pub fn display_height(&self, design: &SpringDesign) -> f64 {
        match *self {
            Representation::Free => design.turns.free_length_mm,
            Representation::Loaded => design.input.height_under_load_mm,
            Representation::Solid => design.input.max_solid_length_mm,
            Representation::CustomHeight { height_mm, .. } => height_mm,
            Representation::CustomLoad { height_mm, .. } => height_mm,
        }
    }

    pub fn label(&self) -> String {
        match *self {
            Representation::Free => "Free".to_string(),
            Representation::Loaded => "Loaded".to_string(),
            Representation::Solid => "Solid".to_string(),
            Representation::CustomHeight { height_mm, .. } => format!("Height {:.2} mm", height_mm),
            Representation::CustomLoad { load_dan, .. } => format!("Load {:.2} daN", load_dan),
        }
    }
}

/// Heights used to build the model at one configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayGeometry {
    pub display_height_mm: f64,
    /// Height taken by the active coils
    pub active_height_mm: f64,
    /// Active coil pitch
    pub pitch_mm: f64,
}

impl DisplayGeometry {
    pub fn new(design: &SpringDesign, representation: &Representation) -> Self {
        Self::at_height(design, representation.display_height(design))
    }

    pub fn at_height(design: &SpringDesign, display_height_mm: f64) -> Self {
        let d = design.wire_diameter_mm;
        let dead_total = 2.0 * design.turns.dead_turns * d;
        // Unground ends stack an extra wire diameter
        let active_height_mm = if design.grinding {
            display_height_mm - dead_total
        } else {
            display_height_mm - dead_total - d
        };
        let n = design.turns.active_turns;
        let pitch_mm = if n > 0.0 { active_height_mm / n } else { 0.0 };

        DisplayGeometry {
            display_height_mm,
            active_height_mm,
            pitch_mm,
        }
    }
}
