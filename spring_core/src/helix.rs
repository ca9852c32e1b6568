//! # Helix Build Plan
//!
//! Plain-data description of the 3D spring model: one helix for the active
//! coils, one per end for the dead coils, the circular wire profile, and the
//! grinding cuts. A CAD host sweeps the profile along each helix; building the
//! solid is the host's job.

use serde::{Deserialize, Serialize};

use crate::calculations::design::{Handedness, SpringDesign};
use crate::config::EngineSettings;
use crate::representation::{DisplayGeometry, Representation};

/// Dead coil counts at or below this are treated as none
pub const DEAD_TURNS_EPSILON: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelixSegment {
    pub pitch_mm: f64,
    pub height_mm: f64,
    pub turns: f64,
    /// Wound downward from its base face
    pub reversed: bool,
}

/// Wire cross-section swept along the helices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileCircle {
    /// Distance of the circle centre from the spring axis (Dm / 2)
    pub radius_offset_mm: f64,
    /// Height of the circle centre above the base plane
    pub center_height_mm: f64,
    /// Circle diameter (adjusted wire diameter)
    pub diameter_mm: f64,
}

/// Everything a host needs to build the spring at one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelixPlan {
    /// Wire diameter scaled down to keep touching coils apart
    pub adjusted_wire_diameter_mm: f64,
    pub profile: ProfileCircle,
    pub main: HelixSegment,
    /// (lower, upper) dead coil helices, present only with dead coils
    pub dead: Option<(HelixSegment, HelixSegment)>,
    /// Heights of the planes that grind the ends flat
    pub grinding_planes_mm: Vec<f64>,
    /// Heights of the local coordinate systems (bottom, top)
    pub local_frames_mm: [f64; 2],
    pub handedness: Handedness,
    pub display: DisplayGeometry,
}

impl HelixPlan {
    pub fn new(design: &SpringDesign, representation: &Representation, settings: &EngineSettings) -> Self {
        let display = DisplayGeometry::new(design, representation);
        let d = design.wire_diameter_mm;
        let adjusted = d * settings.wire_adjustment;
        let nm = design.turns.dead_turns;
        let has_dead = nm > DEAD_TURNS_EPSILON;

        let center_height_mm = match (has_dead, design.grinding) {
            (false, false) => adjusted / 2.0,
            (false, true) => 0.0,
            (true, true) => nm * adjusted,
            (true, false) => nm * adjusted + adjusted / 2.0,
        };

        let main = HelixSegment {
            pitch_mm: display.pitch_mm,
            height_mm: display.active_height_mm,
            turns: design.turns.active_turns,
            reversed: false,
        };

        let dead = has_dead.then(|| {
            let segment = HelixSegment {
                pitch_mm: d,
                height_mm: nm * d,
                turns: nm,
                reversed: true,
            };
            (segment, HelixSegment { reversed: false, ..segment })
        });

        let grinding_planes_mm = if design.grinding {
            vec![0.0, display.display_height_mm]
        } else {
            Vec::new()
        };

        HelixPlan {
            adjusted_wire_diameter_mm: adjusted,
            profile: ProfileCircle {
                radius_offset_mm: design.mean_diameter_mm / 2.0,
                center_height_mm,
                diameter_mm: adjusted,
            },
            main,
            dead,
            grinding_planes_mm,
            local_frames_mm: [0.0, display.display_height_mm],
            handedness: design.input.handedness,
            display,
        }
    }
}
