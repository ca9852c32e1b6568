//! # Interactive Design Session
//!
//! Holds the inputs being edited and the latest computed design, and decides
//! how each edit recalculates:
//!
//! | Edit                                  | Wire selection        |
//! |---------------------------------------|-----------------------|
//! | target diameter, load, service, material | smallest admissible |
//! | wire, heights, dead turns, handedness | keep current if valid |
//! | end type                              | keep current, dead turns clamped |
//! | diameter type                         | keep current, target re-expressed |
//!
//! Every setter is all or nothing: if the edited input is rejected the
//! session keeps its previous input and design.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::config::EngineSettings;
//! use spring_core::reference::ReferenceData;
//! use spring_core::session::DesignSession;
//! use spring_core::calculations::design::SpringInput;
//!
//! let data = ReferenceData::builtin().unwrap();
//! let mut session = DesignSession::new(&data, EngineSettings::default(), SpringInput::default()).unwrap();
//!
//! session.set_load(25.0).unwrap();
//! session.set_end_type("CUT").unwrap();
//! assert_eq!(session.design().turns.dead_turns, 0.0);
//! ```

use crate::calculations::design::{compute_design_with, Handedness, SpringDesign, SpringInput};
use crate::calculations::diameter::DiameterType;
use crate::calculations::sizing::SelectionMode;
use crate::config::EngineSettings;
use crate::errors::CalcResult;
use crate::reference::ReferenceData;

pub struct DesignSession<'a> {
    data: &'a ReferenceData,
    settings: EngineSettings,
    input: SpringInput,
    design: SpringDesign,
}

impl<'a> DesignSession<'a> {
    /// Start a session and compute the first design with the input's own mode.
    pub fn new(data: &'a ReferenceData, settings: EngineSettings, input: SpringInput) -> CalcResult<Self> {
        let design = compute_design_with(&input, data, &settings)?;
        let mut session = DesignSession {
            data,
            settings,
            input,
            design,
        };
        session.sync_wire();
        Ok(session)
    }

    pub fn input(&self) -> &SpringInput {
        &self.input
    }

    pub fn design(&self) -> &SpringDesign {
        &self.design
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Consume the session, keeping the last design
    pub fn into_design(self) -> SpringDesign {
        self.design
    }

    pub fn set_target_diameter(&mut self, target_mm: f64) -> CalcResult<&SpringDesign> {
        self.edit(SelectionMode::ForceMinimum, |i| i.target_diameter_mm = target_mm)
    }

    pub fn set_load(&mut self, load_dan: f64) -> CalcResult<&SpringDesign> {
        self.edit(SelectionMode::ForceMinimum, |i| i.load_dan = load_dan)
    }

    pub fn set_service_class(&mut self, key: &str) -> CalcResult<&SpringDesign> {
        self.edit(SelectionMode::ForceMinimum, |i| i.service_class = key.to_string())
    }

    pub fn set_material(&mut self, key: &str) -> CalcResult<&SpringDesign> {
        self.edit(SelectionMode::ForceMinimum, |i| i.material = key.to_string())
    }

    /// Pick a wire; it is kept if it satisfies the stress limit.
    pub fn set_wire_diameter(&mut self, d_mm: f64) -> CalcResult<&SpringDesign> {
        self.edit(SelectionMode::KeepCurrent, |i| i.wire_diameter_mm = d_mm)
    }

    pub fn set_height_under_load(&mut self, height_mm: f64) -> CalcResult<&SpringDesign> {
        self.edit(SelectionMode::KeepCurrent, |i| i.height_under_load_mm = height_mm)
    }

    pub fn set_max_solid_length(&mut self, length_mm: f64) -> CalcResult<&SpringDesign> {
        self.edit(SelectionMode::KeepCurrent, |i| i.max_solid_length_mm = length_mm)
    }

    pub fn set_dead_turns(&mut self, dead_turns: f64) -> CalcResult<&SpringDesign> {
        let rule = self.data.end_type(&self.input.end_type).value().dead_coils;
        let clamped = rule.clamp(dead_turns);
        self.edit(SelectionMode::KeepCurrent, |i| i.dead_turns = clamped)
    }

    pub fn set_handedness(&mut self, handedness: Handedness) -> CalcResult<&SpringDesign> {
        self.edit(SelectionMode::KeepCurrent, |i| i.handedness = handedness)
    }

    /// Change the end type, bringing the requested dead turns into its rule.
    pub fn set_end_type(&mut self, key: &str) -> CalcResult<&SpringDesign> {
        let rule = self.data.end_type(key).value().dead_coils;
        let dead_turns = rule.clamp(self.input.dead_turns);
        self.edit(SelectionMode::KeepCurrent, |i| {
            i.end_type = key.to_string();
            i.dead_turns = dead_turns;
        })
    }

    /// Re-express the target in another diameter type without changing Dm.
    ///
    /// Selecting the current type does nothing.
    pub fn set_diameter_type(&mut self, to: DiameterType) -> CalcResult<&SpringDesign> {
        let from = self.input.diameter_type;
        if from == to {
            return Ok(&self.design);
        }
        let target = from.retarget(self.input.target_diameter_mm, self.input.wire_diameter_mm, to);
        log::debug!(
            "diameter type {} -> {}: target {:.3} -> {:.3}",
            from,
            to,
            self.input.target_diameter_mm,
            target
        );
        self.edit(SelectionMode::KeepCurrent, |i| {
            i.diameter_type = to;
            i.target_diameter_mm = target;
        })
    }

    fn edit(&mut self, mode: SelectionMode, change: impl FnOnce(&mut SpringInput)) -> CalcResult<&SpringDesign> {
        let mut input = self.input.clone();
        change(&mut input);
        self.commit(input, mode)
    }

    fn commit(&mut self, mut input: SpringInput, mode: SelectionMode) -> CalcResult<&SpringDesign> {
        input.selection_mode = mode;
        let design = compute_design_with(&input, self.data, &self.settings)?;
        self.input = input;
        self.design = design;
        self.sync_wire();
        Ok(&self.design)
    }

    /// The selected wire becomes the next starting candidate
    fn sync_wire(&mut self) {
        self.input.wire_diameter_mm = self.design.wire_diameter_mm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ReferenceData {
        ReferenceData::builtin().unwrap()
    }

    fn input() -> SpringInput {
        SpringInput {
            target_diameter_mm: 20.0,
            load_dan: 30.0,
            height_under_load_mm: 80.0,
            max_solid_length_mm: 60.0,
            dead_turns: 1.0,
            ..SpringInput::default()
        }
    }

    #[test]
    fn test_session_tracks_selected_wire() {
        let data = data();
        let session = DesignSession::new(&data, EngineSettings::default(), input()).unwrap();
        assert_eq!(session.input().wire_diameter_mm, session.design().wire_diameter_mm);
    }

    #[test]
    fn test_load_change_reselects_minimum() {
        let data = data();
        let mut session = DesignSession::new(&data, EngineSettings::default(), input()).unwrap();
        let heavy = session.set_wire_diameter(6.0).unwrap().wire_diameter_mm;
        assert_eq!(heavy, 6.0);

        let d = session.set_load(30.0).unwrap().wire_diameter_mm;
        assert!(d < heavy);
        assert_eq!(session.input().selection_mode, SelectionMode::ForceMinimum);
    }

    #[test]
    fn test_wire_change_keeps_valid_wire() {
        let data = data();
        let mut session = DesignSession::new(&data, EngineSettings::default(), input()).unwrap();
        let design = session.set_wire_diameter(5.0).unwrap();
        assert_eq!(design.wire_diameter_mm, 5.0);
        assert_eq!(design.input.selection_mode, SelectionMode::KeepCurrent);
    }

    #[test]
    fn test_end_type_change_clamps_dead_turns() {
        let data = data();
        let mut session = DesignSession::new(&data, EngineSettings::default(), input()).unwrap();

        session.set_end_type("CUT_GROUND").unwrap();
        assert_eq!(session.input().dead_turns, 0.0);
        assert_eq!(session.design().turns.dead_turns, 0.0);

        session.set_end_type("CLOSED").unwrap();
        let min = data.end_type("CLOSED").value().dead_coils.minimum;
        assert!(session.input().dead_turns >= min);
    }

    #[test]
    fn test_diameter_type_switch_keeps_mean_diameter() {
        let data = data();
        let mut session = DesignSession::new(&data, EngineSettings::default(), input()).unwrap();
        let dm = session.design().mean_diameter_mm;
        let d = session.design().wire_diameter_mm;

        session.set_diameter_type(DiameterType::Inner).unwrap();
        assert!((session.input().target_diameter_mm - (dm - d)).abs() < 1e-9);
        assert!((session.design().mean_diameter_mm - dm).abs() < 1e-6);

        let before = session.input().clone();
        session.set_diameter_type(DiameterType::Inner).unwrap();
        assert_eq!(session.input(), &before);
    }

    #[test]
    fn test_rejected_edit_leaves_session_untouched() {
        let data = data();
        let mut session = DesignSession::new(&data, EngineSettings::default(), input()).unwrap();
        let before = session.design().clone();

        assert!(session.set_load(-1.0).is_err());
        assert_eq!(session.input().load_dan, 30.0);
        assert_eq!(session.design(), &before);
    }
}
