//! # Engine Settings
//!
//! Tunables for the sizing engine, stored as TOML. Every field has a default
//! and the defaults reproduce the standard behaviour, so an absent file or an
//! empty one is equivalent to [`EngineSettings::default`].
//!
//! ```toml
//! max_iterations = 10
//! tolerance = 0.001
//! index_min = 4.0
//! index_max = 16.0
//! guidance_ratio = 4.0
//! wire_adjustment = 0.999
//! reference_dir = "/opt/springs/data"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::reference::ReferenceData;

/// Default settings file name
pub const SETTINGS_FILE: &str = "spring_engine.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Iteration cap of the wire diameter convergence loop
    pub max_iterations: u32,

    /// Convergence tolerance on d and Dm (mm)
    pub tolerance: f64,

    /// Spring index below which the low-index alert fires
    pub index_min: f64,

    /// Spring index above which the high-index alert fires
    pub index_max: f64,

    /// `L0 / Dm` above which guidance is required (buckling)
    pub guidance_ratio: f64,

    /// Wire diameter scale used for the 3D profile, keeps adjacent coils apart
    pub wire_adjustment: f64,

    /// Directory holding the reference JSON files; built-in tables when unset
    pub reference_dir: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_iterations: 10,
            tolerance: 0.001,
            index_min: 4.0,
            index_max: 16.0,
            guidance_ratio: 4.0,
            wire_adjustment: 0.999,
            reference_dir: None,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> CalcResult<()> {
        if self.max_iterations == 0 {
            return Err(CalcError::invalid_input(
                "max_iterations",
                "0",
                "At least one iteration is required",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(CalcError::invalid_input(
                "tolerance",
                self.tolerance.to_string(),
                "Tolerance must be positive",
            ));
        }
        if !(self.index_min > 0.0 && self.index_min < self.index_max) {
            return Err(CalcError::invalid_input(
                "index_min",
                format!("{}..{}", self.index_min, self.index_max),
                "Spring index range must be positive and non-empty",
            ));
        }
        if !(self.guidance_ratio > 0.0) {
            return Err(CalcError::invalid_input(
                "guidance_ratio",
                self.guidance_ratio.to_string(),
                "Guidance ratio must be positive",
            ));
        }
        if !(self.wire_adjustment > 0.0 && self.wire_adjustment <= 1.0) {
            return Err(CalcError::invalid_input(
                "wire_adjustment",
                self.wire_adjustment.to_string(),
                "Wire adjustment must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> CalcResult<Self> {
        let settings: EngineSettings = toml::from_str(text).map_err(CalcError::serialization)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> CalcResult<String> {
        toml::to_string_pretty(self).map_err(CalcError::serialization)
    }

    /// Load settings from `path`, or defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> CalcResult<Self> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(EngineSettings::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        let settings = Self::from_toml(&text)?;
        log::info!("loaded engine settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> CalcResult<()> {
        let text = self.to_toml()?;
        fs::write(path, text)
            .map_err(|e| CalcError::file_error("write", path.display().to_string(), e.to_string()))
    }

    /// Reference data selected by these settings.
    pub fn reference_data(&self) -> CalcResult<ReferenceData> {
        match &self.reference_dir {
            Some(dir) => Ok(ReferenceData::load_dir(dir)),
            None => ReferenceData::builtin(),
        }
    }
}
