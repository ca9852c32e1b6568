//! # spring_core - Compression Spring Sizing Engine
//!
//! `spring_core` sizes helical compression springs per EN 13906-1: from a
//! target coil diameter, a working load and the housing limits it picks a
//! standard wire diameter, derives the turn counts and lengths, and flags
//! designs that are overstressed, impossible or hard to manufacture. All
//! inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Pure**: [`compute_design`] takes inputs and reference data, returns a design
//! - **Degrade, don't fail**: missing reference entries fall back to defaults
//!   and are reported on the design
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use spring_core::{compute_design, ReferenceData, SpringInput};
//!
//! let data = ReferenceData::builtin().unwrap();
//! let input = SpringInput {
//!     target_diameter_mm: 20.0,
//!     load_dan: 30.0,
//!     height_under_load_mm: 80.0,
//!     max_solid_length_mm: 60.0,
//!     ..SpringInput::default()
//! };
//!
//! let design = compute_design(&input, &data).unwrap();
//! assert!(data.wire_diameters.as_slice().contains(&design.wire_diameter_mm));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - sizing, turns, alerts and the design record
//! - [`reference`] - material, wire diameter and end type tables
//! - [`representation`] - display configurations (free, loaded, solid, custom)
//! - [`helix`] - 3D build plan handed to a CAD host
//! - [`session`] - interactive editing with recalculation rules
//! - [`project`] - project container, metadata and spring items
//! - [`file_io`] - project files with atomic saves and locking
//! - [`config`] - engine settings (TOML)
//! - [`errors`] - structured error types

pub mod calculations;
pub mod config;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod helix;
pub mod project;
pub mod reference;
pub mod representation;
pub mod session;

pub use calculations::{compute_design, compute_design_with, Alert, SpringDesign, SpringInput};
pub use config::EngineSettings;
pub use errors::{CalcError, CalcResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, save_project, FileLock};
pub use project::{GlobalSettings, Project, ProjectMetadata, SpringItem};
pub use reference::ReferenceData;
pub use session::DesignSession;
