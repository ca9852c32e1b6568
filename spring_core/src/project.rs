//! # Spring Projects
//!
//! The `Project` struct is the root container for a set of spring designs.
//! Projects serialize to `.spring` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, designer, job info, timestamps)
//! ├── settings: GlobalSettings (default material, service class, end type)
//! └── springs: HashMap<Uuid, SpringItem>
//!     ├── input: SpringInput
//!     ├── representation: Representation
//!     └── applied: Option<SpringProperties>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use spring_core::calculations::design::compute_design;
//! use spring_core::project::{Project, SpringItem};
//! use spring_core::reference::ReferenceData;
//!
//! let data = ReferenceData::builtin().unwrap();
//! let mut project = Project::new("Jane Designer", "26-042", "ACME Corp");
//!
//! let mut item = project.new_spring("S-1");
//! let design = compute_design(&item.input, &data).unwrap();
//! item.apply(&design, true).unwrap();
//!
//! let id = project.add_spring(item);
//! assert!(project.get_spring(&id).unwrap().is_applied());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::design::{SpringDesign, SpringInput, SpringProperties};
use crate::errors::{CalcError, CalcResult};
use crate::representation::Representation;

/// Current schema version for .spring files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container, serialized to `.spring` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,

    /// Defaults for new springs
    pub settings: GlobalSettings,

    /// All springs, keyed by UUID
    pub springs: HashMap<Uuid, SpringItem>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Example
    ///
    /// ```rust
    /// use spring_core::project::Project;
    ///
    /// let project = Project::new("John Doe", "26-001", "Client Corp");
    /// assert_eq!(project.meta.designer, "John Doe");
    /// ```
    pub fn new(designer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                designer: designer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: GlobalSettings::default(),
            springs: HashMap::new(),
        }
    }

    /// A spring seeded with the project defaults. Not added to the project.
    pub fn new_spring(&self, label: impl Into<String>) -> SpringItem {
        let input = SpringInput {
            material: self.settings.default_material.clone(),
            service_class: self.settings.default_service_class.clone(),
            end_type: self.settings.default_end_type.clone(),
            ..SpringInput::default()
        };
        SpringItem::new(label, input)
    }

    /// Add a spring, returning its UUID.
    pub fn add_spring(&mut self, item: SpringItem) -> Uuid {
        let id = Uuid::new_v4();
        self.springs.insert(id, item);
        self.touch();
        id
    }

    pub fn remove_spring(&mut self, id: &Uuid) -> Option<SpringItem> {
        let item = self.springs.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn get_spring(&self, id: &Uuid) -> Option<&SpringItem> {
        self.springs.get(id)
    }

    /// Mutable access; marks the project as modified when the spring exists.
    pub fn get_spring_mut(&mut self, id: &Uuid) -> Option<&mut SpringItem> {
        if self.springs.contains_key(id) {
            self.meta.modified = Utc::now();
            self.springs.get_mut(id)
        } else {
            None
        }
    }

    /// First spring with this label, if any
    pub fn find_by_label(&self, label: &str) -> Option<(Uuid, &SpringItem)> {
        self.springs
            .iter()
            .find(|(_, item)| item.label == label)
            .map(|(id, item)| (*id, item))
    }

    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible designer
    pub designer: String,

    /// Job/project number
    pub job_id: String,

    pub client: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Reference keys used for new springs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub default_material: String,
    pub default_service_class: String,
    pub default_end_type: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        let input = SpringInput::default();
        GlobalSettings {
            default_material: input.material,
            default_service_class: input.service_class,
            default_end_type: input.end_type,
        }
    }
}

/// One spring in a project.
///
/// `input` and `representation` are what the user edits. `applied` is the
/// property record of the last design written back with [`SpringItem::apply`];
/// it stays `None` until the first successful apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringItem {
    pub label: String,
    pub input: SpringInput,
    #[serde(default)]
    pub representation: Representation,
    #[serde(default)]
    pub applied: Option<SpringProperties>,
}

impl SpringItem {
    pub fn new(label: impl Into<String>, input: SpringInput) -> Self {
        SpringItem {
            label: label.into(),
            input,
            representation: Representation::default(),
            applied: None,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.applied.is_some()
    }

    /// Write a computed design back into this spring.
    ///
    /// All or nothing: a design with alerts is refused unless `confirmed`, and
    /// a refused apply leaves the item untouched. On success the stored input
    /// becomes the design's input, the custom representation (if any) is
    /// re-synchronized and the property record is replaced.
    pub fn apply(&mut self, design: &SpringDesign, confirmed: bool) -> CalcResult<()> {
        if design.has_alerts() && !confirmed {
            return Err(CalcError::UnconfirmedAlerts {
                label: self.label.clone(),
                alert_count: design.alerts.len(),
            });
        }

        // Store the selected wire so a reopened item starts from it
        self.input = SpringInput {
            wire_diameter_mm: design.wire_diameter_mm,
            ..design.input.clone()
        };
        self.representation = self.representation.refreshed(design);
        self.applied = Some(design.properties());
        log::info!(
            "applied design to '{}' (d = {:.2} mm, {} alert(s))",
            self.label,
            design.wire_diameter_mm,
            design.alerts.len()
        );
        Ok(())
    }
}
