//! End-finishing conventions
//!
//! An end type decides two things for the engine: how many dead (inactive)
//! coils each end may carry, and whether the ends are ground flat. Ground ends
//! change the solid length formula (`Lc = nt·d` instead of `(nt + 1)·d`).

use serde::{Deserialize, Serialize};

use super::fallback;

/// Allowed dead coils per end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeadCoilRule {
    pub minimum: f64,
    /// `Some(0.0)` means the end type has no dead coils at all
    pub maximum: Option<f64>,
}

impl DeadCoilRule {
    /// Rule for end types without dead coils (cut, cut-ground)
    pub const NONE: DeadCoilRule = DeadCoilRule {
        minimum: 0.0,
        maximum: Some(0.0),
    };

    pub fn at_least(minimum: f64) -> Self {
        DeadCoilRule {
            minimum,
            maximum: None,
        }
    }

    pub fn allows_dead_coils(&self) -> bool {
        self.maximum.map_or(true, |max| max > 0.0)
    }

    /// Bring a requested dead coil count into the allowed range.
    pub fn clamp(&self, requested: f64) -> f64 {
        if !self.allows_dead_coils() {
            return 0.0;
        }
        let requested = if requested.is_finite() { requested } else { self.minimum };
        let at_least = requested.max(self.minimum);
        match self.maximum {
            Some(max) => at_least.min(max),
            None => at_least,
        }
    }
}

/// A named end type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndTypeSpec {
    /// Table key (e.g., "CLOSED_GROUND")
    pub key: String,
    pub dead_coils: DeadCoilRule,
    pub grinding_required: bool,
    #[serde(default)]
    pub description: String,
}

impl EndTypeSpec {
    /// End type used when a key is not in the table
    pub fn fallback(key: &str) -> Self {
        EndTypeSpec {
            key: key.to_string(),
            dead_coils: DeadCoilRule::at_least(fallback::DEAD_COILS_MIN),
            grinding_required: false,
            description: String::new(),
        }
    }

    /// Ground ends (solid length `nt·d`)
    pub fn is_ground(&self) -> bool {
        self.grinding_required
    }

    /// Dead coils per end actually used for a requested count
    pub fn dead_turns(&self, requested: f64) -> f64 {
        self.dead_coils.clamp(requested)
    }
}

/// End types with their display order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndTypeTable {
    entries: Vec<EndTypeSpec>,
    selection_order: Vec<String>,
}

impl EndTypeTable {
    pub fn new() -> Self {
        EndTypeTable::default()
    }

    /// Add or replace an end type
    pub fn insert(&mut self, spec: EndTypeSpec) {
        match self.entries.iter_mut().find(|e| e.key == spec.key) {
            Some(existing) => *existing = spec,
            None => self.entries.push(spec),
        }
    }

    pub fn set_selection_order(&mut self, order: Vec<String>) {
        self.selection_order = order;
    }

    pub fn get(&self, key: &str) -> Option<&EndTypeSpec> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// End types in picklist order: `selection_order` first, then any entry it
    /// does not mention, in table order.
    pub fn ordered(&self) -> Vec<&EndTypeSpec> {
        let mut out: Vec<&EndTypeSpec> = self
            .selection_order
            .iter()
            .filter_map(|key| self.get(key))
            .collect();
        for entry in &self.entries {
            if !self.selection_order.iter().any(|k| k == &entry.key) {
                out.push(entry);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(key: &str, rule: DeadCoilRule, ground: bool) -> EndTypeSpec {
        EndTypeSpec {
            key: key.to_string(),
            dead_coils: rule,
            grinding_required: ground,
            description: String::new(),
        }
    }

    #[test]
    fn test_no_dead_coils_forces_zero() {
        let cut = spec("CUT", DeadCoilRule::NONE, false);
        assert_eq!(cut.dead_turns(3.0), 0.0);
        assert_eq!(cut.dead_turns(0.0), 0.0);
    }

    #[test]
    fn test_minimum_is_enforced() {
        let closed = spec("CLOSED", DeadCoilRule::at_least(1.0), false);
        assert_eq!(closed.dead_turns(0.0), 1.0);
        assert_eq!(closed.dead_turns(0.5), 1.0);
        assert_eq!(closed.dead_turns(2.5), 2.5);
        assert_eq!(closed.dead_turns(f64::NAN), 1.0);
    }

    #[test]
    fn test_maximum_is_enforced() {
        let rule = DeadCoilRule { minimum: 1.0, maximum: Some(2.0) };
        assert_eq!(rule.clamp(5.0), 2.0);
    }

    #[test]
    fn test_fallback_end_type() {
        let et = EndTypeSpec::fallback("MYSTERY");
        assert!(!et.is_ground());
        assert_eq!(et.dead_turns(0.0), 2.0);
    }

    #[test]
    fn test_ordered_respects_selection_order() {
        let mut table = EndTypeTable::new();
        table.insert(spec("CUT", DeadCoilRule::NONE, false));
        table.insert(spec("CLOSED", DeadCoilRule::at_least(1.0), false));
        table.insert(spec("OPEN", DeadCoilRule::at_least(0.0), false));
        table.set_selection_order(vec!["CLOSED".to_string(), "MISSING".to_string(), "CUT".to_string()]);

        let keys: Vec<&str> = table.ordered().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["CLOSED", "CUT", "OPEN"]);
    }
}
