//! Core dialogue-state types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Sentinel intent recorded when no intent is predicted or resolvable.
pub const NO_INTENT: &str = "NONE";

/// Slot name to extracted values. This decoder writes at most one value per
/// slot; the list shape matches the dialogue file format.
pub type SlotValues = BTreeMap<String, Vec<String>>;

fn no_intent() -> String {
    NO_INTENT.to_string()
}

/// Dialogue state of one frame, written into the template in place.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DialogueState {
    #[serde(default = "no_intent")]
    pub active_intent: String,
    #[serde(default)]
    pub requested_slots: Vec<String>,
    #[serde(default)]
    pub slot_values: SlotValues,
}

impl Default for DialogueState {
    fn default() -> Self {
        Self {
            active_intent: no_intent(),
            requested_slots: Vec::new(),
            slot_values: SlotValues::new(),
        }
    }
}

/// Index mappings for one (turn, service) pair, produced by the
/// preprocessing step that indexed the schema.
///
/// Index assignment is randomized per turn, so a fresh set must be supplied
/// for every turn and service; no token in here is stable across turns.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TurnMappings {
    /// Index token to canonical slot name.
    #[serde(default)]
    pub slot_mapping: BTreeMap<String, String>,
    /// Canonical slot name to its value-to-token table. Only categorical
    /// slots appear here; their predicted values resolve by inverse lookup.
    #[serde(default)]
    pub cat_values_mapping: BTreeMap<String, BTreeMap<String, String>>,
    /// Index token to canonical intent name.
    #[serde(default)]
    pub intent_mapping: BTreeMap<String, String>,
}

/// The set of service names decoding is allowed to touch.
///
/// Frames referencing anything else abort the dialogue rather than decode
/// against the wrong mappings.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    services: BTreeSet<String>,
}

impl Schema {
    pub fn from_service_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            services: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, service: &str) -> bool {
        self.services.contains(service)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
