//! Serde models for the JSON artifacts around the decoder: blank template
//! dialogues, per-dialogue predictions, and preprocessed references.
//!
//! Template dialogues follow the SGD file format. Only the fields the
//! decoder reads or writes are modeled; everything else (`slots`, `actions`,
//! and whatever future exports add) is carried through untouched in `extra`
//! maps so populated files stay byte-compatible with their templates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{DialogueState, TurnMappings};

/// Speaker of a template turn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Speaker {
    User,
    System,
}

/// One service's frame within a turn; `state` is the decoder's output slot.
///
/// Frames the assembler never touches (system turns, turns past the last
/// prediction) have no `state` and serialize without one.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TemplateFrame {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DialogueState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TemplateTurn {
    pub speaker: Speaker,
    pub utterance: String,
    #[serde(default)]
    pub frames: Vec<TemplateFrame>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Blank dialogue skeleton; the assembler fills the frame states in place.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TemplateDialogue {
    pub dialogue_id: String,
    #[serde(default)]
    pub services: Vec<String>,
    pub turns: Vec<TemplateTurn>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw generation output for one service at one turn.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FramePrediction {
    pub predicted_str: String,
}

/// Predictions for one user turn: the echoed utterance plus one predicted
/// string per service.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TurnPredictions {
    /// User utterance echoed by the generation step; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utterance: Option<String>,
    #[serde(flatten)]
    pub frames: BTreeMap<String, FramePrediction>,
}

/// Predictions for one dialogue, keyed by stringified user-turn index.
///
/// Keys are decimal strings; the assembler orders them numerically, so
/// `"10"` comes after `"2"`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DialoguePredictions(pub BTreeMap<String, TurnPredictions>);

/// Reference mappings for one user turn of one dialogue.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ReferenceTurn {
    /// Index mappings for every service decoded at this turn.
    #[serde(default)]
    pub frames: BTreeMap<String, TurnMappings>,
}

/// Reference mappings for one dialogue, one entry per user turn, indexed by
/// the same turn indices the predictions use.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DialogueReferences(pub Vec<ReferenceTurn>);

impl DialogueReferences {
    /// Service names appearing anywhere in this dialogue's references.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .flat_map(|turn| turn.frames.keys())
            .map(String::as_str)
    }
}
