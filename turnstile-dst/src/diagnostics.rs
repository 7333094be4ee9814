//! Soft-failure diagnostics reported alongside decoded state.
//!
//! Decoding never aborts on slot-, intent-, or requested-slot-level
//! problems. It records one of these, skips the offending item, and keeps
//! going; the caller decides how loudly to report them. Structural problems
//! that do abort a dialogue live in [`crate::error`] instead.

use thiserror::Error;

/// A recoverable problem found while decoding one predicted string.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Diagnostic {
    /// The payload does not follow the `[states] .. [intents] .. [req_slots]`
    /// grammar; the frame keeps its default empty state.
    #[error("predicted string does not match the three-section grammar")]
    MalformedPayload,

    /// A states fragment with no `index:value` shape.
    #[error("fragment {fragment:?} is not an index:value pair")]
    MalformedFragment { fragment: String },

    /// States-section index token absent from the slot mapping.
    #[error("slot index {token:?} is not in the slot mapping")]
    UnresolvedSlotIndex { token: String },

    /// Predicted value token not found among the categorical values of the
    /// resolved slot.
    #[error("value index {token:?} is not mapped for categorical slot {slot:?}")]
    UnresolvedValueIndex { slot: String, token: String },

    /// Intent token absent from the intent mapping; the frame keeps the
    /// `NONE` intent.
    #[error("intent index {token:?} is not in the intent mapping")]
    UnresolvedIntentIndex { token: String },

    /// Requested-slot token absent from the slot mapping.
    #[error("requested slot index {token:?} is not in the slot mapping")]
    UnresolvedRequestedIndex { token: String },

    /// A merged free-text value that does not occur anywhere in the dialogue
    /// context. The value is kept; the model may have hallucinated it.
    #[error("value {value:?} for slot {slot:?} does not occur in the dialogue context")]
    UngroundedValue { slot: String, value: String },

    /// The same slot was written more than once in one predicted string; the
    /// later value wins.
    #[error("slot {slot:?} resolved more than once, keeping the later value")]
    RepeatedSlot { slot: String },
}

/// A [`Diagnostic`] tagged with the frame it came from.
///
/// `turn` is the user-turn ordinal used by the predictions file, not the
/// raw offset into the template turn list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameDiagnostic {
    pub turn: usize,
    pub service: String,
    pub diagnostic: Diagnostic,
}
