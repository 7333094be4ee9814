//! Hard-failure types for dialogue assembly, organized by stage.
//!
//! Anything here aborts the dialogue being processed; a populated file is
//! never written from a dialogue that failed one of these checks.
//! Recoverable decoding problems are not errors and travel as
//! [`crate::diagnostics::Diagnostic`] values instead.

use thiserror::Error;

/// Dialogue assembly error variants.
#[derive(Debug, Error)]
pub enum Error {
    /// Model identifier matched no known payload framing.
    #[error("unsupported model {model:?}")]
    UnknownModelFamily { model: String },

    /// Prediction turn key that is not a decimal turn index.
    #[error("dialogue {dialogue}: prediction turn key {key:?} is not a turn index")]
    InvalidTurnKey { dialogue: String, key: String },

    /// Template has no turn at the offset the predictions point at.
    #[error("dialogue {dialogue}: turn offset {turn_offset} is outside the template ({len} turns)")]
    MissingTurn {
        dialogue: String,
        turn_offset: usize,
        len: usize,
    },

    /// A non-user turn where a user turn was expected.
    #[error("dialogue {dialogue}: turn at offset {turn_offset} is not a user turn")]
    UnexpectedSpeaker { dialogue: String, turn_offset: usize },

    /// References carry no entry for a predicted turn.
    #[error("dialogue {dialogue}: no reference mappings for turn {turn}")]
    MissingReferenceTurn { dialogue: String, turn: usize },

    /// Frame-scoped failure.
    #[error("dialogue {dialogue}, turn {turn}, service {service}: {source}")]
    Frame {
        dialogue: String,
        turn: usize,
        service: String,
        #[source]
        source: FrameError,
    },
}

/// Failures scoped to a single (turn, service) frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Frame references a service outside the schema.
    #[error("service is not part of the schema")]
    UnknownService,

    /// References carry no mappings for this service at this turn.
    #[error("no reference mappings for this service")]
    MissingMappings,

    /// Predictions carry no string for this service at this turn.
    #[error("no predicted string for this service")]
    MissingPrediction,

    /// Payload extraction failed.
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Structural problems with a raw predicted string.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum PayloadError {
    /// End marker absent; the generation is structurally broken.
    #[error("end marker {marker:?} absent from the predicted string")]
    MissingEndMarker { marker: &'static str },

    /// Begin marker absent from a bracket-family predicted string.
    #[error("begin marker {marker:?} absent from the predicted string")]
    MissingStartMarker { marker: &'static str },

    /// Bracket-family output does not echo the current user utterance, so
    /// the generation lost track of the dialogue it was asked about.
    #[error("predicted string does not contain the current user utterance")]
    HistoryMismatch,
}

/// Result type alias for dialogue assembly.
pub type Result<T> = std::result::Result<T, Error>;
