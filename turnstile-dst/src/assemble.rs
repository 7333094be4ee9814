//! Per-dialogue assembly: walk the template turns, isolate payloads, decode
//! states, and write them back into the template frames.

use crate::context::DialogueContext;
use crate::decode::decode_state;
use crate::diagnostics::FrameDiagnostic;
use crate::error::{Error, FrameError, Result};
use crate::payload::ModelFamily;
use crate::template::{
    DialoguePredictions, DialogueReferences, Speaker, TemplateDialogue, TurnPredictions,
};
use crate::types::Schema;

/// Drives decoding for whole dialogues.
///
/// Construction fixes the model family; everything else is supplied per
/// dialogue, so one assembler is shared across a whole run.
#[derive(Clone, Copy, Debug)]
pub struct StateAssembler {
    family: ModelFamily,
}

impl StateAssembler {
    pub fn new(family: ModelFamily) -> Self {
        Self { family }
    }

    /// Build an assembler from a model identifier, see
    /// [`ModelFamily::from_model_name`].
    pub fn for_model(model: &str) -> Result<Self> {
        Ok(Self::new(ModelFamily::from_model_name(model)?))
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// Decode every predicted turn of one dialogue into the template.
    ///
    /// Predicted turns are processed in numeric key order while the running
    /// context accumulates the system and user utterances seen so far;
    /// template turns alternate user and system, so user turn `t` sits at
    /// offset `2 * t`. Frame states are overwritten in place and the rest of
    /// the template is left untouched.
    ///
    /// Recoverable problems come back as [`FrameDiagnostic`]s. Structural
    /// problems (unknown service, missing mappings or prediction, broken
    /// payload framing) abort the dialogue with an error naming the frame.
    pub fn populate_dialogue(
        &self,
        dialogue: &mut TemplateDialogue,
        predictions: &DialoguePredictions,
        references: &DialogueReferences,
        schema: &Schema,
    ) -> Result<Vec<FrameDiagnostic>> {
        let dialogue_id = dialogue.dialogue_id.clone();
        let mut context = DialogueContext::new();
        let mut diagnostics = Vec::new();

        for (turn, turn_predictions) in ordered_turns(&dialogue_id, predictions)? {
            // Saturating keeps absurdly large keys on the missing-turn path.
            let turn_offset = turn.saturating_mul(2);

            if turn > 0 {
                // The system utterance that led into this user turn.
                let system_turn = dialogue.turns.get(turn_offset - 1).ok_or_else(|| {
                    Error::MissingTurn {
                        dialogue: dialogue_id.clone(),
                        turn_offset: turn_offset - 1,
                        len: dialogue.turns.len(),
                    }
                })?;
                context.push_utterance(&system_turn.utterance);
            }

            let turn_count = dialogue.turns.len();
            let user_turn =
                dialogue
                    .turns
                    .get_mut(turn_offset)
                    .ok_or_else(|| Error::MissingTurn {
                        dialogue: dialogue_id.clone(),
                        turn_offset,
                        len: turn_count,
                    })?;
            if user_turn.speaker != Speaker::User {
                return Err(Error::UnexpectedSpeaker {
                    dialogue: dialogue_id.clone(),
                    turn_offset,
                });
            }
            let utterance = user_turn.utterance.clone();
            context.push_utterance(&utterance);

            let reference_turn =
                references
                    .0
                    .get(turn)
                    .ok_or_else(|| Error::MissingReferenceTurn {
                        dialogue: dialogue_id.clone(),
                        turn,
                    })?;

            for frame in &mut user_turn.frames {
                let service = frame.service.clone();
                let frame_error = |source: FrameError| Error::Frame {
                    dialogue: dialogue_id.clone(),
                    turn,
                    service: service.clone(),
                    source,
                };

                if !schema.contains(&service) {
                    return Err(frame_error(FrameError::UnknownService));
                }
                let mappings = reference_turn
                    .frames
                    .get(&service)
                    .ok_or_else(|| frame_error(FrameError::MissingMappings))?;
                let prediction = turn_predictions
                    .frames
                    .get(&service)
                    .ok_or_else(|| frame_error(FrameError::MissingPrediction))?;

                let payload = self
                    .family
                    .extract_payload(&prediction.predicted_str, &utterance)
                    .map_err(|source| frame_error(FrameError::Payload(source)))?;

                let (state, frame_diagnostics) = decode_state(payload, mappings, &context);
                tracing::trace!(
                    turn,
                    service = %service,
                    diagnostics = frame_diagnostics.len(),
                    "frame decoded"
                );

                diagnostics.extend(frame_diagnostics.into_iter().map(|diagnostic| {
                    FrameDiagnostic {
                        turn,
                        service: service.clone(),
                        diagnostic,
                    }
                }));
                frame.state = Some(state);
            }
        }

        tracing::debug!(
            dialogue = %dialogue_id,
            diagnostics = diagnostics.len(),
            "dialogue decoded"
        );
        Ok(diagnostics)
    }
}

/// Predicted turns in numeric key order.
fn ordered_turns<'a>(
    dialogue_id: &str,
    predictions: &'a DialoguePredictions,
) -> Result<Vec<(usize, &'a TurnPredictions)>> {
    let mut turns = Vec::with_capacity(predictions.0.len());
    for (key, turn_predictions) in &predictions.0 {
        let turn: usize = key.trim().parse().map_err(|_| Error::InvalidTurnKey {
            dialogue: dialogue_id.to_string(),
            key: key.clone(),
        })?;
        turns.push((turn, turn_predictions));
    }
    turns.sort_unstable_by_key(|(turn, _)| *turn);
    Ok(turns)
}
