//! Model-family payload framing.
//!
//! Generation output arrives wrapped in family-specific boundary markers,
//! and decoder-only models additionally echo the dialogue history before
//! the payload. The decoder proper only ever sees the isolated payload; a
//! missing marker means the generation is structurally broken, and the
//! dialogue is abandoned rather than decoded into a misleading state.

use crate::context::squash_whitespace;
use crate::error::{Error, PayloadError};

/// Literal begin marker emitted by bracket-framed models.
pub const BEGIN_MARKER: &str = "<BOS>";

/// Literal end marker, required by every family.
pub const END_MARKER: &str = "<EOS>";

/// Recognized generation model families, by payload framing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModelFamily {
    /// Bracket-framed decoder-only output: the payload sits between
    /// [`BEGIN_MARKER`] and the last [`END_MARKER`], preceded by an echo of
    /// the dialogue history.
    Gpt2,
    /// Suffix-framed encoder-decoder output: the payload is everything
    /// before the last [`END_MARKER`].
    T5,
}

impl ModelFamily {
    /// Select the family from a model identifier.
    ///
    /// Matching is a case-insensitive substring check and `gpt2` is tested
    /// first, so an identifier naming both resolves to [`ModelFamily::Gpt2`].
    /// Identifiers naming neither family are a hard failure.
    pub fn from_model_name(model: &str) -> Result<Self, Error> {
        let lower = model.to_lowercase();
        if lower.contains("gpt2") {
            Ok(ModelFamily::Gpt2)
        } else if lower.contains("t5") {
            Ok(ModelFamily::T5)
        } else {
            Err(Error::UnknownModelFamily {
                model: model.to_string(),
            })
        }
    }

    /// Isolate the decodable payload from a raw predicted string.
    ///
    /// `user_utterance` is the current turn's user utterance. Bracket-family
    /// output must contain it, compared with all whitespace removed but case
    /// kept, or the echo went out of sync with the turn being decoded.
    pub fn extract_payload<'a>(
        &self,
        raw: &'a str,
        user_utterance: &str,
    ) -> Result<&'a str, PayloadError> {
        if *self == ModelFamily::Gpt2
            && !squash_whitespace(raw).contains(&squash_whitespace(user_utterance))
        {
            return Err(PayloadError::HistoryMismatch);
        }

        if !raw.contains(END_MARKER) {
            return Err(PayloadError::MissingEndMarker { marker: END_MARKER });
        }

        let payload = match self {
            ModelFamily::Gpt2 => {
                let start = raw
                    .find(BEGIN_MARKER)
                    .ok_or(PayloadError::MissingStartMarker {
                        marker: BEGIN_MARKER,
                    })?;
                let body = &raw[start + BEGIN_MARKER.len()..];
                let end = body
                    .rfind(END_MARKER)
                    .ok_or(PayloadError::MissingEndMarker { marker: END_MARKER })?;
                &body[..end]
            }
            ModelFamily::T5 => {
                let end = raw
                    .rfind(END_MARKER)
                    .ok_or(PayloadError::MissingEndMarker { marker: END_MARKER })?;
                &raw[..end]
            }
        };

        Ok(payload.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_family_case_insensitively() {
        assert_eq!(
            ModelFamily::from_model_name("GPT2-large").unwrap(),
            ModelFamily::Gpt2
        );
        assert_eq!(
            ModelFamily::from_model_name("t5-base").unwrap(),
            ModelFamily::T5
        );
        assert_eq!(
            ModelFamily::from_model_name("Flan-T5-XXL").unwrap(),
            ModelFamily::T5
        );
    }

    #[test]
    fn gpt2_wins_when_both_are_named() {
        assert_eq!(
            ModelFamily::from_model_name("gpt2-to-t5-distilled").unwrap(),
            ModelFamily::Gpt2
        );
    }

    #[test]
    fn unknown_family_is_rejected() {
        for model in ["llama-7b", "flan"] {
            let result = ModelFamily::from_model_name(model);
            assert!(
                matches!(result, Err(Error::UnknownModelFamily { .. })),
                "{model} should not resolve"
            );
        }
    }

    #[test]
    fn suffix_family_takes_everything_before_the_last_end_marker() {
        let raw = "[states] 0:cheap [intents] [req_slots] <EOS>";
        let payload = ModelFamily::T5.extract_payload(raw, "unused").unwrap();
        assert_eq!(payload, "[states] 0:cheap [intents] [req_slots]");

        let repeated = "a <EOS> b <EOS>";
        let payload = ModelFamily::T5.extract_payload(repeated, "unused").unwrap();
        assert_eq!(payload, "a <EOS> b");
    }

    #[test]
    fn suffix_family_skips_the_history_check() {
        let raw = "[states] [intents] [req_slots] <EOS>";
        let payload = ModelFamily::T5
            .extract_payload(raw, "an utterance that is not echoed")
            .unwrap();
        assert_eq!(payload, "[states] [intents] [req_slots]");
    }

    #[test]
    fn bracket_family_extracts_between_markers() {
        let raw = "system: hello user: i want a cheap restaurant \
                   <BOS> [states] 0:cheap [intents] [req_slots] <EOS>";
        let payload = ModelFamily::Gpt2
            .extract_payload(raw, "i want a cheap restaurant")
            .unwrap();
        assert_eq!(payload, "[states] 0:cheap [intents] [req_slots]");
    }

    #[test]
    fn bracket_family_history_check_ignores_spacing() {
        let raw = "user: iwantacheap  restaurant <BOS> [states] [intents] [req_slots] <EOS>";
        let payload = ModelFamily::Gpt2
            .extract_payload(raw, "i want a cheap restaurant")
            .unwrap();
        assert_eq!(payload, "[states] [intents] [req_slots]");
    }

    #[test]
    fn bracket_family_history_check_is_case_sensitive() {
        let raw = "user: I Want A Cheap Restaurant <BOS> [states] [intents] [req_slots] <EOS>";
        let result = ModelFamily::Gpt2.extract_payload(raw, "i want a cheap restaurant");
        assert_eq!(result, Err(PayloadError::HistoryMismatch));
    }

    #[test]
    fn missing_history_echo_fails() {
        let raw = "something else entirely <BOS> [states] [intents] [req_slots] <EOS>";
        let result = ModelFamily::Gpt2.extract_payload(raw, "i want a cheap restaurant");
        assert_eq!(result, Err(PayloadError::HistoryMismatch));
    }

    #[test]
    fn missing_end_marker_fails() {
        let result = ModelFamily::T5.extract_payload("[states] [intents] [req_slots]", "x");
        assert_eq!(
            result,
            Err(PayloadError::MissingEndMarker { marker: END_MARKER })
        );

        let raw = "hi <BOS> [states] [intents] [req_slots]";
        let result = ModelFamily::Gpt2.extract_payload(raw, "hi");
        assert_eq!(
            result,
            Err(PayloadError::MissingEndMarker { marker: END_MARKER })
        );
    }

    #[test]
    fn missing_begin_marker_fails() {
        let raw = "hi [states] [intents] [req_slots] <EOS>";
        let result = ModelFamily::Gpt2.extract_payload(raw, "hi");
        assert_eq!(
            result,
            Err(PayloadError::MissingStartMarker {
                marker: BEGIN_MARKER
            })
        );
    }

    #[test]
    fn end_marker_only_before_begin_marker_fails() {
        let raw = "hi <EOS> noise <BOS> [states] [intents] [req_slots]";
        let result = ModelFamily::Gpt2.extract_payload(raw, "hi");
        assert_eq!(
            result,
            Err(PayloadError::MissingEndMarker { marker: END_MARKER })
        );
    }
}
