//! Decoding an isolated payload into a dialogue state.
//!
//! The states section is tokenized into index-tagged fragments
//! ([`crate::fragment`]) and then reduced in order: each marker fragment
//! opens a slot, categorical slots resolve through the inverse value
//! mapping, and free-text slots greedily absorb following fragments while
//! the combined phrase still occurs in the dialogue context. The intent and
//! requested-slot sections are plain index lookups.

use crate::context::DialogueContext;
use crate::diagnostics::Diagnostic;
use crate::fragment::{Fragment, fragments};
use crate::segment::Sections;
use crate::types::{DialogueState, NO_INTENT, SlotValues, TurnMappings};

/// Decode one isolated payload into a dialogue state.
///
/// Never fails: anything unparseable is skipped and reported through the
/// returned diagnostics while the rest of the payload is still decoded. A
/// payload that does not even split into sections yields the default empty
/// state.
pub fn decode_state(
    payload: &str,
    mappings: &TurnMappings,
    context: &DialogueContext,
) -> (DialogueState, Vec<Diagnostic>) {
    let Some(sections) = Sections::split(payload) else {
        return (DialogueState::default(), vec![Diagnostic::MalformedPayload]);
    };

    let (slot_values, mut diagnostics) =
        resolve_slot_values(sections.states, mappings, context);
    let (active_intent, intent_diagnostics) = resolve_intent(sections.intents, mappings);
    let (requested_slots, requested_diagnostics) =
        resolve_requested_slots(sections.req_slots, mappings);

    diagnostics.extend(intent_diagnostics);
    diagnostics.extend(requested_diagnostics);

    let state = DialogueState {
        active_intent,
        requested_slots,
        slot_values,
    };
    (state, diagnostics)
}

/// Resolve the states section into slot values.
pub fn resolve_slot_values(
    section: &str,
    mappings: &TurnMappings,
    context: &DialogueContext,
) -> (SlotValues, Vec<Diagnostic>) {
    if section.trim().is_empty() {
        return (SlotValues::new(), Vec::new());
    }
    reduce_fragments(&fragments(section), mappings, context)
}

/// Reduce tagged fragments into slot values.
///
/// Fragments are walked left to right. A fragment that cannot open an
/// `index:value` pair is skipped with a diagnostic. A free-text value
/// absorbs the fragments after it for as long as the grown phrase still
/// occurs in the context, which puts back together values the tokenizer had
/// to cut around marker-looking words.
pub fn reduce_fragments(
    frags: &[Fragment<'_>],
    mappings: &TurnMappings,
    context: &DialogueContext,
) -> (SlotValues, Vec<Diagnostic>) {
    let mut values = SlotValues::new();
    let mut diagnostics = Vec::new();

    let mut i = 0;
    while i < frags.len() {
        let text = frags[i].text.trim();
        let pair = if frags[i].marker {
            text.split_once(':')
        } else {
            None
        };
        let Some((token, head)) = pair else {
            diagnostics.push(Diagnostic::MalformedFragment {
                fragment: text.to_string(),
            });
            i += 1;
            continue;
        };

        let Some(slot) = mappings.slot_mapping.get(token) else {
            diagnostics.push(Diagnostic::UnresolvedSlotIndex {
                token: token.to_string(),
            });
            i += 1;
            continue;
        };

        if let Some(value_tokens) = mappings.cat_values_mapping.get(slot) {
            let token = head.trim();
            match value_tokens.iter().find(|(_, t)| t.as_str() == token) {
                Some((canonical, _)) => {
                    record(&mut values, &mut diagnostics, slot, canonical.clone());
                }
                None => diagnostics.push(Diagnostic::UnresolvedValueIndex {
                    slot: slot.clone(),
                    token: token.to_string(),
                }),
            }
            i += 1;
        } else {
            let mut value = head.to_string();
            let mut next = i + 1;
            while next < frags.len()
                && context.contains_phrase(&format!("{value}{}", frags[next].text))
            {
                value.push(' ');
                value.push_str(frags[next].text);
                next += 1;
            }

            let value = value.trim().to_string();
            if !context.contains_phrase(&value) {
                diagnostics.push(Diagnostic::UngroundedValue {
                    slot: slot.clone(),
                    value: value.clone(),
                });
            }
            record(&mut values, &mut diagnostics, slot, value);
            i = next;
        }
    }

    (values, diagnostics)
}

/// Resolve the intents section; an empty or unresolvable section keeps the
/// `NONE` intent.
pub fn resolve_intent(section: &str, mappings: &TurnMappings) -> (String, Vec<Diagnostic>) {
    let token = section.trim();
    if token.is_empty() {
        return (NO_INTENT.to_string(), Vec::new());
    }
    match mappings.intent_mapping.get(token) {
        Some(intent) => (intent.clone(), Vec::new()),
        None => (
            NO_INTENT.to_string(),
            vec![Diagnostic::UnresolvedIntentIndex {
                token: token.to_string(),
            }],
        ),
    }
}

/// Resolve the requested-slots section. Order and duplicates are preserved;
/// unresolvable tokens are skipped.
pub fn resolve_requested_slots(
    section: &str,
    mappings: &TurnMappings,
) -> (Vec<String>, Vec<Diagnostic>) {
    let mut requested = Vec::new();
    let mut diagnostics = Vec::new();

    for token in section.split_whitespace() {
        match mappings.slot_mapping.get(token) {
            Some(slot) => requested.push(slot.clone()),
            None => diagnostics.push(Diagnostic::UnresolvedRequestedIndex {
                token: token.to_string(),
            }),
        }
    }
    (requested, diagnostics)
}

fn record(
    values: &mut SlotValues,
    diagnostics: &mut Vec<Diagnostic>,
    slot: &str,
    value: String,
) {
    if values.insert(slot.to_string(), vec![value]).is_some() {
        diagnostics.push(Diagnostic::RepeatedSlot {
            slot: slot.to_string(),
        });
    }
}
