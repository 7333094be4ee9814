//! Section extraction for predicted state strings.

use std::sync::OnceLock;

use regex::Regex;

/// The three sections of a well-formed predicted string, in grammar order.
///
/// Section contents are raw slices of the payload; trimming and further
/// tokenization are left to the resolvers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Sections<'a> {
    pub states: &'a str,
    pub intents: &'a str,
    pub req_slots: &'a str,
}

impl<'a> Sections<'a> {
    /// Split a payload at the literal `[states]`, `[intents]`, and
    /// `[req_slots]` markers.
    ///
    /// Returns `None` when the payload does not follow the three-marker
    /// grammar, including when the markers appear out of order. The caller
    /// substitutes an empty state in that case.
    pub fn split(payload: &'a str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"\[states](.*)\[intents](.*)\[req_slots](.*)")
                .expect("section pattern is valid")
        });

        let (_, [states, intents, req_slots]) = pattern.captures(payload)?.extract();
        Some(Self {
            states,
            intents,
            req_slots,
        })
    }
}
