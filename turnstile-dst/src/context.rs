//! Running dialogue context and normalized phrase matching.

/// Lowercase a string and strip all whitespace.
///
/// The running context and every phrase checked against it are compared in
/// this form, so matching is insensitive to casing and to how the generator
/// re-spaced the original span.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Strip all whitespace but keep casing.
pub fn squash_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Accumulated utterances of one dialogue, in turn order.
///
/// Grows monotonically as turns are processed and only answers normalized
/// substring queries. Free-text slot values extracted from a prediction are
/// grounded by checking that they occur somewhere in here.
#[derive(Clone, Debug, Default)]
pub struct DialogueContext {
    normalized: String,
}

impl DialogueContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one utterance to the context.
    pub fn push_utterance(&mut self, utterance: &str) {
        self.normalized.push_str(&normalize(utterance));
    }

    /// Whether a phrase occurs in the context, ignoring case and whitespace.
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        self.normalized.contains(&normalize(phrase))
    }
}
