//! Index-marker tokenization of the states section.
//!
//! The states section is a run of `index:value` pairs separated by spaces,
//! but free-text values may themselves contain spaces and even words that
//! look like new pairs (`3:30` in a time). The tokenizer therefore cuts the
//! section only at whitespace runs that immediately precede an index-marker
//! word and leaves everything else attached to the preceding fragment; the
//! reducer in [`crate::decode`] decides later which marker-looking words
//! were genuine pairs.

/// A candidate slot-value fragment.
///
/// `marker` is true when the fragment starts with an index-marker word and
/// can therefore open a new slot-value pair. Embedded whitespace is kept
/// as-is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub marker: bool,
}

/// True when `word` begins with one or more ASCII digits, zero or more
/// ASCII letters, and then a colon.
fn starts_with_marker(word: &str) -> bool {
    let rest = word.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == word.len() {
        return false;
    }
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.starts_with(':')
}

/// Split a states section into fragments, cutting only at whitespace runs
/// whose following word is an index marker.
pub fn fragments(section: &str) -> Vec<Fragment<'_>> {
    let section = section.trim();
    if section.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut fragment_start = 0;
    let mut pos = 0;

    while let Some(offset) = section[pos..].find(char::is_whitespace) {
        let whitespace_start = pos + offset;
        let after = section[whitespace_start..].trim_start();
        let word_start = section.len() - after.len();

        if starts_with_marker(after) {
            out.push(make_fragment(&section[fragment_start..whitespace_start]));
            fragment_start = word_start;
        }
        pos = word_start;
    }

    out.push(make_fragment(&section[fragment_start..]));
    out
}

fn make_fragment(text: &str) -> Fragment<'_> {
    Fragment {
        text,
        marker: starts_with_marker(text),
    }
}
