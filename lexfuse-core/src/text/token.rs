//! Post-processing of individual lemmas.
//!
//! Each lemma surface is whitespace-collapsed, `hh:mm` tokens become the
//! literal `time`, and colons are stripped from everything else. A lemma is
//! kept only when it is neither a stop word nor punctuation and its length
//! (see [`LengthFloor`]) exceeds one character.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::whitespace::collapse;
use crate::types::Lemma;

/// Canonical token that replaces clock times.
pub const TIME_TOKEN: &str = "time";

// Compiled once; the pattern is a literal.
#[allow(clippy::expect_used)]
static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("invalid time regex pattern"));

/// Which length the one-character floor is measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthFloor {
    /// Length of the post-processed token (`"a:"` -> `"a"` is dropped).
    #[default]
    Processed,
    /// Length of the raw lemma surface (`"a:"` survives as `"a"`).
    Lemma,
}

/// Transform one lemma surface into its final token form.
pub fn process(surface: &str) -> String {
    let collapsed = collapse(surface);
    if TIME_PATTERN.is_match(&collapsed) {
        TIME_TOKEN.to_owned()
    } else {
        collapsed.replace(':', "")
    }
}

/// The final token for `lemma`, or `None` if the lemma is filtered out.
pub fn keep(lemma: &Lemma, floor: LengthFloor) -> Option<String> {
    if lemma.is_stop || lemma.is_punct {
        return None;
    }
    let token = process(&lemma.surface);
    let measured = match floor {
        LengthFloor::Processed => token.chars().count(),
        LengthFloor::Lemma => lemma.surface.chars().count(),
    };
    (measured > 1 && !token.is_empty()).then_some(token)
}
