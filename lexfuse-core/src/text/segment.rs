//! Alphabet segmentation of mixed Russian/English text.
//!
//! A cell is cut into maximal runs of one alphabet. Only alphabetic
//! characters can switch the run; digits, punctuation and whitespace stick to
//! whichever run is open. ASCII letters are [`Alphabet::Latin`]; every other
//! alphabetic character (Cyrillic, including `ё`) belongs to the
//! [`Alphabet::Cyrillic`] side and is handed to the Russian lemmatizer.

use crate::types::{Alphabet, Segment};

/// Alphabet of a single character, or `None` for non-alphabetic characters.
fn classify(ch: char) -> Option<Alphabet> {
    if ch.is_ascii_alphabetic() {
        Some(Alphabet::Latin)
    } else if ch.is_alphabetic() {
        Some(Alphabet::Cyrillic)
    } else {
        None
    }
}

/// Alphabet of the first alphabetic character in `cell`.
///
/// A cell without any letters is treated as Latin.
pub fn leading_alphabet(cell: &str) -> Alphabet {
    cell.chars()
        .find_map(classify)
        .unwrap_or(Alphabet::Latin)
}

/// Split `cell` into alphabet-tagged segments.
///
/// Lossless: the concatenated segment texts equal `cell`. An empty cell
/// yields no segments.
pub fn split(cell: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    if cell.is_empty() {
        return segments;
    }

    let mut alphabet = leading_alphabet(cell);
    let mut start = 0;
    for (idx, ch) in cell.char_indices() {
        match classify(ch) {
            Some(current) if current != alphabet => {
                segments.push(Segment {
                    alphabet,
                    text: cell[start..idx].to_owned(),
                });
                start = idx;
                alphabet = current;
            }
            _ => {}
        }
    }
    segments.push(Segment {
        alphabet,
        text: cell[start..].to_owned(),
    });

    segments
}
