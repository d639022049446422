//! Whitespace collapsing.

/// Collapse runs of spaces and newlines into single spaces and trim both ends.
///
/// Only `' '` and `'\n'` take part in collapsing; other whitespace (tabs,
/// carriage returns) is kept inside the text but still trimmed at the ends.
/// Idempotent: `collapse(&collapse(x)) == collapse(x)`.
pub fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut emit = true;
    for ch in text.chars() {
        if ch == ' ' || ch == '\n' {
            if emit {
                out.push(' ');
                emit = false;
            }
        } else {
            emit = true;
            out.push(ch);
        }
    }
    out.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_spaces_and_newlines() {
        assert_eq!(collapse("  a\n\n b  "), "a b");
        assert_eq!(collapse("one   two\nthree"), "one two three");
    }

    #[test]
    fn empty_and_blank_become_empty() {
        assert_eq!(collapse(""), "");
        assert_eq!(collapse(" \n \n "), "");
    }

    #[test]
    fn tabs_are_kept_inside_but_trimmed_at_ends() {
        assert_eq!(collapse("\ta \t b\t"), "a \t b");
    }

    #[test]
    fn preserves_case_and_order() {
        assert_eq!(collapse(" Новости  Дня \n Today "), "Новости Дня Today");
    }

    #[test]
    fn collapse_is_idempotent() {
        let samples = [
            "",
            "x",
            "  a\n\n b  ",
            "\t a \t\n b \r\n c ",
            " \u{a0} nbsp \u{a0} ",
            "слово\n\n\nслово   word",
        ];
        for sample in samples {
            let once = collapse(sample);
            assert_eq!(collapse(&once), once, "not idempotent for {sample:?}");
        }
    }
}
