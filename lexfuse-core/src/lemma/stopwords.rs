//! Built-in English and Russian stop-word lists.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::types::Language;

pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

pub const RUSSIAN_STOP_WORDS: &[&str] = &[
    "а", "без", "более", "бы", "был", "была", "были", "было", "быть", "в", "вам", "вас", "весь",
    "во", "вот", "все", "всё", "всего", "всех", "вы", "где", "да", "даже", "для", "до", "его",
    "ее", "её", "если", "есть", "еще", "ещё", "же", "за", "здесь", "и", "из", "или", "им", "их",
    "к", "как", "когда", "кто", "ли", "либо", "между", "меня", "мне", "может", "мы", "на",
    "над", "надо", "наш", "не", "него", "нее", "неё", "нет", "ни", "них", "но", "ну", "о", "об",
    "однако", "он", "она", "они", "оно", "от", "очень", "по", "под", "после", "при", "с", "со",
    "так", "также", "такой", "там", "те", "тем", "то", "того", "тоже", "той", "только", "том",
    "ты", "у", "уже", "хотя", "чего", "чей", "чем", "что", "чтобы", "эта", "эти", "это", "этот",
    "я",
];

static ENGLISH: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

static RUSSIAN: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| RUSSIAN_STOP_WORDS.iter().copied().collect());

/// Whether the lowercased `word` is a built-in stop word of `language`.
pub fn is_builtin_stop_word(word: &str, language: Language) -> bool {
    match language {
        Language::English => ENGLISH.contains(word),
        Language::Russian => RUSSIAN.contains(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_list_contains_common_words() {
        assert!(is_builtin_stop_word("the", Language::English));
        assert!(is_builtin_stop_word("and", Language::English));
        assert!(!is_builtin_stop_word("search", Language::English));
    }

    #[test]
    fn russian_list_contains_common_words() {
        assert!(is_builtin_stop_word("и", Language::Russian));
        assert!(is_builtin_stop_word("что", Language::Russian));
        assert!(!is_builtin_stop_word("поиск", Language::Russian));
    }

    #[test]
    fn lists_are_language_specific() {
        assert!(!is_builtin_stop_word("the", Language::Russian));
        assert!(!is_builtin_stop_word("и", Language::English));
    }

    #[test]
    fn lists_are_lowercase_without_duplicates() {
        for list in [ENGLISH_STOP_WORDS, RUSSIAN_STOP_WORDS] {
            let unique: HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len());
            assert!(list.iter().all(|w| w.to_lowercase() == *w));
        }
    }
}
