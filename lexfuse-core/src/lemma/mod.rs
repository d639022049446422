//! Pluggable per-language lemmatization.
//!
//! The normalizer never analyses language itself; it hands each segment to a
//! [`Lemmatizer`] together with the language implied by the segment's
//! alphabet. [`LexiconLemmatizer`] is the built-in implementation; bindings
//! to a full morphological analyser implement the same trait.

mod lexicon;
mod stopwords;

pub use lexicon::{parse_dictionary, LexiconConfig, LexiconLemmatizer};
pub use stopwords::{is_builtin_stop_word, ENGLISH_STOP_WORDS, RUSSIAN_STOP_WORDS};

use crate::types::{Language, Lemma};

/// A per-language tokenizer and lemmatizer.
///
/// Implementations must be reentrant: batch normalization calls
/// `lemmatize` from several worker threads at once.
pub trait Lemmatizer: Send + Sync {
    /// Tokenize `text` and return one [`Lemma`] per token, in text order.
    fn lemmatize(&self, text: &str, language: Language) -> Vec<Lemma>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "lemmatizer"
    }
}

impl<T: Lemmatizer + ?Sized> Lemmatizer for std::sync::Arc<T> {
    fn lemmatize(&self, text: &str, language: Language) -> Vec<Lemma> {
        (**self).lemmatize(text, language)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
