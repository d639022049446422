//! Dictionary-backed lemmatizer that needs no external NLP runtime.
//!
//! Tokens are lowercased and looked up in an optional per-language
//! `form<TAB>lemma` dictionary; unknown forms are their own lemma. Stop words
//! come from the built-in lists plus configured extras.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::stopwords::is_builtin_stop_word;
use super::Lemmatizer;
use crate::error::{CoreError, Result};
use crate::types::{Language, Lemma};

/// Characters kept inside a word when both neighbours are alphanumeric.
const JOINERS: &[char] = &[':', '-', '\'', '’', '.'];

/// Dictionary and stop-word sources for [`LexiconLemmatizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// `form<TAB>lemma` file for English.
    pub english_lemmas: Option<PathBuf>,
    /// `form<TAB>lemma` file for Russian.
    pub russian_lemmas: Option<PathBuf>,
    /// Additional English stop words.
    pub english_stop_words: Vec<String>,
    /// Additional Russian stop words.
    pub russian_stop_words: Vec<String>,
}

#[derive(Debug, Default)]
struct LanguageLexicon {
    lemmas: HashMap<String, String>,
    extra_stop_words: HashSet<String>,
}

/// Built-in [`Lemmatizer`].
#[derive(Debug, Default)]
pub struct LexiconLemmatizer {
    english: LanguageLexicon,
    russian: LanguageLexicon,
}

impl LexiconLemmatizer {
    /// A lemmatizer with built-in stop words and no dictionaries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load dictionaries and extra stop words described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Lexicon`] if a dictionary file cannot be read or
    /// contains a malformed line.
    pub fn from_config(config: &LexiconConfig) -> Result<Self> {
        let mut lemmatizer = Self::new()
            .with_stop_words(Language::English, config.english_stop_words.iter().cloned())
            .with_stop_words(Language::Russian, config.russian_stop_words.iter().cloned());

        if let Some(path) = &config.english_lemmas {
            let entries = load_dictionary(path)?;
            info!(path = %path.display(), count = entries.len(), "loaded english lemma dictionary");
            lemmatizer = lemmatizer.with_lemmas(Language::English, entries);
        }
        if let Some(path) = &config.russian_lemmas {
            let entries = load_dictionary(path)?;
            info!(path = %path.display(), count = entries.len(), "loaded russian lemma dictionary");
            lemmatizer = lemmatizer.with_lemmas(Language::Russian, entries);
        }

        Ok(lemmatizer)
    }

    /// Add `(form, lemma)` pairs for `language`. Keys are lowercased.
    pub fn with_lemmas<I, K, V>(mut self, language: Language, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let lexicon = self.lexicon_mut(language);
        for (form, lemma) in entries {
            lexicon
                .lemmas
                .insert(form.into().to_lowercase(), lemma.into().to_lowercase());
        }
        self
    }

    /// Add stop words for `language`. Words are lowercased.
    pub fn with_stop_words<I, S>(mut self, language: Language, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lexicon = self.lexicon_mut(language);
        lexicon
            .extra_stop_words
            .extend(words.into_iter().map(|w| w.into().to_lowercase()));
        self
    }

    fn lexicon(&self, language: Language) -> &LanguageLexicon {
        match language {
            Language::English => &self.english,
            Language::Russian => &self.russian,
        }
    }

    fn lexicon_mut(&mut self, language: Language) -> &mut LanguageLexicon {
        match language {
            Language::English => &mut self.english,
            Language::Russian => &mut self.russian,
        }
    }

    fn is_stop(&self, word: &str, language: Language) -> bool {
        is_builtin_stop_word(word, language)
            || self.lexicon(language).extra_stop_words.contains(word)
    }
}

impl Lemmatizer for LexiconLemmatizer {
    fn lemmatize(&self, text: &str, language: Language) -> Vec<Lemma> {
        let lexicon = self.lexicon(language);
        tokenize(text)
            .into_iter()
            .map(|token| match token {
                Token::Punct(surface) => Lemma {
                    surface: surface.to_owned(),
                    is_stop: false,
                    is_punct: true,
                },
                Token::Word(surface) => {
                    let lower = surface.to_lowercase();
                    let lemma = lexicon
                        .lemmas
                        .get(&lower)
                        .cloned()
                        .unwrap_or_else(|| lower.clone());
                    let is_stop = self.is_stop(&lower, language) || self.is_stop(&lemma, language);
                    Lemma {
                        surface: lemma,
                        is_stop,
                        is_punct: false,
                    }
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Punct(&'a str),
}

/// Split `text` into word and punctuation tokens; whitespace separates.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let end_of = |i: usize| chars.get(i).map_or(text.len(), |&(idx, _)| idx);

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (start, ch) = chars[i];
        if ch.is_whitespace() {
            i += 1;
        } else if ch.is_alphanumeric() {
            let mut j = i + 1;
            while j < chars.len() {
                let c = chars[j].1;
                let joined = JOINERS.contains(&c)
                    && chars.get(j + 1).is_some_and(|&(_, n)| n.is_alphanumeric());
                if c.is_alphanumeric() {
                    j += 1;
                } else if joined {
                    j += 2;
                } else {
                    break;
                }
            }
            tokens.push(Token::Word(&text[start..end_of(j)]));
            i = j;
        } else {
            tokens.push(Token::Punct(&text[start..end_of(i + 1)]));
            i += 1;
        }
    }
    tokens
}

/// Parse a `form<TAB>lemma` dictionary. Blank lines and `#` comments are
/// skipped.
///
/// # Errors
///
/// Returns [`CoreError::Lexicon`] naming the first malformed line.
pub fn parse_dictionary(content: &str) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((form, lemma)) = line.split_once('\t') else {
            return Err(CoreError::Lexicon(format!(
                "line {}: expected `form<TAB>lemma`",
                lineno + 1
            )));
        };
        let (form, lemma) = (form.trim(), lemma.trim());
        if form.is_empty() || lemma.is_empty() {
            return Err(CoreError::Lexicon(format!(
                "line {}: empty form or lemma",
                lineno + 1
            )));
        }
        entries.push((form.to_owned(), lemma.to_owned()));
    }
    Ok(entries)
}

fn load_dictionary(path: &Path) -> Result<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Lexicon(format!("failed to read {}: {e}", path.display()))
    })?;
    parse_dictionary(&content)
        .map_err(|e| CoreError::Lexicon(format!("{}: {e}", path.display())))
}
