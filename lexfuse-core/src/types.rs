//! Core types shared by the text pipeline and the rank fuser.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix of the companion entries that carry display text next to the
/// normalized value of a field (`content` -> `display_content`).
pub const DEFAULT_DISPLAY_PREFIX: &str = "display_";

/// The two alphabets the segmenter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alphabet {
    /// ASCII Latin letters (`a-z`, `A-Z`).
    Latin,
    /// Cyrillic letters.
    Cyrillic,
}

impl Alphabet {
    /// The language whose lemmatizer handles text in this alphabet.
    pub fn language(self) -> Language {
        match self {
            Self::Latin => Language::English,
            Self::Cyrillic => Language::Russian,
        }
    }
}

/// Languages supported by the lemmatizer capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Russian,
}

impl Language {
    /// Short ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Russian => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A maximal run of text tagged with the alphabet that governs it.
///
/// Concatenating the `text` of every segment of a cell, in order, yields the
/// original cell exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub alphabet: Alphabet,
    pub text: String,
}

/// A single token as reported by a lemmatizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lemma {
    /// Dictionary form of the token.
    pub surface: String,
    /// Whether the token is a stop word in its language.
    pub is_stop: bool,
    /// Whether the token is punctuation.
    pub is_punct: bool,
}

impl Lemma {
    /// A regular (non-stop, non-punctuation) lemma.
    pub fn word(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            is_stop: false,
            is_punct: false,
        }
    }
}

/// How a field is processed by the document normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Segment, lemmatize and filter.
    Full,
    /// Collapse whitespace only.
    #[default]
    Light,
}

/// A source document before normalization.
///
/// Absent or null fields are `None` and are treated as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Store-side identifier, if the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Field values keyed by field name.
    #[serde(default)]
    pub fields: BTreeMap<String, Option<String>>,
}

impl RawDocument {
    /// Build a document from `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: None,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    /// Attach a store-side identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The value of `name`, or `None` if absent or null.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }
}

/// An immutable field-name to text mapping handed to (or returned by) the
/// search store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRecord {
    fields: BTreeMap<String, String>,
}

impl DocumentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every one of `names` is missing or holds an empty string.
    pub fn all_empty<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names
            .into_iter()
            .all(|name| self.get(name).is_none_or(str::is_empty))
    }

    /// Human-facing text for `field`.
    ///
    /// Precedence: the `{prefix}{field}` companion if present, else the plain
    /// `field` value, else the empty string. Never fails.
    pub fn display_value(&self, field: &str, prefix: &str) -> &str {
        let companion = format!("{prefix}{field}");
        self.get(&companion)
            .or_else(|| self.get(field))
            .unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DocumentRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A single ranked hit returned by the search store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Store-side identity of the document.
    pub id: String,
    /// Store-specific relevance score (BM25 or vector similarity).
    pub score: f64,
    /// Stored fields of the document.
    pub source: DocumentRecord,
}

/// A hit after reciprocal rank fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedHit {
    pub id: String,
    /// Sum of `1 / (rank + k)` over every list the id appears in.
    pub rrf_score: f64,
    /// Source taken from the first list that contained the id.
    pub source: DocumentRecord,
}

impl FusedHit {
    /// See [`DocumentRecord::display_value`].
    pub fn display_value(&self, field: &str, prefix: &str) -> &str {
        self.source.display_value(field, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_language() {
        assert_eq!(Alphabet::Latin.language(), Language::English);
        assert_eq!(Alphabet::Cyrillic.language(), Language::Russian);
    }

    #[test]
    fn language_display() {
        assert_eq!(Language::English.to_string(), "en");
        assert_eq!(Language::Russian.to_string(), "ru");
    }

    #[test]
    fn field_mode_serde_lowercase() {
        let json = serde_json::to_string(&FieldMode::Full).expect("serialize");
        assert_eq!(json, "\"full\"");
        let mode: FieldMode = serde_json::from_str("\"light\"").expect("deserialize");
        assert_eq!(mode, FieldMode::Light);
    }

    #[test]
    fn raw_document_null_field_reads_as_none() {
        let mut doc = RawDocument::from_pairs([("title", "Hello")]);
        doc.fields.insert("summary".into(), None);
        assert_eq!(doc.field("title"), Some("Hello"));
        assert_eq!(doc.field("summary"), None);
        assert_eq!(doc.field("missing"), None);
    }

    #[test]
    fn display_value_prefers_companion() {
        let record: DocumentRecord = [
            ("content", "новость день"),
            ("display_content", "Новости дня"),
        ]
        .into_iter()
        .collect();
        assert_eq!(record.display_value("content", "display_"), "Новости дня");
    }

    #[test]
    fn display_value_falls_back_to_raw_then_empty() {
        let record: DocumentRecord = [("summary", "Plain")].into_iter().collect();
        assert_eq!(record.display_value("summary", "display_"), "Plain");
        assert_eq!(record.display_value("content", "display_"), "");
    }

    #[test]
    fn empty_companion_still_wins() {
        let record: DocumentRecord = [("summary", "raw"), ("display_summary", "")]
            .into_iter()
            .collect();
        assert_eq!(record.display_value("summary", "display_"), "");
    }

    #[test]
    fn all_empty_treats_missing_as_empty() {
        let record: DocumentRecord = [("title", ""), ("content", "x")].into_iter().collect();
        assert!(record.all_empty(["title", "summary"]));
        assert!(!record.all_empty(["title", "content"]));
    }

    #[test]
    fn document_record_serializes_as_flat_map() {
        let record: DocumentRecord = [("url", "https://a.ru")].into_iter().collect();
        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"url":"https://a.ru"}"#);
    }
}
