//! Document normalization: search and display forms of every field.
//!
//! # Pipeline (full mode)
//!
//! ```text
//! cell → collapse whitespace → split by alphabet → lemmatize each segment
//!      → filter/transform lemmas → join with single spaces
//! ```
//!
//! Light mode stops after the whitespace step. Every document yields a
//! search record (full-mode values plus optional display companions) and a
//! display record (light-mode values only); each is dropped on its own when
//! all of its relevant fields end up empty.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::NormalizerOptions;
use crate::error::Result;
use crate::lemma::Lemmatizer;
use crate::schema::FieldSchema;
use crate::text::{collapse, keep, split};
use crate::types::{DocumentRecord, FieldMode, RawDocument};

/// Stringified null markers that count as empty cells.
pub const NULL_LIKE: &[&str] = &["nan", "NaN", "null", "None"];

/// `""` for absent cells and whole-value null markers, else the cell itself.
pub fn coerce_null_like(cell: Option<&str>) -> &str {
    match cell {
        Some(value) if !NULL_LIKE.contains(&value) => value,
        _ => "",
    }
}

/// Both normalized forms of one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub id: Option<String>,
    /// Fully normalized record, `None` if it was dropped as empty.
    pub search: Option<DocumentRecord>,
    /// Whitespace-only record, `None` if it was dropped as empty.
    pub display: Option<DocumentRecord>,
}

impl NormalizedDocument {
    /// Whether both records were dropped.
    pub fn is_dropped(&self) -> bool {
        self.search.is_none() && self.display.is_none()
    }
}

/// Turns raw documents and query strings into search and display text.
pub struct DocumentNormalizer {
    lemmatizer: Arc<dyn Lemmatizer>,
    schema: FieldSchema,
    options: NormalizerOptions,
}

impl std::fmt::Debug for DocumentNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentNormalizer")
            .field("lemmatizer", &self.lemmatizer.name())
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish()
    }
}

impl DocumentNormalizer {
    /// Build a normalizer after validating `schema` and `options`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`](crate::CoreError::Config) if either is
    /// invalid.
    pub fn new(
        lemmatizer: Arc<dyn Lemmatizer>,
        schema: FieldSchema,
        options: NormalizerOptions,
    ) -> Result<Self> {
        options.validate()?;
        schema.validate(&options.display_prefix)?;
        Ok(Self {
            lemmatizer,
            schema,
            options,
        })
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Normalize one cell. Absent, empty and null-like cells yield `""`.
    pub fn normalize_field(&self, cell: Option<&str>, mode: FieldMode) -> String {
        let light = collapse(coerce_null_like(cell));
        if light.is_empty() || NULL_LIKE.contains(&light.as_str()) {
            return String::new();
        }
        match mode {
            FieldMode::Light => light,
            FieldMode::Full => {
                let full = self.lemmatize_text(&light);
                if NULL_LIKE.contains(&full.as_str()) {
                    String::new()
                } else {
                    full
                }
            }
        }
    }

    /// Full normalization of free text, as applied to queries.
    pub fn normalize_text(&self, text: &str) -> String {
        self.normalize_field(Some(text), FieldMode::Full)
    }

    fn lemmatize_text(&self, text: &str) -> String {
        let mut tokens = Vec::new();
        for segment in split(text) {
            let language = segment.alphabet.language();
            for lemma in self.lemmatizer.lemmatize(&segment.text, language) {
                if let Some(token) = keep(&lemma, self.options.length_floor) {
                    tokens.push(token);
                }
            }
        }
        tokens.join(" ")
    }

    /// Produce the search and display records of `doc`.
    ///
    /// Fields outside the schema are ignored.
    pub fn normalize_document(&self, doc: &RawDocument) -> NormalizedDocument {
        let prefix = self.options.display_prefix.as_str();
        let mut search = DocumentRecord::new();
        let mut display = DocumentRecord::new();

        for spec in &self.schema.fields {
            let cell = doc.field(&spec.name);
            let light = self.normalize_field(cell, FieldMode::Light);
            let value = match spec.mode {
                FieldMode::Full => self.normalize_field(cell, FieldMode::Full),
                FieldMode::Light => light.clone(),
            };
            search.insert(spec.name.clone(), value);
            if self.options.emit_display_companions {
                search.insert(format!("{prefix}{}", spec.name), light.clone());
            }
            display.insert(spec.name.clone(), light);
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            for name in doc.fields.keys().filter(|k| self.schema.mode(k).is_none()) {
                trace!(field = %name, "ignoring field outside schema");
            }
        }

        // Both records are judged on the same fields, so a document holding
        // only light fields (a bare URL) is dropped everywhere.
        let drop = self.options.drop_empty_records;
        let relevant = self.schema.relevant_names();
        let search = if drop && search.all_empty(relevant.iter().copied()) {
            debug!(id = ?doc.id, "search record empty after normalization, dropped");
            None
        } else {
            Some(search)
        };
        let display = if drop && display.all_empty(relevant.iter().copied()) {
            debug!(id = ?doc.id, "display record empty after normalization, dropped");
            None
        } else {
            Some(display)
        };

        NormalizedDocument {
            id: doc.id.clone(),
            search,
            display,
        }
    }

    /// Normalize `rows` into one table of records.
    ///
    /// `FieldMode::Full` yields search records, `FieldMode::Light` display
    /// records. Dropped rows are removed and the remaining rows stay in input
    /// order.
    pub fn normalize_table(&self, rows: &[RawDocument], mode: FieldMode) -> Vec<DocumentRecord> {
        rows.iter()
            .map(|row| self.normalize_document(row))
            .filter_map(|doc| match mode {
                FieldMode::Full => doc.search,
                FieldMode::Light => doc.display,
            })
            .collect()
    }

    /// Normalize `rows` in parallel, one task per row.
    ///
    /// Output order matches input order. Documents whose records were both
    /// dropped are removed.
    pub fn normalize_batch(&self, rows: &[RawDocument]) -> Vec<NormalizedDocument> {
        let normalized: Vec<NormalizedDocument> = rows
            .par_iter()
            .map(|row| self.normalize_document(row))
            .collect();
        let total = normalized.len();
        let kept: Vec<NormalizedDocument> = normalized
            .into_iter()
            .filter(|doc| !doc.is_dropped())
            .collect();
        debug!(total, kept = kept.len(), "normalized batch");
        kept
    }
}
