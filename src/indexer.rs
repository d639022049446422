//! Document ingestion: JSON Lines in, normalized records out to the store.
//!
//! Each document is normalized once and then written to every configured
//! target. Raw targets get the display record and an embedding of its
//! display text; analyzed targets get the search record (with display
//! companions) and an embedding of its normalized text.

use std::path::Path;
use std::sync::Arc;

use lexfuse_core::{DocumentNormalizer, NormalizedDocument, RawDocument};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{IndexKind, IndexTarget, IndexingConfig};
use crate::embedding::Embedder;
use crate::error::{LexfuseError, Result};
use crate::store::{SearchStore, StoredDocument};

/// Key that becomes the document id instead of a field.
const ID_KEY: &str = "id";

/// Read up to `limit` documents from a JSON Lines file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read or a line is not a JSON
/// object.
pub fn load_documents(path: &Path, limit: Option<usize>) -> Result<Vec<RawDocument>> {
    let content = std::fs::read_to_string(path)?;
    let documents = parse_documents(&content, limit)?;
    info!(path = %path.display(), count = documents.len(), "loaded documents");
    Ok(documents)
}

/// Parse JSON Lines content. Blank lines are skipped.
///
/// String values are kept, `null` becomes an absent value, numbers and
/// booleans are stringified and nested arrays/objects are ignored.
///
/// # Errors
///
/// Returns an I/O error of kind `InvalidData` naming the first bad line.
pub fn parse_documents(content: &str, limit: Option<usize>) -> Result<Vec<RawDocument>> {
    let mut documents = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if limit.is_some_and(|l| documents.len() >= l) {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| invalid_line(number, &e))?;
        let Value::Object(object) = value else {
            return Err(invalid_line(number, &"expected a JSON object"));
        };

        let mut document = RawDocument::default();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                Value::Null => None,
                Value::Array(_) | Value::Object(_) => continue,
            };
            if key == ID_KEY {
                document.id = text;
            } else {
                document.fields.insert(key, text);
            }
        }
        documents.push(document);
    }
    Ok(documents)
}

fn invalid_line(index: usize, reason: &dyn std::fmt::Display) -> LexfuseError {
    LexfuseError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("line {}: {reason}", index + 1),
    ))
}

/// Outcome of one indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Documents written to at least one target.
    pub indexed: usize,
    /// Documents written nowhere because normalization left them empty.
    pub dropped: usize,
    /// Individual store writes.
    pub writes: usize,
}

/// Normalizes, embeds and stores documents.
pub struct Indexer {
    normalizer: Arc<DocumentNormalizer>,
    store: Arc<dyn SearchStore>,
    embedder: Arc<dyn Embedder>,
    targets: Vec<IndexTarget>,
    embedding_source: String,
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("store", &self.store.name())
            .field("targets", &self.targets)
            .field("embedding_source", &self.embedding_source)
            .finish()
    }
}

impl Indexer {
    pub fn new(
        normalizer: Arc<DocumentNormalizer>,
        store: Arc<dyn SearchStore>,
        embedder: Arc<dyn Embedder>,
        config: &IndexingConfig,
    ) -> Self {
        Self {
            normalizer,
            store,
            embedder,
            targets: config.targets.clone(),
            embedding_source: config.embedding_source.clone(),
        }
    }

    /// Normalize `documents` and write them to every target.
    ///
    /// # Errors
    ///
    /// Stops at the first store or embedding failure.
    pub async fn index_documents(&self, documents: &[RawDocument]) -> Result<IndexReport> {
        let normalizer = Arc::clone(&self.normalizer);
        let batch = documents.to_vec();
        let normalized = tokio::task::spawn_blocking(move || normalizer.normalize_batch(&batch))
            .await
            .map_err(|e| LexfuseError::Io(std::io::Error::other(e)))?;

        let mut report = IndexReport {
            dropped: documents.len() - normalized.len(),
            ..Default::default()
        };

        for (position, document) in normalized.iter().enumerate() {
            let writes = self.index_one(document).await?;
            if writes == 0 {
                report.dropped += 1;
            } else {
                report.indexed += 1;
                report.writes += writes;
            }
            if (position + 1) % 100 == 0 {
                info!(done = position + 1, total = normalized.len(), "indexing progress");
            }
        }

        info!(
            indexed = report.indexed,
            dropped = report.dropped,
            writes = report.writes,
            "indexing finished"
        );
        Ok(report)
    }

    async fn index_one(&self, document: &NormalizedDocument) -> Result<usize> {
        let mut raw_embedding: Option<Option<Vec<f32>>> = None;
        let mut analyzed_embedding: Option<Option<Vec<f32>>> = None;
        let mut writes = 0;

        for target in &self.targets {
            let (record, cache) = match target.kind {
                IndexKind::Raw => (&document.display, &mut raw_embedding),
                IndexKind::Analyzed => (&document.search, &mut analyzed_embedding),
            };
            let Some(record) = record else {
                debug!(id = ?document.id, index = %target.name, "record dropped, skipping target");
                continue;
            };

            if cache.is_none() {
                let text = record.get(&self.embedding_source).unwrap_or_default();
                *cache = Some(if text.is_empty() {
                    None
                } else {
                    Some(self.embedder.embed(text).await?)
                });
            }

            let stored = StoredDocument {
                id: document.id.clone(),
                record: record.clone(),
                embedding: cache.clone().flatten(),
            };
            self.store.index_document(&target.name, &stored).await?;
            writes += 1;
        }
        Ok(writes)
    }
}
