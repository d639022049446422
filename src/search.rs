//! Hybrid query pipeline: normalize, retrieve twice, fuse, answer.
//!
//! ```text
//! query ─ normalize ─┬─ lexical search ───────┬─ RRF ─ contexts ─ answerer ─ short answer
//!                    └─ embed ─ kNN search ───┘        └─ (url, summary) list
//! ```

use std::sync::Arc;

use lexfuse_core::{DocumentNormalizer, FieldMode, FusedHit, FusionConfig, fuse};
use tracing::{debug, info, trace};

use crate::answer::{ContextAnswerer, NO_ANSWER};
use crate::config::SearchConfig;
use crate::embedding::Embedder;
use crate::error::{LexfuseError, Result};
use crate::store::{Fuzziness, KnnQuery, LexicalQuery, SearchStore};

/// Upper bound on `num_of_responses`; twice this is the store's default
/// result window.
pub const MAX_RESPONSES: usize = 5_000;

/// One user query with its retrieval parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Query as typed by the user.
    pub query: String,
    pub fields: Vec<String>,
    pub indices: Vec<String>,
    pub fuzziness: Fuzziness,
    /// Number of documents returned.
    pub num_of_responses: usize,
}

impl SearchRequest {
    /// A request using the configured defaults.
    pub fn new(query: impl Into<String>, defaults: &SearchConfig) -> Self {
        Self {
            query: query.into(),
            fields: defaults.fields.clone(),
            indices: defaults.indices.clone(),
            fuzziness: defaults.fuzziness,
            num_of_responses: defaults.num_of_responses,
        }
    }

    /// Validates this request.
    ///
    /// Checks:
    /// - `num_of_responses` is between 1 and [`MAX_RESPONSES`]
    /// - at least one field and one index are given
    pub fn validate(&self) -> Result<()> {
        if self.num_of_responses == 0 {
            return Err(LexfuseError::Config(
                "num_of_responses must be greater than 0".into(),
            ));
        }
        if self.num_of_responses > MAX_RESPONSES {
            return Err(LexfuseError::Config(format!(
                "num_of_responses must be at most {MAX_RESPONSES}"
            )));
        }
        if self.fields.is_empty() || self.indices.is_empty() {
            return Err(LexfuseError::Config(
                "a search needs at least one field and one index".into(),
            ));
        }
        Ok(())
    }
}

/// A document as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDocument {
    pub url: String,
    pub display_text: String,
}

/// Result of [`HybridSearcher::search_for_display`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Short answer, or [`NO_ANSWER`].
    pub short_answer: String,
    /// Fused documents in rank order.
    pub documents: Vec<DisplayDocument>,
    /// The fused hits behind `documents`.
    pub hits: Vec<FusedHit>,
}

impl SearchOutcome {
    fn empty() -> Self {
        Self {
            short_answer: NO_ANSWER.to_owned(),
            documents: Vec::new(),
            hits: Vec::new(),
        }
    }

    /// Whether a usable short answer was found.
    pub fn has_answer(&self) -> bool {
        self.short_answer != NO_ANSWER
    }
}

/// Runs hybrid queries against one store.
pub struct HybridSearcher {
    normalizer: Arc<DocumentNormalizer>,
    store: Arc<dyn SearchStore>,
    embedder: Arc<dyn Embedder>,
    answerer: ContextAnswerer,
    fusion: FusionConfig,
    settings: SearchConfig,
}

impl std::fmt::Debug for HybridSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSearcher")
            .field("store", &self.store.name())
            .field("answerer", &self.answerer)
            .field("fusion", &self.fusion)
            .finish()
    }
}

impl HybridSearcher {
    pub fn new(
        normalizer: Arc<DocumentNormalizer>,
        store: Arc<dyn SearchStore>,
        embedder: Arc<dyn Embedder>,
        answerer: ContextAnswerer,
        fusion: FusionConfig,
        settings: SearchConfig,
    ) -> Self {
        Self {
            normalizer,
            store,
            embedder,
            answerer,
            fusion,
            settings,
        }
    }

    /// Query text sent to the store: the fully normalized form, or the
    /// whitespace-collapsed form when full normalization leaves nothing.
    pub fn prepare_query(&self, query: &str) -> Option<String> {
        let full = self.normalizer.normalize_text(query);
        if !full.is_empty() {
            return Some(full);
        }
        let light = self.normalizer.normalize_field(Some(query), FieldMode::Light);
        (!light.is_empty()).then_some(light)
    }

    /// Run lexical and vector retrieval concurrently and fuse the results.
    ///
    /// # Errors
    ///
    /// Propagates store and embedding failures.
    pub async fn retrieve(&self, request: &SearchRequest) -> Result<Vec<FusedHit>> {
        request.validate()?;
        let Some(text) = self.prepare_query(&request.query) else {
            debug!("query is empty after normalization");
            return Ok(Vec::new());
        };
        trace!(query = %request.query, normalized = %text, "prepared query");

        let pool = request.num_of_responses.saturating_mul(2);
        let lexical_query = LexicalQuery {
            text: text.clone(),
            fields: request.fields.clone(),
            indices: request.indices.clone(),
            fuzziness: request.fuzziness,
            size: pool,
        };

        let lexical = self.store.search(&lexical_query);
        let vector = async {
            let vector = self.embedder.embed(&text).await?;
            let knn_query = KnnQuery {
                vector,
                indices: request.indices.clone(),
                k: pool,
                num_candidates: self.settings.num_candidates.max(pool),
            };
            self.store.knn_search(&knn_query).await
        };
        let (lexical_hits, vector_hits) = tokio::try_join!(lexical, vector)?;

        let config = FusionConfig {
            rank_constant: self.fusion.rank_constant,
            top_k: request.num_of_responses,
        };
        Ok(fuse(&lexical_hits, &vector_hits, &config))
    }

    /// Answer `request` and list the matching documents.
    ///
    /// The answerer sees the query as typed; retrieval uses its normalized
    /// form. An empty query returns [`NO_ANSWER`] and no documents without
    /// calling anything external.
    ///
    /// # Errors
    ///
    /// Propagates store, embedding and arbitration failures. Failures of
    /// individual per-context answer calls are skipped.
    pub async fn search_for_display(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let hits = self.retrieve(request).await?;
        if hits.is_empty() {
            return Ok(SearchOutcome::empty());
        }

        let prefix = self.normalizer.options().display_prefix.as_str();
        let contexts: Vec<String> = hits
            .iter()
            .map(|hit| hit.display_value(&self.settings.context_field, prefix).to_owned())
            .collect();
        let short_answer = self.answerer.answer(&request.query, &contexts).await?;

        let documents = hits
            .iter()
            .map(|hit| DisplayDocument {
                url: hit.display_value(&self.settings.url_field, prefix).to_owned(),
                display_text: hit
                    .display_value(&self.settings.summary_field, prefix)
                    .to_owned(),
            })
            .collect();

        let outcome = SearchOutcome {
            short_answer,
            documents,
            hits,
        };
        info!(
            documents = outcome.documents.len(),
            answered = outcome.has_answer(),
            "search finished"
        );
        Ok(outcome)
    }
}
