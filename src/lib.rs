//! # lexfuse
//!
//! Hybrid lexical + vector search over bilingual (Russian/English) news-like
//! documents, with a short LLM-extracted answer on top of the ranked list.
//!
//! ## Design
//!
//! - Text work (segmentation, lemmatization, filtering, RRF) lives in the
//!   network-free [`lexfuse_core`] crate
//! - The search store, embedding model and LLM are async traits with HTTP
//!   implementations (Elasticsearch, OpenAI-compatible embeddings,
//!   YandexGPT or OpenAI-compatible chat)
//! - Configuration is one TOML file, loaded once and injected; secrets are
//!   resolved when clients are built
//!
//! ## Failure model
//!
//! Store, embedding and arbitration failures propagate as distinct
//! [`LexfuseError`] kinds. Failed per-context answer calls are logged and
//! skipped.

pub mod answer;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod search;
pub mod secret;
pub mod store;

use std::sync::Arc;

pub use answer::{AnswerConfig, ContextAnswerer, NO_ANSWER};
pub use completion::{CompletionClient, build_completion_client};
pub use config::{AppConfig, IndexKind, IndexTarget, LlmApiType};
pub use embedding::{Embedder, HttpEmbedder};
pub use error::{LexfuseError, Result};
pub use indexer::{IndexReport, Indexer, load_documents};
pub use search::{DisplayDocument, HybridSearcher, SearchOutcome, SearchRequest};
pub use secret::SecretRef;
pub use store::{ElasticStore, Fuzziness, SearchStore};

use lexfuse_core::{DocumentNormalizer, LexiconLemmatizer};

/// Build the document normalizer with the built-in lexicon lemmatizer.
///
/// # Errors
///
/// Returns an error if a lemma dictionary cannot be loaded or the schema or
/// normalizer options are invalid.
pub fn build_normalizer(config: &AppConfig) -> Result<Arc<DocumentNormalizer>> {
    let lemmatizer = LexiconLemmatizer::from_config(&config.lexicon)?;
    let normalizer = DocumentNormalizer::new(
        Arc::new(lemmatizer),
        config.schema.clone(),
        config.normalizer.clone(),
    )?;
    Ok(Arc::new(normalizer))
}

/// Build a [`HybridSearcher`] talking to the configured services.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a client cannot be
/// built.
pub fn build_searcher(config: &AppConfig) -> Result<HybridSearcher> {
    config.validate()?;
    let answerer = ContextAnswerer::new(build_completion_client(&config.llm)?, config.answer.clone())?;
    Ok(HybridSearcher::new(
        build_normalizer(config)?,
        Arc::new(ElasticStore::new(&config.store)?),
        Arc::new(HttpEmbedder::new(&config.embedding)?),
        answerer,
        config.fusion.clone(),
        config.search.clone(),
    ))
}

/// Build an [`Indexer`] writing to the configured store.
///
/// The LLM section is not needed for indexing and is not validated here.
///
/// # Errors
///
/// Returns an error if the normalizer or a client cannot be built.
pub fn build_indexer(config: &AppConfig) -> Result<Indexer> {
    Ok(Indexer::new(
        build_normalizer(config)?,
        Arc::new(ElasticStore::new(&config.store)?),
        Arc::new(HttpEmbedder::new(&config.embedding)?),
        &config.indexing,
    ))
}
