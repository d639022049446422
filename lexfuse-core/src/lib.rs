//! # lexfuse-core
//!
//! Bilingual (Russian/English) text normalization and reciprocal rank fusion
//! for hybrid search.
//!
//! This crate is pure: no network, no async runtime. The search store, the
//! embedding model and the language model live in the `lexfuse` crate; this
//! one prepares the text they see and merges what they return.
//!
//! ## Design
//!
//! - Mixed-script cells are split into Latin and Cyrillic runs, each handed
//!   to a pluggable [`Lemmatizer`] in its own language
//! - Stop words, punctuation and one-character tokens are dropped; clock
//!   times collapse to a single `time` token
//! - Every document yields a fully normalized search record and a
//!   whitespace-only display record
//! - Lexical and vector hit lists are merged by rank position with RRF
//!
//! ## Failure model
//!
//! Normalization and fusion never fail on bad input. Absent, null-like and
//! empty cells become empty strings. Only configuration validation and
//! dictionary loading return errors.
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use lexfuse_core::{DocumentNormalizer, FieldSchema, LexiconLemmatizer, NormalizerOptions};
//!
//! let normalizer = DocumentNormalizer::new(
//!     Arc::new(LexiconLemmatizer::new()),
//!     FieldSchema::default(),
//!     NormalizerOptions::default(),
//! )?;
//! assert_eq!(normalizer.normalize_text("The Rust  новости в 12:30"), "rust новости time");
//! # Ok::<(), lexfuse_core::CoreError>(())
//! ```

pub mod config;
pub mod error;
pub mod fusion;
pub mod lemma;
pub mod normalizer;
pub mod schema;
pub mod text;
pub mod types;

pub use config::{FusionConfig, NormalizerOptions, DEFAULT_RANK_CONSTANT};
pub use error::{CoreError, Result};
pub use fusion::fuse;
pub use lemma::{LexiconConfig, LexiconLemmatizer, Lemmatizer};
pub use normalizer::{DocumentNormalizer, NormalizedDocument};
pub use schema::{FieldSchema, FieldSpec};
pub use text::LengthFloor;
pub use types::{
    Alphabet, DocumentRecord, FieldMode, FusedHit, Hit, Language, Lemma, RawDocument, Segment,
    DEFAULT_DISPLAY_PREFIX,
};
