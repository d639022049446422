//! Search store capability: lexical search, vector search and indexing.
//!
//! The store is a black box that ranks hits. [`ElasticStore`] talks to an
//! Elasticsearch cluster; tests substitute in-memory implementations.

pub mod elastic;

pub use elastic::ElasticStore;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use lexfuse_core::{DocumentRecord, Hit};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{LexfuseError, Result};

/// Edit-distance tolerance of lexical matching.
///
/// Serializes as `"AUTO"` or a bare integer, as the store expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fuzziness {
    /// Edit distance chosen from term length by the store.
    #[default]
    Auto,
    /// Fixed maximum edit distance.
    Edits(u8),
}

impl fmt::Display for Fuzziness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("AUTO"),
            Self::Edits(n) => write!(f, "{n}"),
        }
    }
}

impl Fuzziness {
    /// Largest edit distance the store accepts.
    pub const MAX_EDITS: u8 = 2;

    /// A fixed edit distance, rejecting values above [`Self::MAX_EDITS`].
    pub fn edits(n: i64) -> Result<Self> {
        match u8::try_from(n) {
            Ok(n) if n <= Self::MAX_EDITS => Ok(Self::Edits(n)),
            _ => Err(LexfuseError::Config(format!(
                "invalid edit distance {n}: expected 0-{}",
                Self::MAX_EDITS
            ))),
        }
    }
}

impl FromStr for Fuzziness {
    type Err = LexfuseError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let n = trimmed.parse::<i64>().map_err(|_| {
            LexfuseError::Config(format!(
                "invalid fuzziness '{s}': expected AUTO or 0-{}",
                Self::MAX_EDITS
            ))
        })?;
        Self::edits(n)
    }
}

impl Serialize for Fuzziness {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("AUTO"),
            Self::Edits(n) => serializer.serialize_u8(*n),
        }
    }
}

impl<'de> Deserialize<'de> for Fuzziness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FuzzinessVisitor;

        impl Visitor<'_> for FuzzinessVisitor {
            type Value = Fuzziness;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("\"AUTO\" or an edit distance")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Fuzziness, E> {
                value.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Fuzziness, E> {
                let value = i64::try_from(value).unwrap_or(i64::MAX);
                Fuzziness::edits(value).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Fuzziness, E> {
                Fuzziness::edits(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(FuzzinessVisitor)
    }
}

/// A full-text query over several fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalQuery {
    /// Already normalized query text.
    pub text: String,
    pub fields: Vec<String>,
    pub indices: Vec<String>,
    pub fuzziness: Fuzziness,
    /// Number of hits requested.
    pub size: usize,
}

/// A nearest-neighbour query.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnQuery {
    pub vector: Vec<f32>,
    pub indices: Vec<String>,
    /// Number of neighbours returned.
    pub k: usize,
    /// Candidate pool examined per shard.
    pub num_candidates: usize,
}

/// A document ready to be written to an index.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Option<String>,
    pub record: DocumentRecord,
    pub embedding: Option<Vec<f32>>,
}

/// A search backend returning hits in rank order.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "store"
    }

    /// Lexical (BM25-style) search.
    async fn search(&self, query: &LexicalQuery) -> Result<Vec<Hit>>;

    /// Vector similarity search.
    async fn knn_search(&self, query: &KnnQuery) -> Result<Vec<Hit>>;

    /// Write one document to `index`.
    async fn index_document(&self, index: &str, document: &StoredDocument) -> Result<()>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Wrapper {
        fuzziness: Fuzziness,
    }

    #[test]
    fn fuzziness_parses() {
        assert_eq!("AUTO".parse::<Fuzziness>().unwrap(), Fuzziness::Auto);
        assert_eq!("auto".parse::<Fuzziness>().unwrap(), Fuzziness::Auto);
        assert_eq!("2".parse::<Fuzziness>().unwrap(), Fuzziness::Edits(2));
        assert!("two".parse::<Fuzziness>().is_err());
    }

    #[test]
    fn fuzziness_above_store_limit_rejected() {
        assert_eq!("0".parse::<Fuzziness>().unwrap(), Fuzziness::Edits(0));
        let err = "3".parse::<Fuzziness>().unwrap_err();
        assert!(err.to_string().contains("expected 0-2"));
        assert!("255".parse::<Fuzziness>().is_err());
        assert!("-1".parse::<Fuzziness>().is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"fuzziness":3}"#).is_err());
    }

    #[test]
    fn fuzziness_display_matches_wire_form() {
        assert_eq!(Fuzziness::Auto.to_string(), "AUTO");
        assert_eq!(Fuzziness::Edits(1).to_string(), "1");
    }

    #[test]
    fn fuzziness_json_forms() {
        let auto = serde_json::to_value(Fuzziness::Auto).unwrap();
        assert_eq!(auto, serde_json::json!("AUTO"));
        let edits = serde_json::to_value(Fuzziness::Edits(2)).unwrap();
        assert_eq!(edits, serde_json::json!(2));

        let parsed: Wrapper = serde_json::from_str(r#"{"fuzziness":"AUTO"}"#).unwrap();
        assert_eq!(parsed.fuzziness, Fuzziness::Auto);
        let parsed: Wrapper = serde_json::from_str(r#"{"fuzziness":1}"#).unwrap();
        assert_eq!(parsed.fuzziness, Fuzziness::Edits(1));
        assert!(serde_json::from_str::<Wrapper>(r#"{"fuzziness":-1}"#).is_err());
    }

    #[test]
    fn fuzziness_toml_roundtrip() {
        for fuzziness in [Fuzziness::Auto, Fuzziness::Edits(0), Fuzziness::Edits(2)] {
            let text = toml::to_string(&Wrapper { fuzziness }).unwrap();
            let back: Wrapper = toml::from_str(&text).unwrap();
            assert_eq!(back.fuzziness, fuzziness);
        }
    }
}
