//! Elasticsearch REST adapter.
//!
//! Lexical search is a `multi_match` / `best_fields` query with fuzziness,
//! vector search a top-level `knn` section on the embedding field. Hit
//! sources are flattened to string fields: numbers and booleans are
//! stringified, arrays and objects (the stored embedding) are skipped.

use std::time::Duration;

use async_trait::async_trait;
use lexfuse_core::{DocumentRecord, Hit};
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use super::{KnnQuery, LexicalQuery, SearchStore, StoredDocument};
use crate::config::StoreConfig;
use crate::error::{LexfuseError, Result};

/// Search store backed by an Elasticsearch cluster.
pub struct ElasticStore {
    base_url: String,
    embedding_field: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for ElasticStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticStore")
            .field("base_url", &self.base_url)
            .field("embedding_field", &self.embedding_field)
            .field("authenticated", &self.api_key.is_some())
            .finish()
    }
}

impl ElasticStore {
    /// Build a store client, resolving the API key once.
    ///
    /// # Errors
    ///
    /// Returns [`LexfuseError::Config`] if the key cannot be resolved and
    /// [`LexfuseError::Store`] if the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let api_key = config.api_key.resolve()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LexfuseError::Store(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_owned(),
            embedding_field: config.embedding_field.clone(),
            api_key,
            client,
        })
    }

    fn search_url(&self, indices: &[String]) -> String {
        let indices: Vec<_> = indices.iter().map(|i| urlencoding::encode(i)).collect();
        format!("{}/{}/_search", self.base_url, indices.join(","))
    }

    /// `_doc` endpoint of `index`. Index and id are escaped as single path
    /// segments.
    fn document_url(&self, index: &str, id: Option<&str>) -> String {
        let index = urlencoding::encode(index);
        match id {
            Some(id) => format!("{}/{index}/_doc/{}", self.base_url, urlencoding::encode(id)),
            None => format!("{}/{index}/_doc", self.base_url),
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("ApiKey {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| LexfuseError::Store(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LexfuseError::Store(format!("invalid response body: {e}")))
    }
}

/// Map an HTTP error status to a store error with the cluster's reason.
fn map_http_error(status: reqwest::StatusCode, body: &str) -> LexfuseError {
    let message = extract_error_message(body);
    match status.as_u16() {
        401 | 403 => LexfuseError::Store(format!("authentication failed: {message}")),
        404 => LexfuseError::Store(format!("index not found: {message}")),
        code => LexfuseError::Store(format!("HTTP {code}: {message}")),
    }
}

/// Extract `error.reason` (or a string `error`) from an error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            error
                .get("reason")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Request body of a lexical search.
fn lexical_body(query: &LexicalQuery) -> Value {
    json!({
        "size": query.size,
        "query": {
            "multi_match": {
                "query": query.text,
                "fields": query.fields,
                "type": "best_fields",
                "fuzziness": query.fuzziness,
            }
        }
    })
}

/// Request body of a kNN search on `field`.
fn knn_body(query: &KnnQuery, field: &str) -> Value {
    json!({
        "size": query.k,
        "knn": {
            "field": field,
            "query_vector": query.vector,
            "k": query.k,
            "num_candidates": query.num_candidates,
        }
    })
}

/// Parse `hits.hits` of a search response, in rank order.
fn parse_hits(response: &Value) -> Result<Vec<Hit>> {
    let hits = response
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .ok_or_else(|| LexfuseError::Store("response has no hits.hits array".into()))?;

    hits.iter()
        .map(|hit| {
            let id = hit
                .get("_id")
                .and_then(Value::as_str)
                .ok_or_else(|| LexfuseError::Store("hit without _id".into()))?;
            let score = hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0);
            let source = hit
                .get("_source")
                .and_then(Value::as_object)
                .map(flatten_source)
                .unwrap_or_default();
            Ok(Hit {
                id: id.to_owned(),
                score,
                source,
            })
        })
        .collect()
}

fn flatten_source(source: &Map<String, Value>) -> DocumentRecord {
    source
        .iter()
        .filter_map(|(name, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((name.clone(), text))
        })
        .collect()
}

/// Body of an indexed document: record fields plus the embedding.
fn document_body(document: &StoredDocument, embedding_field: &str) -> Value {
    let mut body: Map<String, Value> = document
        .record
        .iter()
        .map(|(name, value)| (name.to_owned(), Value::String(value.to_owned())))
        .collect();
    if let Some(embedding) = &document.embedding {
        body.insert(embedding_field.to_owned(), json!(embedding));
    }
    Value::Object(body)
}

#[async_trait]
impl SearchStore for ElasticStore {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn search(&self, query: &LexicalQuery) -> Result<Vec<Hit>> {
        trace!(text = %query.text, "lexical search");
        let response = self
            .post(&self.search_url(&query.indices), &lexical_body(query))
            .await?;
        let hits = parse_hits(&response)?;
        debug!(count = hits.len(), indices = ?query.indices, "lexical hits");
        Ok(hits)
    }

    async fn knn_search(&self, query: &KnnQuery) -> Result<Vec<Hit>> {
        let response = self
            .post(
                &self.search_url(&query.indices),
                &knn_body(query, &self.embedding_field),
            )
            .await?;
        let hits = parse_hits(&response)?;
        debug!(count = hits.len(), indices = ?query.indices, "knn hits");
        Ok(hits)
    }

    async fn index_document(&self, index: &str, document: &StoredDocument) -> Result<()> {
        let url = self.document_url(index, document.id.as_deref());
        self.post(&url, &document_body(document, &self.embedding_field))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::store::Fuzziness;

    #[test]
    fn lexical_body_shape() {
        let query = LexicalQuery {
            text: "новость rust".into(),
            fields: vec!["title".into(), "content".into()],
            indices: vec!["news".into()],
            fuzziness: Fuzziness::Auto,
            size: 10,
        };
        assert_eq!(
            lexical_body(&query),
            json!({
                "size": 10,
                "query": {"multi_match": {
                    "query": "новость rust",
                    "fields": ["title", "content"],
                    "type": "best_fields",
                    "fuzziness": "AUTO"
                }}
            })
        );
    }

    #[test]
    fn knn_body_shape() {
        let query = KnnQuery {
            vector: vec![0.5, -0.25],
            indices: vec!["news".into()],
            k: 6,
            num_candidates: 100,
        };
        let body = knn_body(&query, "content_embedding");
        assert_eq!(body["knn"]["field"], "content_embedding");
        assert_eq!(body["knn"]["k"], 6);
        assert_eq!(body["knn"]["num_candidates"], 100);
        assert_eq!(body["knn"]["query_vector"], json!([0.5, -0.25]));
    }

    #[test]
    fn hits_are_flattened() {
        let response = json!({
            "hits": {"hits": [
                {"_id": "1", "_score": 3.5, "_source": {
                    "title": "A", "views": 42, "content_embedding": [0.1, 0.2], "missing": null
                }},
                {"_id": "2", "_score": null, "_source": {"title": "B", "flag": true}}
            ]}
        });
        let hits = parse_hits(&response).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source.get("views"), Some("42"));
        assert!(!hits[0].source.contains("content_embedding"));
        assert!(!hits[0].source.contains("missing"));
        assert_eq!(hits[1].score, 0.0);
        assert_eq!(hits[1].source.get("flag"), Some("true"));
    }

    #[test]
    fn malformed_response_is_store_error() {
        let err = parse_hits(&json!({"took": 1})).unwrap_err();
        assert_eq!(err.code(), "STORE_ERROR");
        let err = parse_hits(&json!({"hits": {"hits": [{"_score": 1.0}]}})).unwrap_err();
        assert!(err.to_string().contains("_id"));
    }

    #[test]
    fn error_reason_extracted() {
        let body = r#"{"error":{"type":"index_not_found_exception","reason":"no such index [x]"},"status":404}"#;
        assert_eq!(extract_error_message(body), "no such index [x]");
        assert_eq!(extract_error_message(r#"{"error":"plain"}"#), "plain");
        assert_eq!(extract_error_message("gateway down"), "gateway down");

        let err = map_http_error(reqwest::StatusCode::NOT_FOUND, body);
        assert!(err.to_string().contains("index not found"));
    }

    #[test]
    fn document_body_includes_embedding() {
        let document = StoredDocument {
            id: None,
            record: [("title", "rust")].into_iter().collect(),
            embedding: Some(vec![1.0, 2.0]),
        };
        let body = document_body(&document, "content_embedding");
        assert_eq!(body, json!({"title": "rust", "content_embedding": [1.0, 2.0]}));
    }

    #[test]
    fn document_ids_are_single_path_segments() {
        let store = ElasticStore::new(&StoreConfig {
            url: "http://es:9200/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            store.document_url("news", Some("2024/05#lead?draft")),
            "http://es:9200/news/_doc/2024%2F05%23lead%3Fdraft"
        );
        assert_eq!(store.document_url("news", None), "http://es:9200/news/_doc");
        assert_eq!(
            store.search_url(&["news".into(), "a/b".into()]),
            "http://es:9200/news,a%2Fb/_search"
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let store = ElasticStore::new(&StoreConfig {
            api_key: crate::secret::SecretRef::Literal {
                value: "super-secret".into(),
            },
            ..Default::default()
        })
        .unwrap();
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("authenticated: true"));
    }
}
