//! Embedding model capability.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::trace;

use crate::config::EmbeddingConfig;
use crate::error::{LexfuseError, Result, extract_error_message};

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic for identical input within one
/// process lifetime.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint.
pub struct HttpEmbedder {
    config: EmbeddingConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("model", &self.config.model)
            .field("api_url", &self.config.api_url)
            .field("dimensions", &self.config.dimensions)
            .finish()
    }
}

impl HttpEmbedder {
    /// Build the client, resolving the API key once.
    ///
    /// # Errors
    ///
    /// Returns [`LexfuseError::Config`] if the key cannot be resolved and
    /// [`LexfuseError::Embedding`] if the HTTP client cannot be built.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config.api_key.resolve()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LexfuseError::Embedding(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config: config.clone(),
            api_key,
            client,
        })
    }

    fn request_body(&self, text: &str) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "input": text,
        });
        if let Some(dimensions) = self.config.dimensions {
            body["dimensions"] = json!(dimensions);
        }
        body
    }
}

/// Read `data[0].embedding` and check its length against `expected`.
fn parse_embedding(response: &Value, expected: Option<usize>) -> Result<Vec<f32>> {
    let values = response
        .get("data")
        .and_then(|d| d.get(0))
        .and_then(|d| d.get("embedding"))
        .and_then(Value::as_array)
        .ok_or_else(|| LexfuseError::Embedding("response has no data[0].embedding".into()))?;

    let vector = values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|x| x as f32)
                .ok_or_else(|| LexfuseError::Embedding("embedding holds a non-number".into()))
        })
        .collect::<Result<Vec<f32>>>()?;

    if vector.is_empty() {
        return Err(LexfuseError::Embedding("embedding is empty".into()));
    }
    if let Some(dim) = expected.filter(|&d| d != vector.len()) {
        return Err(LexfuseError::Embedding(format!(
            "expected {dim} dimensions, got {}",
            vector.len()
        )));
    }
    Ok(vector)
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        trace!(text, "embedding");
        let url = format!(
            "{}/v1/embeddings",
            self.config.api_url.trim_end_matches('/')
        );
        let mut request = self.client.post(&url).json(&self.request_body(text));
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| LexfuseError::Embedding(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(LexfuseError::Embedding(format!(
                "HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&body_text)
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| LexfuseError::Embedding(format!("invalid response body: {e}")))?;
        parse_embedding(&body, self.config.dimensions)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn parses_embedding() {
        let body = json!({"data": [{"embedding": [0.5, 1.0, -2.0], "index": 0}]});
        assert_eq!(parse_embedding(&body, Some(3)).unwrap(), vec![0.5, 1.0, -2.0]);
        assert_eq!(parse_embedding(&body, None).unwrap().len(), 3);
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let body = json!({"data": [{"embedding": [0.5, 1.0]}]});
        let err = parse_embedding(&body, Some(3)).unwrap_err();
        assert!(err.to_string().contains("expected 3 dimensions, got 2"));
        assert_eq!(err.code(), "EMBEDDING_ERROR");
    }

    #[test]
    fn malformed_payloads_rejected() {
        assert!(parse_embedding(&json!({"data": []}), None).is_err());
        assert!(parse_embedding(&json!({"data": [{"embedding": []}]}), None).is_err());
        assert!(parse_embedding(&json!({"data": [{"embedding": ["x"]}]}), None).is_err());
    }

    #[test]
    fn request_body_carries_dimensions() {
        let embedder = HttpEmbedder::new(&EmbeddingConfig::default()).unwrap();
        let body = embedder.request_body("текст");
        assert_eq!(body["input"], "текст");
        assert_eq!(body["dimensions"], 384);

        let embedder = HttpEmbedder::new(&EmbeddingConfig {
            dimensions: None,
            ..Default::default()
        })
        .unwrap();
        assert!(embedder.request_body("x").get("dimensions").is_none());
    }
}
