//! Wire contract tests for the OpenAI-compatible embedding client.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use lexfuse::config::EmbeddingConfig;
use lexfuse::{Embedder, HttpEmbedder, SecretRef};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn embedder(server: &MockServer, dimensions: Option<usize>) -> HttpEmbedder {
    HttpEmbedder::new(&EmbeddingConfig {
        api_url: server.uri(),
        model: "text-embedding-3-small".into(),
        api_key: SecretRef::Literal {
            value: "sk-emb".into(),
        },
        dimensions,
        ..Default::default()
    })
    .expect("embedder")
}

#[tokio::test]
async fn embeds_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer sk-emb"))
        .and(body_partial_json(json!({
            "model": "text-embedding-3-small",
            "input": "новость rust",
            "dimensions": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}],
            "model": "text-embedding-3-small"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vector = embedder(&server, Some(3))
        .embed("новость rust")
        .await
        .expect("embedding");
    assert_eq!(vector.len(), 3);
    assert!((vector[2] - 0.3).abs() < 1e-6);
}

#[tokio::test]
async fn wrong_dimension_is_embedding_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.1, 0.2]}]
        })))
        .mount(&server)
        .await;

    let err = embedder(&server, Some(3)).embed("x").await.unwrap_err();
    assert_eq!(err.code(), "EMBEDDING_ERROR");
}

#[tokio::test]
async fn server_error_is_embedding_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "model overloaded"}
        })))
        .mount(&server)
        .await;

    let err = embedder(&server, None).embed("x").await.unwrap_err();
    assert!(err.to_string().contains("model overloaded"));
}
