//! YandexGPT Foundation Models `completion` API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{CompletionClient, document_message, question_message};
use crate::config::LlmConfig;
use crate::error::{LexfuseError, Result, extract_error_message};

const COMPLETION_PATH: &str = "/foundationModels/v1/completion";

/// Non-streaming YandexGPT client.
pub struct YandexGptClient {
    url: String,
    model_uri: String,
    folder_id: String,
    api_key: String,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl std::fmt::Debug for YandexGptClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexGptClient")
            .field("url", &self.url)
            .field("model_uri", &self.model_uri)
            .finish()
    }
}

impl YandexGptClient {
    /// Build the client. An API key is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`LexfuseError::Config`] if no key is configured or it cannot
    /// be resolved.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key.require("yandex_gpt")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LexfuseError::Completion(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: format!("{}{COMPLETION_PATH}", config.api_url.trim_end_matches('/')),
            model_uri: format!("gpt://{}/{}", config.folder_id, config.model),
            folder_id: config.folder_id.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn request_body(&self, system_prompt: &str, context: &str, question: &str) -> Value {
        let mut options = json!({
            "stream": false,
            "temperature": self.temperature,
        });
        if let Some(max_tokens) = self.max_tokens {
            // The API takes the limit as a string.
            options["maxTokens"] = json!(max_tokens.to_string());
        }
        json!({
            "modelUri": self.model_uri,
            "completionOptions": options,
            "messages": [
                {"role": "system", "text": system_prompt},
                {"role": "user", "text": document_message(context)},
                {"role": "user", "text": question_message(question)},
            ]
        })
    }
}

/// Reply text at `result.alternatives[0].message.text`.
fn parse_reply(body: &Value) -> Result<String> {
    body.pointer("/result/alternatives/0/message/text")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            LexfuseError::Completion("response has no result.alternatives[0].message.text".into())
        })
}

#[async_trait]
impl CompletionClient for YandexGptClient {
    fn name(&self) -> &str {
        "yandexgpt"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        context: &str,
        question: &str,
    ) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .header("x-folder-id", &self.folder_id)
            .json(&self.request_body(system_prompt, context, question))
            .send()
            .await
            .map_err(|e| LexfuseError::Completion(format!("YandexGPT request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(LexfuseError::Completion(format!(
                "YandexGPT HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&body_text)
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| LexfuseError::Completion(format!("invalid YandexGPT response: {e}")))?;
        let reply = parse_reply(&body)?;
        debug!(chars = reply.chars().count(), "YandexGPT reply");
        Ok(reply)
    }
}
