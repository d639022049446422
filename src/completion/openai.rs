//! OpenAI-compatible `/v1/chat/completions` client (non-streaming).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{CompletionClient, document_message, question_message};
use crate::config::LlmConfig;
use crate::error::{LexfuseError, Result, extract_error_message};

/// Chat completions client for OpenAI and compatible servers.
pub struct OpenAiChatClient {
    url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiChatClient {
    /// Build the client. The API key is optional for local servers.
    ///
    /// # Errors
    ///
    /// Returns [`LexfuseError::Config`] if a configured key cannot be
    /// resolved.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key.resolve()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LexfuseError::Completion(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: format!(
                "{}/v1/chat/completions",
                config.api_url.trim_end_matches('/')
            ),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn request_body(&self, system_prompt: &str, context: &str, question: &str) -> Value {
        let mut body = json!({
            "model": self.model,
            "stream": false,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": document_message(context)},
                {"role": "user", "content": question_message(question)},
            ]
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    /// Map an HTTP error status to a completion error.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> LexfuseError {
        let message = extract_error_message(body);
        match status.as_u16() {
            401 => LexfuseError::Completion(format!("OpenAI authentication failed: {message}")),
            429 => LexfuseError::Completion(format!("OpenAI rate limited: {message}")),
            code => LexfuseError::Completion(format!("OpenAI HTTP {code}: {message}")),
        }
    }
}

/// Reply text at `choices[0].message.content`.
fn parse_reply(body: &Value) -> Result<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            LexfuseError::Completion("response has no choices[0].message.content".into())
        })
}

#[async_trait]
impl CompletionClient for OpenAiChatClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        context: &str,
        question: &str,
    ) -> Result<String> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .json(&self.request_body(system_prompt, context, question))
            .send()
            .await
            .map_err(|e| LexfuseError::Completion(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, &body_text));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| LexfuseError::Completion(format!("invalid OpenAI response: {e}")))?;
        let reply = parse_reply(&body)?;
        debug!(chars = reply.chars().count(), "OpenAI reply");
        Ok(reply)
    }
}
