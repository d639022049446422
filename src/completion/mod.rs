//! LLM completion capability.
//!
//! A completion is one stateless request: a system instruction, a document
//! and a question. Both wire formats send the document and the question as
//! two separate user messages.

pub mod openai;
pub mod yandex;

pub use openai::OpenAiChatClient;
pub use yandex::YandexGptClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{LlmApiType, LlmConfig};
use crate::error::Result;

/// Asks a language model one question about one document.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Return the model's reply text.
    ///
    /// Failures (network, quota, malformed reply) are expected and reported
    /// as [`LexfuseError::Completion`](crate::LexfuseError::Completion).
    async fn complete(&self, system_prompt: &str, context: &str, question: &str)
    -> Result<String>;
}

/// User message carrying the document.
pub fn document_message(context: &str) -> String {
    format!("Документ:\n{context}")
}

/// User message carrying the question.
pub fn question_message(question: &str) -> String {
    format!("Вопрос\n{question}")
}

/// Build the client selected by `config.api_type`.
///
/// # Errors
///
/// Returns an error if the API key cannot be resolved or the HTTP client
/// cannot be built.
pub fn build_completion_client(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>> {
    Ok(match config.api_type {
        LlmApiType::YandexGpt => Arc::new(YandexGptClient::new(config)?),
        LlmApiType::OpenAiCompletions => Arc::new(OpenAiChatClient::new(config)?),
    })
}
