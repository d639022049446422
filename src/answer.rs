//! Short-answer extraction over ranked contexts.
//!
//! Every context is asked the question on its own; replies equal to the
//! [`NO_ANSWER`] sentinel are discarded. The remaining candidates go through
//! one arbitration call that picks the best of them.
//!
//! # Failure policy
//!
//! A failed or timed-out per-context call only loses that context. A failed
//! or timed-out arbitration call fails the whole answer.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::completion::CompletionClient;
use crate::error::{LexfuseError, Result};

/// Reply meaning "the context does not answer the question".
pub const NO_ANSWER: &str = "0";

/// Instruction for the per-context call.
pub const DEFAULT_ANSWER_PROMPT: &str = "Ты внимательно анализируешь предоставленные документы и точно отвечаешь на вопросы по ним. Если нужной информации нет, то в качестве ответа напиши только число 0 и ничего больше.";

/// Instruction for the arbitration call.
pub const DEFAULT_ARBITRATION_PROMPT: &str = "На каждой строке тебе дан один вариант ответа, ты внимательно анализируешь их на соответствие вопросу и возвращаешь лучший из них, только его.";

/// Short-answer extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Per-context calls in flight at once. `1` asks sequentially.
    pub max_concurrency: usize,
    /// Deadline of each completion call, in seconds.
    pub call_timeout_secs: u64,
    pub answer_prompt: String,
    pub arbitration_prompt: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            call_timeout_secs: 30,
            answer_prompt: DEFAULT_ANSWER_PROMPT.to_owned(),
            arbitration_prompt: DEFAULT_ARBITRATION_PROMPT.to_owned(),
        }
    }
}

impl AnswerConfig {
    /// Validates this configuration.
    ///
    /// Checks:
    /// - `max_concurrency` and `call_timeout_secs` are greater than 0
    /// - both prompts are non-empty
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(LexfuseError::Config(
                "answer.max_concurrency must be greater than 0".into(),
            ));
        }
        if self.call_timeout_secs == 0 {
            return Err(LexfuseError::Config(
                "answer.call_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.answer_prompt.trim().is_empty() || self.arbitration_prompt.trim().is_empty() {
            return Err(LexfuseError::Config(
                "answer prompts must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Extracts one short answer from a list of contexts.
pub struct ContextAnswerer {
    client: Arc<dyn CompletionClient>,
    config: AnswerConfig,
}

impl std::fmt::Debug for ContextAnswerer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextAnswerer")
            .field("client", &self.client.name())
            .field("max_concurrency", &self.config.max_concurrency)
            .field("call_timeout_secs", &self.config.call_timeout_secs)
            .finish()
    }
}

impl ContextAnswerer {
    /// # Errors
    ///
    /// Returns [`LexfuseError::Config`] if `config` is invalid.
    pub fn new(client: Arc<dyn CompletionClient>, config: AnswerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.config.call_timeout_secs)
    }

    /// The best short answer to `query`, or [`NO_ANSWER`].
    ///
    /// Arbitration runs whenever at least one candidate exists, even a
    /// single one, and its reply is returned verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`LexfuseError::Completion`] if the arbitration call fails or
    /// times out.
    pub async fn answer(&self, query: &str, contexts: &[String]) -> Result<String> {
        let candidates = self.candidates(query, contexts).await;
        if candidates.is_empty() {
            debug!(contexts = contexts.len(), "no context produced an answer");
            return Ok(NO_ANSWER.to_owned());
        }
        self.arbitrate(query, &candidates).await
    }

    /// Ask every context, keeping non-sentinel replies in context order.
    pub async fn candidates(&self, query: &str, contexts: &[String]) -> Vec<String> {
        let replies: Vec<Option<String>> = stream::iter(
            contexts
                .iter()
                .enumerate()
                .map(|(index, context)| self.ask_context(index, query, context)),
        )
        .buffered(self.config.max_concurrency)
        .collect()
        .await;

        let candidates: Vec<String> = replies.into_iter().flatten().collect();
        debug!(
            contexts = contexts.len(),
            candidates = candidates.len(),
            "collected answer candidates"
        );
        candidates
    }

    async fn ask_context(&self, index: usize, query: &str, context: &str) -> Option<String> {
        let call = self
            .client
            .complete(&self.config.answer_prompt, context, query);
        match tokio::time::timeout(self.call_timeout(), call).await {
            Ok(Ok(reply)) if reply == NO_ANSWER => None,
            Ok(Ok(reply)) => Some(reply),
            Ok(Err(e)) => {
                warn!(context = index, error = %e, "answer call failed, skipping context");
                None
            }
            Err(_) => {
                warn!(
                    context = index,
                    timeout_secs = self.config.call_timeout_secs,
                    "answer call timed out, skipping context"
                );
                None
            }
        }
    }

    /// Pick the best of `candidates`, one per line.
    ///
    /// # Errors
    ///
    /// Returns [`LexfuseError::Completion`] if the call fails or times out.
    pub async fn arbitrate(&self, query: &str, candidates: &[String]) -> Result<String> {
        let joined = candidates.join("\n");
        let call = self
            .client
            .complete(&self.config.arbitration_prompt, &joined, query);
        match tokio::time::timeout(self.call_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(LexfuseError::Completion(format!(
                "arbitration timed out after {}s",
                self.config.call_timeout_secs
            ))),
        }
    }
}
