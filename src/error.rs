//! Error types for the lexfuse search pipeline.

use lexfuse_core::CoreError;

/// Top-level error type for indexing and querying.
///
/// The three external capabilities fail with distinct kinds so callers can
/// tell a store outage from an embedding or LLM failure.
#[derive(Debug, thiserror::Error)]
pub enum LexfuseError {
    /// Search store unreachable, rejected the request or returned garbage.
    #[error("store error: {0}")]
    Store(String),

    /// Embedding model call failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// LLM completion call failed.
    #[error("completion error: {0}")]
    Completion(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Normalizer, fuser or lexicon setup error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl LexfuseError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(_) => "STORE_ERROR",
            Self::Embedding(_) => "EMBEDDING_ERROR",
            Self::Completion(_) => "COMPLETION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Core(CoreError::Config(_)) => "CONFIG_ERROR",
            Self::Core(CoreError::Lexicon(_)) => "LEXICON_ERROR",
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LexfuseError>;

/// Extract a provider error message from a JSON error body.
///
/// Understands `{"error": {"message": ..}}` and `{"message": ..}`; anything
/// else is returned verbatim.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}
