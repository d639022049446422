//! Error types for the lexfuse-core crate.
//!
//! Normalization and rank fusion never fail on bad input; the only fallible
//! operations here are configuration validation and loading lemma
//! dictionaries from disk.

/// Errors that can occur while setting up the text pipeline or fuser.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid normalizer, schema or fusion configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A lemma dictionary could not be read or parsed.
    #[error("lexicon error: {0}")]
    Lexicon(String),
}

/// Convenience type alias for lexfuse-core results.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = CoreError::Config("top_k must be greater than 0".into());
        assert_eq!(err.to_string(), "config error: top_k must be greater than 0");
    }

    #[test]
    fn display_lexicon() {
        let err = CoreError::Lexicon("line 3: missing tab".into());
        assert_eq!(err.to_string(), "lexicon error: line 3: missing tab");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
