//! Configuration types for indexing and hybrid search.
//!
//! The whole file is `serde(default)`: an empty TOML document is a valid
//! configuration pointing at a local Elasticsearch and YandexGPT.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lexfuse_core::{FieldSchema, FusionConfig, LexiconConfig, NormalizerOptions};
use serde::{Deserialize, Serialize};

use crate::answer::AnswerConfig;
use crate::error::{LexfuseError, Result};
use crate::search::MAX_RESPONSES;
use crate::secret::SecretRef;
use crate::store::Fuzziness;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Search store connection.
    pub store: StoreConfig,
    /// Embedding model endpoint.
    pub embedding: EmbeddingConfig,
    /// LLM endpoint used for short answers.
    pub llm: LlmConfig,
    /// Short-answer extraction.
    pub answer: AnswerConfig,
    /// Query defaults.
    pub search: SearchConfig,
    /// Rank fusion.
    pub fusion: FusionConfig,
    /// Document normalizer switches.
    pub normalizer: NormalizerOptions,
    /// Built-in lemmatizer dictionaries.
    pub lexicon: LexiconConfig,
    /// Document fields and their processing modes.
    pub schema: FieldSchema,
    /// Where documents are written.
    pub indexing: IndexingConfig,
}

/// Search store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the Elasticsearch cluster.
    pub url: String,
    /// Optional `ApiKey` credential.
    pub api_key: SecretRef,
    /// Field holding the document embedding.
    pub embedding_field: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_owned(),
            api_key: SecretRef::None,
            embedding_field: "content_embedding".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// OpenAI-compatible embedding endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL; `/v1/embeddings` is appended.
    pub api_url: String,
    pub model: String,
    pub api_key: SecretRef,
    /// Expected vector length. Sent as `dimensions` and checked on replies.
    pub dimensions: Option<usize>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_owned(),
            model: "intfloat/multilingual-e5-small".to_owned(),
            api_key: SecretRef::None,
            dimensions: Some(384),
            timeout_secs: 30,
        }
    }
}

/// Wire format of the completion endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmApiType {
    /// Yandex Foundation Models `completion` API.
    #[default]
    YandexGpt,
    /// OpenAI-compatible `/v1/chat/completions`.
    OpenAiCompletions,
}

/// LLM endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_type: LlmApiType,
    /// Base URL of the provider.
    pub api_url: String,
    /// Model name; YandexGPT builds `gpt://{folder_id}/{model}` from it.
    pub model: String,
    /// Yandex Cloud folder. Required for [`LlmApiType::YandexGpt`].
    pub folder_id: String,
    pub api_key: SecretRef,
    pub temperature: f32,
    /// Optional reply length cap.
    pub max_tokens: Option<u32>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_type: LlmApiType::YandexGpt,
            api_url: "https://llm.api.cloud.yandex.net".to_owned(),
            model: "yandexgpt/latest".to_owned(),
            folder_id: String::new(),
            api_key: SecretRef::Env {
                var: "YANDEX_API_KEY".to_owned(),
            },
            temperature: 0.2,
            max_tokens: None,
            timeout_secs: 60,
        }
    }
}

/// Query defaults, overridable per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fields matched by lexical search.
    pub fields: Vec<String>,
    /// Indices queried.
    pub indices: Vec<String>,
    pub fuzziness: Fuzziness,
    /// Number of fused hits returned to the caller.
    pub num_of_responses: usize,
    /// kNN candidate pool per shard.
    pub num_candidates: usize,
    /// Field whose display text is handed to the answerer.
    pub context_field: String,
    /// Field shown next to each URL.
    pub summary_field: String,
    pub url_field: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fields: ["title", "summary", "content", "tags"]
                .into_iter()
                .map(String::from)
                .collect(),
            indices: vec!["news_analyzed".to_owned()],
            fuzziness: Fuzziness::Auto,
            num_of_responses: 5,
            num_candidates: 100,
            context_field: "content".to_owned(),
            summary_field: "summary".to_owned(),
            url_field: "url".to_owned(),
        }
    }
}

/// How a target index stores documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Display records; the store's own analyzer does the text work.
    Raw,
    /// Search records with display companions.
    Analyzed,
}

/// One index documents are written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTarget {
    pub name: String,
    pub kind: IndexKind,
}

impl IndexTarget {
    pub fn new(name: impl Into<String>, kind: IndexKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Indexing pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub targets: Vec<IndexTarget>,
    /// Field whose text is embedded.
    pub embedding_source: String,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            targets: vec![
                IndexTarget::new("news_standard", IndexKind::Raw),
                IndexTarget::new("news_analyzed", IndexKind::Analyzed),
            ],
            embedding_source: "content".to_owned(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| LexfuseError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LexfuseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/lexfuse/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("lexfuse").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("lexfuse")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/lexfuse-config/config.toml")
        }
    }

    /// Validates the whole configuration.
    ///
    /// Checks:
    /// - fusion, normalizer, schema and answer sections are valid
    /// - store and endpoint URLs are non-empty and timeouts positive
    /// - YandexGPT has a folder id
    /// - search has indices, fields and a response count within bounds
    /// - index target names are non-empty and unique
    pub fn validate(&self) -> Result<()> {
        self.fusion.validate()?;
        self.normalizer.validate()?;
        self.schema.validate(&self.normalizer.display_prefix)?;
        self.answer.validate()?;

        if self.store.url.trim().is_empty() {
            return Err(LexfuseError::Config("store.url must not be empty".into()));
        }
        if self.store.embedding_field.trim().is_empty() {
            return Err(LexfuseError::Config(
                "store.embedding_field must not be empty".into(),
            ));
        }
        if self.store.timeout_secs == 0
            || self.embedding.timeout_secs == 0
            || self.llm.timeout_secs == 0
        {
            return Err(LexfuseError::Config(
                "timeouts must be greater than 0".into(),
            ));
        }
        if self.embedding.api_url.trim().is_empty() || self.embedding.model.trim().is_empty() {
            return Err(LexfuseError::Config(
                "embedding.api_url and embedding.model must not be empty".into(),
            ));
        }
        if self.embedding.dimensions == Some(0) {
            return Err(LexfuseError::Config(
                "embedding.dimensions must be greater than 0".into(),
            ));
        }
        if self.llm.api_url.trim().is_empty() || self.llm.model.trim().is_empty() {
            return Err(LexfuseError::Config(
                "llm.api_url and llm.model must not be empty".into(),
            ));
        }
        if self.llm.api_type == LlmApiType::YandexGpt && self.llm.folder_id.trim().is_empty() {
            return Err(LexfuseError::Config(
                "llm.folder_id is required for yandex_gpt".into(),
            ));
        }
        if self.search.num_of_responses == 0 || self.search.num_of_responses > MAX_RESPONSES {
            return Err(LexfuseError::Config(format!(
                "search.num_of_responses must be between 1 and {MAX_RESPONSES}"
            )));
        }
        if self.search.indices.is_empty() || self.search.fields.is_empty() {
            return Err(LexfuseError::Config(
                "search.indices and search.fields must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for target in &self.indexing.targets {
            if target.name.trim().is_empty() {
                return Err(LexfuseError::Config("index target name is empty".into()));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(LexfuseError::Config(format!(
                    "index target '{}' is declared twice",
                    target.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn valid() -> AppConfig {
        AppConfig {
            llm: LlmConfig {
                folder_id: "b1g-folder".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn default_needs_only_folder_id() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("folder_id"));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn openai_does_not_need_folder() {
        let config = AppConfig {
            llm: LlmConfig {
                api_type: LlmApiType::OpenAiCompletions,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_match_reference_pipeline() {
        let config = AppConfig::default();
        assert_eq!(config.fusion.rank_constant, 20);
        assert_eq!(config.search.num_candidates, 100);
        assert_eq!(config.store.embedding_field, "content_embedding");
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.indexing.targets.len(), 2);
    }

    #[test]
    fn empty_toml_is_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
[llm]
folder_id = "abc"

[fusion]
top_k = 3

[search]
fuzziness = 2
indices = ["a", "b"]

[[schema.fields]]
name = "url"

[[schema.fields]]
name = "body"
mode = "full"

[[indexing.targets]]
name = "plain"
kind = "raw"
"#,
        )
        .unwrap();
        assert_eq!(config.llm.folder_id, "abc");
        assert_eq!(config.fusion.top_k, 3);
        assert_eq!(config.fusion.rank_constant, 20);
        assert_eq!(config.search.fuzziness, Fuzziness::Edits(2));
        assert_eq!(config.schema.fields.len(), 2);
        assert_eq!(config.indexing.targets, vec![IndexTarget::new("plain", IndexKind::Raw)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duplicate_targets_rejected() {
        let mut config = valid();
        config.indexing.targets = vec![
            IndexTarget::new("x", IndexKind::Raw),
            IndexTarget::new("x", IndexKind::Analyzed),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn core_validation_propagates() {
        let mut config = valid();
        config.fusion.top_k = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = valid();
        config.search.fuzziness = Fuzziness::Edits(1);
        config.llm.max_tokens = Some(500);

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[fusion]\ntop_k = \"many\"").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/lexfuse.toml")).unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
    }
}
