//! Normalizer and fusion configuration with sensible defaults.
//!
//! Both structs deserialize from the `[normalizer]` and `[fusion]` sections
//! of the application config file; missing keys take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::text::LengthFloor;
use crate::types::DEFAULT_DISPLAY_PREFIX;

/// Rank constant used by reciprocal rank fusion when none is configured.
pub const DEFAULT_RANK_CONSTANT: u32 = 20;

/// Controls reciprocal rank fusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// The `k` in `1 / (rank + k)`. Larger values flatten the rank curve.
    pub rank_constant: u32,
    /// Maximum number of fused hits to return.
    pub top_k: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            rank_constant: DEFAULT_RANK_CONSTANT,
            top_k: 10,
        }
    }
}

impl FusionConfig {
    /// Validates this configuration.
    ///
    /// Checks:
    /// - `top_k` must be greater than 0
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.top_k == 0 {
            return Err(CoreError::Config("top_k must be greater than 0".into()));
        }
        Ok(())
    }
}

/// Behaviour switches of the document normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerOptions {
    /// Drop a record when every relevant field is empty after processing.
    pub drop_empty_records: bool,
    /// What the one-character token floor is measured on.
    pub length_floor: LengthFloor,
    /// Prefix of display companion entries in search records.
    pub display_prefix: String,
    /// Whether search records carry `{display_prefix}{field}` companions.
    pub emit_display_companions: bool,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            drop_empty_records: true,
            length_floor: LengthFloor::Processed,
            display_prefix: DEFAULT_DISPLAY_PREFIX.to_owned(),
            emit_display_companions: true,
        }
    }
}

impl NormalizerOptions {
    /// Validates this configuration.
    ///
    /// Checks:
    /// - `display_prefix` must not be empty when companions are emitted
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.emit_display_companions && self.display_prefix.is_empty() {
            return Err(CoreError::Config(
                "display_prefix must not be empty when display companions are enabled".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fusion_config() {
        let config = FusionConfig::default();
        assert_eq!(config.rank_constant, 20);
        assert_eq!(config.top_k, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_top_k_rejected() {
        let config = FusionConfig {
            top_k: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn zero_rank_constant_valid() {
        let config = FusionConfig {
            rank_constant: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_normalizer_options() {
        let options = NormalizerOptions::default();
        assert!(options.drop_empty_records);
        assert_eq!(options.length_floor, LengthFloor::Processed);
        assert_eq!(options.display_prefix, "display_");
        assert!(options.emit_display_companions);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn empty_prefix_rejected_with_companions() {
        let options = NormalizerOptions {
            display_prefix: String::new(),
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn empty_prefix_allowed_without_companions() {
        let options = NormalizerOptions {
            display_prefix: String::new(),
            emit_display_companions: false,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let options: NormalizerOptions =
            serde_json::from_str(r#"{"length_floor":"lemma"}"#).expect("deserialize");
        assert_eq!(options.length_floor, LengthFloor::Lemma);
        assert!(options.drop_empty_records);

        let fusion: FusionConfig = serde_json::from_str(r#"{"top_k":3}"#).expect("deserialize");
        assert_eq!(fusion.top_k, 3);
        assert_eq!(fusion.rank_constant, DEFAULT_RANK_CONSTANT);
    }
}
