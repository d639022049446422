//! Explicit document schema: which fields exist and how each is processed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::FieldMode;

/// One configured field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub mode: FieldMode,
}

impl FieldSpec {
    pub fn full(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: FieldMode::Full,
        }
    }

    pub fn light(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: FieldMode::Light,
        }
    }
}

/// Ordered, fixed set of document fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub fields: Vec<FieldSpec>,
}

impl Default for FieldSchema {
    /// The news-article layout: `url` kept as is, text fields fully processed.
    fn default() -> Self {
        Self {
            fields: vec![
                FieldSpec::light("url"),
                FieldSpec::full("title"),
                FieldSpec::full("summary"),
                FieldSpec::full("content"),
                FieldSpec::full("tags"),
            ],
        }
    }
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Mode of `name`, or `None` if the field is not part of the schema.
    pub fn mode(&self, name: &str) -> Option<FieldMode> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.mode)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields whose emptiness decides whether a search record is kept: the
    /// fully processed ones, or every field when none is.
    pub fn relevant_names(&self) -> Vec<&str> {
        let full: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.mode == FieldMode::Full)
            .map(|f| f.name.as_str())
            .collect();
        if full.is_empty() {
            self.names().collect()
        } else {
            full
        }
    }

    /// Validates this schema.
    ///
    /// Checks:
    /// - at least one field is configured
    /// - field names are non-empty and unique
    /// - no field name starts with `display_prefix`
    pub fn validate(&self, display_prefix: &str) -> Result<(), CoreError> {
        if self.fields.is_empty() {
            return Err(CoreError::Config(
                "schema must contain at least one field".into(),
            ));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(CoreError::Config("schema field name is empty".into()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::Config(format!(
                    "schema field '{}' is declared twice",
                    field.name
                )));
            }
            if !display_prefix.is_empty() && field.name.starts_with(display_prefix) {
                return Err(CoreError::Config(format!(
                    "schema field '{}' collides with display prefix '{display_prefix}'",
                    field.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_is_valid() {
        let schema = FieldSchema::default();
        assert!(schema.validate("display_").is_ok());
        assert_eq!(schema.mode("url"), Some(FieldMode::Light));
        assert_eq!(schema.mode("content"), Some(FieldMode::Full));
        assert_eq!(schema.mode("missing"), None);
    }

    #[test]
    fn relevant_names_are_full_fields() {
        let schema = FieldSchema::default();
        assert_eq!(
            schema.relevant_names(),
            vec!["title", "summary", "content", "tags"]
        );
    }

    #[test]
    fn relevant_names_fall_back_to_all_fields() {
        let schema = FieldSchema::new(vec![FieldSpec::light("a"), FieldSpec::light("b")]);
        assert_eq!(schema.relevant_names(), vec!["a", "b"]);
    }

    #[test]
    fn empty_schema_rejected() {
        let err = FieldSchema::new(vec![]).validate("display_").unwrap_err();
        assert!(err.to_string().contains("at least one field"));
    }

    #[test]
    fn duplicate_field_rejected() {
        let schema = FieldSchema::new(vec![FieldSpec::full("title"), FieldSpec::light("title")]);
        let err = schema.validate("display_").unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn prefixed_field_rejected() {
        let schema = FieldSchema::new(vec![FieldSpec::full("display_title")]);
        let err = schema.validate("display_").unwrap_err();
        assert!(err.to_string().contains("display prefix"));
    }

    #[test]
    fn field_spec_mode_defaults_to_light() {
        let spec: FieldSpec = serde_json::from_str(r#"{"name":"url"}"#).expect("deserialize");
        assert_eq!(spec.mode, FieldMode::Light);
    }
}
