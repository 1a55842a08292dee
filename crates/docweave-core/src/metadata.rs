//! Document metadata mapping.
//!
//! [`Metadata`] holds the key/value fields extracted from a frontmatter block
//! or a JSON `metadata` object. Keys keep their document order; values are
//! YAML scalars, sequences, or nested mappings. Reserved keys by convention:
//! `title`, `category`, `tags`, `author`, `order`, `published`, `createdAt`,
//! `updatedAt` — any other key passes through as an extension field.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use yaml_serde::{Mapping, Value};

use crate::error::{Error, Result};

/// Ordered document metadata.
///
/// A thin wrapper over [`yaml_serde::Mapping`] with typed accessors for the
/// common cases. Absence of metadata is the empty mapping, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Mapping);

impl Metadata {
    /// Create an empty metadata mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no fields are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert a field, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(Value::String(key.into()), value);
    }

    /// Get a raw field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.as_str()
    }

    /// Get a string list field.
    ///
    /// Returns an empty vec if the field is missing or not a sequence.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(|v| v.as_sequence())
            .map(|seq| {
                seq.iter()
                    .filter_map(|item| item.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deserialize the metadata into a caller-defined type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        yaml_serde::from_value(Value::Mapping(self.0.clone())).map_err(|e| {
            Error::malformed("metadata", format!("failed to deserialize metadata: {e}"))
        })
    }

    /// Iterate over fields in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.0.iter()
    }

    /// Consume the wrapper, yielding the underlying mapping.
    pub fn into_inner(self) -> Mapping {
        self.0
    }
}

impl From<Mapping> for Metadata {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn sample() -> Metadata {
        let mut meta = Metadata::new();
        meta.insert("title", Value::String("Getting Started".into()));
        meta.insert(
            "tags",
            Value::Sequence(vec![
                Value::String("intro".into()),
                Value::String("setup".into()),
            ]),
        );
        meta.insert("order", Value::Number(3.into()));
        meta
    }

    #[test]
    fn test_empty() {
        let meta = Metadata::new();
        assert!(meta.is_empty());
        assert_eq!(meta.len(), 0);
        assert!(meta.get_str("title").is_none());
        assert!(meta.get_string_list("tags").is_empty());
    }

    #[test]
    fn test_get_str() {
        let meta = sample();
        assert_eq!(meta.get_str("title"), Some("Getting Started"));
        assert_eq!(meta.get_str("order"), None); // not a string
        assert_eq!(meta.get_str("missing"), None);
    }

    #[test]
    fn test_get_string_list() {
        let meta = sample();
        assert_eq!(meta.get_string_list("tags"), vec!["intro", "setup"]);
        assert!(meta.get_string_list("title").is_empty()); // not a sequence
    }

    #[test]
    fn test_insert_preserves_order() {
        let meta = sample();
        let keys: Vec<&str> = meta.iter().filter_map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["title", "tags", "order"]);
    }

    #[test]
    fn test_deserialize_into_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Meta {
            title: String,
            #[serde(default)]
            tags: Vec<String>,
            order: Option<i64>,
        }

        let meta: Meta = sample().deserialize().unwrap();
        assert_eq!(meta.title, "Getting Started");
        assert_eq!(meta.tags, vec!["intro", "setup"]);
        assert_eq!(meta.order, Some(3));
    }

    #[test]
    fn test_serde_transparent() {
        let meta = sample();
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.contains("\"title\":\"Getting Started\""));

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get_str("title"), Some("Getting Started"));
    }
}
