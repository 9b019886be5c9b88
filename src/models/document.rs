use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique document identifier (sequential decimal string)
pub type DocumentId = String;

/// Stored document: property name -> text
pub type Document = BTreeMap<String, String>;

/// Kind of an indexed property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
}

/// Index schema: property name -> kind
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(BTreeMap<String, FieldKind>);

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema with a single string property
    pub fn single(property: impl Into<String>) -> Self {
        Self::new().with_string(property)
    }

    pub fn with_string(mut self, property: impl Into<String>) -> Self {
        self.0.insert(property.into(), FieldKind::String);
        self
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    /// Names of the string properties, in order
    pub fn string_properties(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, kind)| matches!(kind, FieldKind::String))
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build a single-property document
pub fn document(property: &str, text: impl Into<String>) -> Document {
    let mut doc = Document::new();
    doc.insert(property.to_string(), text.into());
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_serializes_as_plain_map() {
        let schema = Schema::single("joke");
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r#"{"joke":"string"}"#);

        let parsed: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn test_string_properties_are_ordered() {
        let schema = Schema::new().with_string("title").with_string("body");
        let props: Vec<&str> = schema.string_properties().collect();
        assert_eq!(props, vec!["body", "title"]);
        assert!(schema.contains("title"));
        assert!(!schema.contains("tags"));
    }
}
