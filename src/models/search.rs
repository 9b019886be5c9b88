use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::document::{Document, DocumentId};

/// Search parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchParams {
    pub term: String,
    /// Properties to search; `None` searches every string property
    #[serde(default)]
    pub properties: Option<Vec<String>>,
    /// Match whole words only instead of word prefixes
    #[serde(default)]
    pub exact: bool,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

impl SearchParams {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            properties: None,
            exact: false,
            offset: 0,
            limit: default_limit(),
        }
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A single scored hit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocumentId,
    pub score: f64,
    pub document: Document,
}

/// Search results with timing information
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResults {
    pub count: usize,
    pub hits: Vec<SearchHit>,
    #[serde(with = "duration_micros")]
    pub elapsed: Duration,
}

impl SearchResults {
    pub fn empty(elapsed: Duration) -> Self {
        Self {
            count: 0,
            hits: Vec::new(),
            elapsed,
        }
    }

    /// Hit ids in rank order
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.id.as_str()).collect()
    }
}

mod duration_micros {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_micros() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_micros(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_defaults() {
        let params = SearchParams::new("rust");
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset, 0);
        assert!(!params.exact);
        assert!(params.properties.is_none());
    }

    #[test]
    fn test_search_params_builder() {
        let params = SearchParams::new("бар")
            .with_properties(["joke"])
            .exact(true)
            .with_limit(3);
        assert_eq!(params.properties, Some(vec!["joke".to_string()]));
        assert!(params.exact);
        assert_eq!(params.limit, 3);
    }

    #[test]
    fn test_search_params_deserialize_with_defaults() {
        let params: SearchParams = serde_json::from_str(r#"{"term":"бар"}"#).unwrap();
        assert_eq!(params.term, "бар");
        assert_eq!(params.limit, 10);
    }

    #[test]
    fn test_results_elapsed_serializes_as_micros() {
        let results = SearchResults::empty(Duration::from_millis(2));
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["elapsed"], 2000);
        assert_eq!(json["count"], 0);
    }
}
