use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tracing::debug;

use crate::config::IndexSettings;
use crate::engine::prefix_tree;
use crate::engine::scoring::{tf_idf, top_k};
use crate::engine::snapshot::Snapshot;
use crate::error::{AnekdexError, Result};
use crate::models::*;
use crate::tokenizer::Tokenizer;

/// In-memory full-text index over string properties.
///
/// All state lives in a [`Snapshot`], so `save` is a clone and `load` is a
/// validated replace.
pub struct SearchIndex {
    settings: IndexSettings,
    tokenizer: Tokenizer,
    state: Snapshot,
    next_doc_id: u64,
    next_node_id: u64,
}

impl SearchIndex {
    pub fn new(settings: IndexSettings) -> Self {
        let tokenizer = Tokenizer::new(&settings.tokenizer_config);
        let mut state = Snapshot {
            schema: settings.schema.clone(),
            ..Default::default()
        };
        let mut next_node_id = 0u64;

        for property in settings.schema.string_properties() {
            let root = prefix_tree::create_root(&mut state.nodes, &mut next_node_id);
            state.index.insert(property.to_string(), root);
            state.frequencies.insert(property.to_string(), BTreeMap::new());
            state
                .token_occurrencies
                .insert(property.to_string(), BTreeMap::new());
        }

        Self {
            settings,
            tokenizer,
            state,
            next_doc_id: 1,
            next_node_id,
        }
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    pub fn schema(&self) -> &Schema {
        &self.settings.schema
    }

    pub fn len(&self) -> usize {
        self.state.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.docs.is_empty()
    }

    pub fn get_document(&self, id: &str) -> Option<&Document> {
        self.state.docs.get(id)
    }

    /// Insert a document and return its assigned id
    pub fn insert(&mut self, doc: Document) -> Result<DocumentId> {
        if let Some(unknown) = doc.keys().find(|k| !self.settings.schema.contains(k)) {
            return Err(AnekdexError::UnknownProperty(unknown.clone()));
        }
        if let Some(missing) = self
            .settings
            .schema
            .string_properties()
            .find(|p| !doc.contains_key(*p))
        {
            return Err(AnekdexError::InvalidDocument(format!(
                "missing property '{}'",
                missing
            )));
        }

        let doc_id = self.next_doc_id.to_string();
        self.next_doc_id += 1;

        for (property, text) in &doc {
            self.index_property(property, text, &doc_id)?;
        }
        self.state.docs.insert(doc_id.clone(), doc);
        Ok(doc_id)
    }

    fn index_property(&mut self, property: &str, text: &str, doc_id: &str) -> Result<()> {
        let root = self
            .state
            .index
            .get(property)
            .cloned()
            .ok_or_else(|| AnekdexError::UnknownProperty(property.to_string()))?;

        let counts = self.tokenizer.compute_term_frequencies(text);
        let total: u32 = counts.values().sum();

        for token in self.tokenizer.tokenize_unique(text) {
            prefix_tree::insert(
                &mut self.state.nodes,
                &mut self.next_node_id,
                &root,
                &token,
                doc_id,
            )?;
            *self
                .state
                .token_occurrencies
                .entry(property.to_string())
                .or_default()
                .entry(token)
                .or_insert(0) += 1;
        }

        let frequencies: BTreeMap<String, f64> = counts
            .into_iter()
            .map(|(token, count)| (token, count as f64 / total as f64))
            .collect();
        self.state
            .frequencies
            .entry(property.to_string())
            .or_default()
            .insert(doc_id.to_string(), frequencies);
        Ok(())
    }

    /// Search the index
    pub fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        let start = Instant::now();

        let properties: Vec<String> = match &params.properties {
            Some(props) => {
                if let Some(unknown) = props.iter().find(|p| !self.settings.schema.contains(p)) {
                    return Err(AnekdexError::UnknownProperty(unknown.clone()));
                }
                props.clone()
            }
            None => self
                .settings
                .schema
                .string_properties()
                .map(str::to_string)
                .collect(),
        };

        let query_tokens = self.tokenizer.tokenize_unique(&params.term);
        if query_tokens.is_empty() {
            return Ok(SearchResults::empty(start.elapsed()));
        }

        let total_docs = self.state.docs.len() as f64;
        let mut scores: HashMap<DocumentId, f64> = HashMap::new();

        for property in &properties {
            let Some(root) = self.state.index.get(property) else {
                continue;
            };
            let frequencies = self.state.frequencies.get(property);
            let occurrences = self.state.token_occurrencies.get(property);

            for token in &query_tokens {
                let matches = prefix_tree::find(&self.state.nodes, root, token, params.exact);
                for (word, doc_ids) in matches {
                    let df = occurrences
                        .and_then(|o| o.get(&word))
                        .copied()
                        .unwrap_or(doc_ids.len() as u64) as f64;
                    for doc_id in doc_ids {
                        let tf = frequencies
                            .and_then(|f| f.get(&doc_id))
                            .and_then(|f| f.get(&word))
                            .copied()
                            .unwrap_or(0.0);
                        *scores.entry(doc_id).or_insert(0.0) += tf_idf(tf, df, total_docs);
                    }
                }
            }
        }

        let count = scores.len();
        let hits = top_k(scores, params.offset, params.limit)
            .into_iter()
            .filter_map(|(id, score)| {
                self.state.docs.get(&id).map(|document| SearchHit {
                    id,
                    score,
                    document: document.clone(),
                })
            })
            .collect();

        let elapsed = start.elapsed();
        debug!(term = %params.term, count, ?elapsed, "search");
        Ok(SearchResults {
            count,
            hits,
            elapsed,
        })
    }

    /// Export the full index state
    pub fn save(&self) -> Snapshot {
        self.state.clone()
    }

    /// Replace the index state with `snapshot`
    pub fn load(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.schema != self.settings.schema {
            return Err(AnekdexError::SchemaMismatch(format!(
                "snapshot schema {:?} does not match index schema {:?}",
                snapshot.schema, self.settings.schema
            )));
        }
        snapshot.validate().map_err(AnekdexError::CorruptSnapshot)?;

        self.next_doc_id = next_id(snapshot.docs.keys()).max(1);
        self.next_node_id = next_id(snapshot.nodes.keys());
        self.state = snapshot;
        Ok(())
    }
}

/// One past the largest numeric id in `ids`
fn next_id<'a>(ids: impl Iterator<Item = &'a String>) -> u64 {
    ids.filter_map(|id| id.parse::<u64>().ok())
        .max()
        .map_or(0, |max| max + 1)
}
