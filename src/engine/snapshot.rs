use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Document, DocumentId, Schema};

/// Snapshot version for compatibility checking
pub const SNAPSHOT_VERSION: u32 = 1;

/// property -> document id -> token -> term frequency
pub type FrequencyTable = BTreeMap<String, BTreeMap<DocumentId, BTreeMap<String, f64>>>;

/// property -> token -> number of documents containing the token
pub type OccurrenceTable = BTreeMap<String, BTreeMap<String, u64>>;

/// Prefix tree node
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Character on the edge leading to this node (empty for roots)
    pub key: String,
    /// Full word spelled from the root to this node
    pub word: String,
    /// Edge character -> child node id
    pub children: BTreeMap<String, String>,
    /// Documents containing `word` as a whole token
    pub docs: Vec<DocumentId>,
    /// Whether `word` is a complete indexed token
    pub end: bool,
}

impl Node {
    pub fn root(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Complete snapshot of the index state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema: Schema,
    pub docs: BTreeMap<DocumentId, Document>,
    /// property -> root node id
    pub index: BTreeMap<String, String>,
    pub nodes: BTreeMap<String, Node>,
    pub frequencies: FrequencyTable,
    pub token_occurrencies: OccurrenceTable,
}

impl Snapshot {
    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Check that every root and child reference resolves to a node
    pub fn validate(&self) -> Result<(), String> {
        for (property, root) in &self.index {
            if !self.schema.contains(property) {
                return Err(format!("index root for unknown property '{}'", property));
            }
            if !self.nodes.contains_key(root) {
                return Err(format!("missing root node '{}' for '{}'", root, property));
            }
        }
        for node in self.nodes.values() {
            if let Some(child) = node.children.values().find(|c| !self.nodes.contains_key(*c)) {
                return Err(format!("node '{}' points at missing child '{}'", node.id, child));
            }
        }
        Ok(())
    }
}

/// Versioned envelope used by the native JSON format
#[derive(Serialize, Deserialize)]
pub struct VersionedSnapshot {
    pub version: u32,
    pub snapshot: Snapshot,
}

impl VersionedSnapshot {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            snapshot,
        }
    }

    /// Check if this snapshot version is compatible
    pub fn is_compatible(&self) -> bool {
        self.version <= SNAPSHOT_VERSION
    }
}
