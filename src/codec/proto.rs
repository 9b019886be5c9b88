//! Protocol Buffers encoding of the snapshot (`proto/snapshot.proto`).
//!
//! Proto3 map values cannot themselves be maps, so the frequency table
//! (property -> doc id -> token -> tf) is reshaped into
//! `frequenciesMap: property -> repeated {id, data}` before encoding and
//! restored after decoding. Token occurrences get a one-field wrapper for the
//! same reason. The schema is not part of the message; the decoder is given
//! the index schema.

use prost::Message;
use std::collections::BTreeMap;

use crate::engine::snapshot::{FrequencyTable, Node, OccurrenceTable, Snapshot};
use crate::error::Result;
use crate::models::Schema;

#[derive(Clone, PartialEq, Message)]
pub struct Data {
    #[prost(btree_map = "string, message", tag = "1")]
    pub docs: BTreeMap<String, Doc>,
    #[prost(btree_map = "string, string", tag = "2")]
    pub index: BTreeMap<String, String>,
    #[prost(btree_map = "string, message", tag = "3")]
    pub nodes: BTreeMap<String, TreeNode>,
    #[prost(btree_map = "string, message", tag = "4")]
    pub token_occurrencies: BTreeMap<String, TokenCounts>,
    #[prost(btree_map = "string, message", tag = "5")]
    pub frequencies_map: BTreeMap<String, Frequencies>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Doc {
    #[prost(btree_map = "string, string", tag = "1")]
    pub fields: BTreeMap<String, String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TreeNode {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub key: String,
    #[prost(string, tag = "3")]
    pub word: String,
    #[prost(btree_map = "string, string", tag = "4")]
    pub children: BTreeMap<String, String>,
    #[prost(string, repeated, tag = "5")]
    pub docs: Vec<String>,
    #[prost(bool, tag = "6")]
    pub end: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct TokenCounts {
    #[prost(btree_map = "string, uint64", tag = "1")]
    pub counts: BTreeMap<String, u64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Frequencies {
    #[prost(message, repeated, tag = "1")]
    pub frequencies: Vec<Frequency>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Frequency {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(btree_map = "string, double", tag = "2")]
    pub data: BTreeMap<String, f64>,
}

/// property -> doc -> token map into property -> repeated {id, data}
pub fn flatten_frequencies(table: &FrequencyTable) -> BTreeMap<String, Frequencies> {
    table
        .iter()
        .map(|(property, per_doc)| {
            let frequencies = per_doc
                .iter()
                .map(|(id, data)| Frequency {
                    id: id.clone(),
                    data: data.clone(),
                })
                .collect();
            (property.clone(), Frequencies { frequencies })
        })
        .collect()
}

/// Inverse of [`flatten_frequencies`]; a repeated id keeps its last entry
pub fn unflatten_frequencies(map: BTreeMap<String, Frequencies>) -> FrequencyTable {
    map.into_iter()
        .map(|(property, list)| {
            let per_doc = list
                .frequencies
                .into_iter()
                .map(|f| (f.id, f.data))
                .collect();
            (property, per_doc)
        })
        .collect()
}

fn to_message(snapshot: &Snapshot) -> Data {
    let docs = snapshot
        .docs
        .iter()
        .map(|(id, fields)| (id.clone(), Doc { fields: fields.clone() }))
        .collect();
    let nodes = snapshot
        .nodes
        .iter()
        .map(|(id, node)| {
            let msg = TreeNode {
                id: node.id.clone(),
                key: node.key.clone(),
                word: node.word.clone(),
                children: node.children.clone(),
                docs: node.docs.clone(),
                end: node.end,
            };
            (id.clone(), msg)
        })
        .collect();
    let token_occurrencies = snapshot
        .token_occurrencies
        .iter()
        .map(|(property, counts)| {
            (
                property.clone(),
                TokenCounts {
                    counts: counts.clone(),
                },
            )
        })
        .collect();

    Data {
        docs,
        index: snapshot.index.clone(),
        nodes,
        token_occurrencies,
        frequencies_map: flatten_frequencies(&snapshot.frequencies),
    }
}

fn from_message(data: Data, schema: &Schema) -> Snapshot {
    let docs = data
        .docs
        .into_iter()
        .map(|(id, doc)| (id, doc.fields))
        .collect();
    let nodes = data
        .nodes
        .into_iter()
        .map(|(id, n)| {
            let node = Node {
                id: n.id,
                key: n.key,
                word: n.word,
                children: n.children,
                docs: n.docs,
                end: n.end,
            };
            (id, node)
        })
        .collect();
    let token_occurrencies: OccurrenceTable = data
        .token_occurrencies
        .into_iter()
        .map(|(property, counts)| (property, counts.counts))
        .collect();

    Snapshot {
        schema: schema.clone(),
        docs,
        index: data.index,
        nodes,
        frequencies: unflatten_frequencies(data.frequencies_map),
        token_occurrencies,
    }
}

pub fn encode(snapshot: &Snapshot) -> Vec<u8> {
    to_message(snapshot).encode_to_vec()
}

pub fn decode(bytes: &[u8], schema: &Schema) -> Result<Snapshot> {
    let data = Data::decode(bytes)?;
    Ok(from_message(data, schema))
}
