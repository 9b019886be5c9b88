//! Character trie stored as a flat node map.
//!
//! Nodes live in the snapshot's `nodes` table keyed by id, so the tree can be
//! exported and re-imported without pointer fix-ups.

use std::collections::BTreeMap;

use crate::engine::snapshot::Node;
use crate::error::{AnekdexError, Result};
use crate::models::DocumentId;

fn missing(id: &str) -> AnekdexError {
    AnekdexError::CorruptSnapshot(format!("prefix tree node '{}' not found", id))
}

/// Allocate a fresh root node and return its id
pub fn create_root(nodes: &mut BTreeMap<String, Node>, next_node_id: &mut u64) -> String {
    let id = next_node_id.to_string();
    *next_node_id += 1;
    nodes.insert(id.clone(), Node::root(id.clone()));
    id
}

/// Insert `word` under `root`, marking `doc_id` on the terminal node
pub fn insert(
    nodes: &mut BTreeMap<String, Node>,
    next_node_id: &mut u64,
    root: &str,
    word: &str,
    doc_id: &str,
) -> Result<()> {
    let mut current = root.to_string();

    for ch in word.chars() {
        let key = ch.to_string();
        let parent = nodes.get(&current).ok_or_else(|| missing(&current))?;

        current = match parent.children.get(&key) {
            Some(child) => child.clone(),
            None => {
                let id = next_node_id.to_string();
                *next_node_id += 1;
                let node = Node {
                    id: id.clone(),
                    word: format!("{}{}", parent.word, key),
                    key: key.clone(),
                    ..Default::default()
                };
                nodes.insert(id.clone(), node);
                if let Some(parent) = nodes.get_mut(&current) {
                    parent.children.insert(key, id.clone());
                }
                id
            }
        };
    }

    let node = nodes.get_mut(&current).ok_or_else(|| missing(&current))?;
    node.end = true;
    if !node.docs.iter().any(|d| d == doc_id) {
        node.docs.push(doc_id.to_string());
    }
    Ok(())
}

/// Find indexed words matching `term`.
///
/// With `exact` only the word equal to `term` matches; otherwise every
/// indexed word starting with `term` does. Returns word -> document ids.
pub fn find(
    nodes: &BTreeMap<String, Node>,
    root: &str,
    term: &str,
    exact: bool,
) -> BTreeMap<String, Vec<DocumentId>> {
    let mut matches = BTreeMap::new();

    let mut current = match nodes.get(root) {
        Some(node) => node,
        None => return matches,
    };
    for ch in term.chars() {
        let next = current
            .children
            .get(ch.to_string().as_str())
            .and_then(|id| nodes.get(id));
        match next {
            Some(node) => current = node,
            None => return matches,
        }
    }

    if exact {
        if current.end {
            matches.insert(current.word.clone(), current.docs.clone());
        }
        return matches;
    }

    let mut stack = vec![current];
    while let Some(node) = stack.pop() {
        if node.end && !node.docs.is_empty() {
            matches.insert(node.word.clone(), node.docs.clone());
        }
        stack.extend(node.children.values().filter_map(|id| nodes.get(id)));
    }
    matches
}
