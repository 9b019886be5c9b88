//! Scoring functions for search operations

use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use crate::models::DocumentId;

/// Inverse document frequency with the BM25 smoothing
///
/// # Arguments
/// * `df` - Document frequency (how many documents contain the term)
/// * `total_docs` - Total number of documents in the index
pub fn idf(df: f64, total_docs: f64) -> f64 {
    ((total_docs - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// TF-IDF score of one term in one document
///
/// `tf` is the normalized term frequency stored in the frequency table.
pub fn tf_idf(tf: f64, df: f64, total_docs: f64) -> f64 {
    tf * idf(df, total_docs)
}

/// Document id order: numeric ids by value, ahead of any non-numeric id
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ScoreEntry {
    score: OrderedFloat<f64>,
    doc_id: DocumentId,
}

impl Ord for ScoreEntry {
    // Higher score wins; ties go to the smaller id
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| compare_ids(&other.doc_id, &self.doc_id))
    }
}

impl PartialOrd for ScoreEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the `offset..offset + limit` window of the best-scored documents
pub fn top_k(
    scores: HashMap<DocumentId, f64>,
    offset: usize,
    limit: usize,
) -> Vec<(DocumentId, f64)> {
    let k = offset.saturating_add(limit);
    if k == 0 || scores.is_empty() {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<ScoreEntry>> =
        BinaryHeap::with_capacity(k.min(scores.len()) + 1);
    for (doc_id, score) in scores {
        let entry = ScoreEntry {
            score: OrderedFloat(score),
            doc_id,
        };
        if heap.len() < k {
            heap.push(Reverse(entry));
        } else if let Some(min) = heap.peek() {
            if entry > min.0 {
                heap.pop();
                heap.push(Reverse(entry));
            }
        }
    }

    let mut ranked: Vec<ScoreEntry> = heap.into_iter().map(|Reverse(e)| e).collect();
    ranked.sort_by(|a, b| b.cmp(a));
    ranked
        .into_iter()
        .skip(offset)
        .map(|e| (e.doc_id, e.score.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idf_prefers_rare_terms() {
        let rare = idf(1.0, 1000.0);
        let common = idf(500.0, 1000.0);
        assert!(rare > common);
        assert!(common > 0.0);
    }

    #[test]
    fn test_tf_idf_scales_with_tf() {
        let low = tf_idf(0.1, 10.0, 100.0);
        let high = tf_idf(0.5, 10.0, 100.0);
        assert!(high > low);
    }

    #[test]
    fn test_idf_single_document_is_positive() {
        assert!(idf(1.0, 1.0) > 0.0);
    }

    #[test]
    fn test_top_k_orders_and_pages() {
        let mut scores = HashMap::new();
        scores.insert("a".to_string(), 0.5);
        scores.insert("b".to_string(), 2.0);
        scores.insert("c".to_string(), 1.0);
        scores.insert("d".to_string(), 1.0);

        let all = top_k(scores.clone(), 0, 10);
        let ids: Vec<&str> = all.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d", "a"]);

        let page = top_k(scores, 1, 2);
        let ids: Vec<&str> = page.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn test_top_k_ties_use_numeric_id_order() {
        let scores: HashMap<DocumentId, f64> = ["10", "9", "2"]
            .into_iter()
            .map(|id| (id.to_string(), 1.0))
            .collect();

        let ranked = top_k(scores.clone(), 0, 10);
        let ids: Vec<&str> = ranked.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["2", "9", "10"]);

        let first = top_k(scores, 0, 1);
        assert_eq!(first[0].0, "2");
    }

    #[test]
    fn test_compare_ids() {
        assert_eq!(compare_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_ids("10", "a"), Ordering::Less);
        assert_eq!(compare_ids("b", "a"), Ordering::Greater);
        assert_eq!(compare_ids("7", "7"), Ordering::Equal);
    }

    #[test]
    fn test_top_k_empty() {
        assert!(top_k(HashMap::new(), 0, 10).is_empty());
        let mut scores = HashMap::new();
        scores.insert("a".to_string(), 1.0);
        assert!(top_k(scores, 0, 0).is_empty());
    }
}
