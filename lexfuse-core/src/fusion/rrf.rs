//! Reciprocal rank fusion.
//!
//! Every id collects `1 / (rank + k)` from each list it appears in, with
//! `rank` being its 1-based position there. Documents found by both lexical
//! and vector search therefore outrank documents found by only one, without
//! the two score scales ever being compared.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::FusionConfig;
use crate::types::{FusedHit, Hit};

/// Score contributed by one list for a hit at 1-based `rank`.
pub fn rrf_contribution(rank: usize, rank_constant: u32) -> f64 {
    1.0 / (rank as f64 + f64::from(rank_constant))
}

/// Fuse the lexical and vector hit lists of one query.
///
/// The source of each fused hit comes from the lexical list when the id is
/// present there. Ties keep first-seen order (lexical scan, then vector).
/// At most `config.top_k` hits are returned.
pub fn fuse(lexical: &[Hit], vector: &[Hit], config: &FusionConfig) -> Vec<FusedHit> {
    let fused = fuse_lists(&[lexical, vector], config.rank_constant, config.top_k);
    debug!(
        lexical = lexical.len(),
        vector = vector.len(),
        fused = fused.len(),
        "fused hit lists"
    );
    fused
}

/// Fuse any number of ranked lists, earlier lists taking source precedence.
///
/// An id repeated inside one list counts only at its first position.
pub fn fuse_lists(lists: &[&[Hit]], rank_constant: u32, top_k: usize) -> Vec<FusedHit> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut fused: Vec<FusedHit> = Vec::new();

    for list in lists {
        let mut seen_here: HashSet<&str> = HashSet::with_capacity(list.len());
        for (index, hit) in list.iter().enumerate() {
            if !seen_here.insert(hit.id.as_str()) {
                continue;
            }
            let contribution = rrf_contribution(index + 1, rank_constant);
            match slots.get(hit.id.as_str()) {
                Some(&slot) => fused[slot].rrf_score += contribution,
                None => {
                    slots.insert(hit.id.as_str(), fused.len());
                    fused.push(FusedHit {
                        id: hit.id.clone(),
                        rrf_score: contribution,
                        source: hit.source.clone(),
                    });
                }
            }
        }
    }

    // `sort_by` is stable, so equal scores keep insertion order.
    fused.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(Ordering::Equal)
    });
    fused.truncate(top_k);
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentRecord;

    fn hit(id: &str, origin: &str) -> Hit {
        Hit {
            id: id.to_owned(),
            score: 1.0,
            source: [("origin", origin)].into_iter().collect::<DocumentRecord>(),
        }
    }

    fn config(top_k: usize) -> FusionConfig {
        FusionConfig {
            top_k,
            ..Default::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn reference_scores() {
        let lexical = vec![hit("A", "lex"), hit("B", "lex"), hit("C", "lex")];
        let vector = vec![hit("B", "vec"), hit("C", "vec"), hit("A", "vec")];

        let fused = fuse(&lexical, &vector, &config(10));
        let ids: Vec<&str> = fused.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);

        assert!(close(fused[0].rrf_score, 1.0 / 22.0 + 1.0 / 21.0));
        assert!(close(fused[1].rrf_score, 1.0 / 21.0 + 1.0 / 23.0));
        assert!(close(fused[2].rrf_score, 1.0 / 23.0 + 1.0 / 22.0));
    }

    #[test]
    fn lexical_source_preferred() {
        let lexical = vec![hit("A", "lex")];
        let vector = vec![hit("A", "vec"), hit("B", "vec")];
        let fused = fuse(&lexical, &vector, &config(10));
        assert_eq!(fused[0].source.get("origin"), Some("lex"));
        assert_eq!(fused[1].source.get("origin"), Some("vec"));
    }

    #[test]
    fn truncates_to_top_k() {
        let lexical: Vec<Hit> = (0..8).map(|i| hit(&format!("l{i}"), "lex")).collect();
        let vector: Vec<Hit> = (0..8).map(|i| hit(&format!("v{i}"), "vec")).collect();
        assert_eq!(fuse(&lexical, &vector, &config(5)).len(), 5);
        assert_eq!(fuse(&lexical, &vector, &config(100)).len(), 16);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let lexical = vec![hit("L1", "lex"), hit("L2", "lex")];
        let vector = vec![hit("V1", "vec"), hit("V2", "vec")];
        let fused = fuse(&lexical, &vector, &config(10));
        let ids: Vec<&str> = fused.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["L1", "V1", "L2", "V2"]);
    }

    #[test]
    fn only_input_ids_appear() {
        let lexical = vec![hit("A", "lex")];
        let vector = vec![hit("B", "vec")];
        let fused = fuse(&lexical, &vector, &config(10));
        assert!(fused.iter().all(|h| h.id == "A" || h.id == "B"));
        assert!(fuse(&[], &[], &config(10)).is_empty());
    }

    #[test]
    fn single_list_keeps_order() {
        let vector = vec![hit("x", "vec"), hit("y", "vec"), hit("z", "vec")];
        let fused = fuse(&[], &vector, &config(10));
        let ids: Vec<&str> = fused.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert!(close(fused[0].rrf_score, 1.0 / 21.0));
    }

    #[test]
    fn duplicate_within_list_counts_once() {
        let lexical = vec![hit("A", "first"), hit("A", "second")];
        let fused = fuse(&lexical, &[], &config(10));
        assert_eq!(fused.len(), 1);
        assert!(close(fused[0].rrf_score, 1.0 / 21.0));
        assert_eq!(fused[0].source.get("origin"), Some("first"));
    }

    #[test]
    fn rank_constant_changes_scores() {
        let lexical = vec![hit("A", "lex")];
        let fused = fuse_lists(&[&lexical], 60, 10);
        assert!(close(fused[0].rrf_score, 1.0 / 61.0));
    }
}
