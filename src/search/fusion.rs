use std::collections::HashMap;

use uuid::Uuid;

/// Reciprocal Rank Fusion constant. Larger values flatten the difference
/// between adjacent ranks; 60 is the standard IR choice.
pub const RRF_K: f64 = 60.0;

/// Source-list weights, in scan order.
const VECTOR_WEIGHT: f64 = 1.0;
const KEYWORD_WEIGHT: f64 = 0.8;
const SPATIAL_WEIGHT: f64 = 0.6;

struct FusedCandidate {
    id: Uuid,
    score: f64,
    /// Assigned when the id is first seen while scanning the lists in
    /// vector → keyword → spatial order; breaks score ties deterministically.
    seq: usize,
}

/// Merge up to three ranked property-ID lists using Reciprocal Rank Fusion.
///
/// For an id at 1-based rank `r` in a list of weight `w`, accumulate
/// `w / (RRF_K + r)`. Any list may be empty; ids absent from a list simply
/// contribute nothing from it. Returns `(id, score)` sorted descending by
/// score, ties in first-encounter order.
pub fn reciprocal_rank_fusion(
    vector_hits: &[Uuid],
    keyword_hits: &[Uuid],
    spatial_hits: &[Uuid],
) -> Vec<(Uuid, f64)> {
    let mut scores: HashMap<Uuid, FusedCandidate> = HashMap::new();

    for (list, weight) in [
        (vector_hits, VECTOR_WEIGHT),
        (keyword_hits, KEYWORD_WEIGHT),
        (spatial_hits, SPATIAL_WEIGHT),
    ] {
        for (rank, id) in list.iter().enumerate() {
            let seq = scores.len();
            let entry = scores.entry(*id).or_insert(FusedCandidate {
                id: *id,
                score: 0.0,
                seq,
            });
            entry.score += weight / (RRF_K + (rank + 1) as f64);
        }
    }

    let mut fused: Vec<FusedCandidate> = scores.into_values().collect();
    sort_fused(&mut fused);
    fused.into_iter().map(|c| (c.id, c.score)).collect()
}

fn sort_fused(candidates: &mut [FusedCandidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.seq.cmp(&b.seq))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_empty_inputs_produce_empty_output() {
        let results = reciprocal_rank_fusion(&[], &[], &[]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_single_list_preserves_rank_order() {
        let vector = ids(3);
        let results = reciprocal_rank_fusion(&vector, &[], &[]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, vector[0]);
        assert_eq!(results[1].0, vector[1]);
        assert_eq!(results[2].0, vector[2]);
        // Rank 1 scores exactly weight / (K + 1)
        assert!((results[0].1 - 1.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_scores_accumulate_across_lists() {
        let shared = Uuid::new_v4();
        let results = reciprocal_rank_fusion(&[shared], &[shared], &[shared]);
        assert_eq!(results.len(), 1);
        let expected = 1.0 / 61.0 + 0.8 / 61.0 + 0.6 / 61.0;
        assert!((results[0].1 - expected).abs() < 1e-12);
    }

    #[test]
    fn test_determinism_across_runs() {
        let vector = ids(10);
        let keyword = ids(10);
        let spatial = ids(10);
        let first = reciprocal_rank_fusion(&vector, &keyword, &spatial);
        for _ in 0..10 {
            let again = reciprocal_rank_fusion(&vector, &keyword, &spatial);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_vector_rank_one_dominates_disjoint_lists() {
        // For fully disjoint lists, the top vector hit carries 1.0/(K+1) —
        // more than any item that exists only in a lower-weighted list.
        let vector = ids(5);
        let keyword = ids(5);
        let spatial = ids(5);
        let results = reciprocal_rank_fusion(&vector, &keyword, &spatial);
        assert_eq!(results[0].0, vector[0]);
    }

    #[test]
    fn test_heavily_cross_ranked_item_beats_single_list_top() {
        let vector = ids(3);
        let keyword = vec![vector[2], vector[0]];
        let spatial = vec![vector[2]];
        // vector[2] appears in all three lists and should outrank vector[0],
        // which appears in vector (rank 1) and keyword (rank 2) only.
        let results = reciprocal_rank_fusion(&vector, &keyword, &spatial);
        assert_eq!(results[0].0, vector[2]);
    }

    #[test]
    fn test_tie_break_keeps_first_encounter_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut candidates = vec![
            FusedCandidate {
                id: b,
                score: 0.5,
                seq: 7,
            },
            FusedCandidate {
                id: a,
                score: 0.5,
                seq: 2,
            },
        ];
        sort_fused(&mut candidates);
        // Equal scores: the id first encountered during the scan wins.
        assert_eq!(candidates[0].id, a);
        assert_eq!(candidates[1].id, b);
    }

    #[test]
    fn test_seq_assigned_in_scan_priority_order() {
        let v = Uuid::new_v4();
        let k = Uuid::new_v4();
        let s = Uuid::new_v4();
        let results = reciprocal_rank_fusion(&[v], &[k], &[s]);
        // Weights alone order these; this pins the full expected ordering.
        assert_eq!(
            results.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![v, k, s]
        );
    }
}
