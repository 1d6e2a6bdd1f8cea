use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::model::{MatchCandidate, MatchResult};

/// Resolve scored candidates into a one-to-one assignment.
///
/// Greedy approximation of optimal bipartite matching: sort best-first
/// (descending confidence / ascending cost) with a deterministic
/// tie-break — smallest absolute id difference, then source id, then
/// target id — and accept a candidate only while both its records are
/// still unconsumed. Ledger sizes are small enough that determinism
/// and auditability win over optimality here.
pub fn resolve(candidates: &[MatchCandidate]) -> Vec<MatchResult> {
    let mut order: Vec<&MatchCandidate> = candidates.iter().collect();
    order.sort_by(|a, b| compare(a, b));

    let mut used_sources: BTreeSet<i64> = BTreeSet::new();
    let mut used_targets: BTreeSet<i64> = BTreeSet::new();
    let mut accepted = Vec::new();

    for candidate in order {
        if used_sources.contains(&candidate.source_id) || used_targets.contains(&candidate.target_id)
        {
            continue;
        }
        used_sources.insert(candidate.source_id);
        used_targets.insert(candidate.target_id);
        accepted.push(MatchResult {
            source_id: candidate.source_id,
            target_id: candidate.target_id,
            score: candidate.score,
            reasons: candidate.reasons.clone(),
        });
    }

    accepted
}

fn compare(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    a.score
        .rank()
        .partial_cmp(&b.score.rank())
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            let da = (a.source_id - a.target_id).abs();
            let db = (b.source_id - b.target_id).abs();
            da.cmp(&db)
        })
        .then_with(|| a.source_id.cmp(&b.source_id))
        .then_with(|| a.target_id.cmp(&b.target_id))
}
