use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::assign;
use crate::config::{LedgerPair, ReconcileConfig};
use crate::dedup;
use crate::error::EngineError;
use crate::index::WindowIndex;
use crate::model::{
    DuplicateGroup, LedgerKind, LedgerRecord, MatchCandidate, MatchResult, TransferPair,
};
use crate::score::{score_pair, ScoreParams, ScoreStrategy};
use crate::transfer::find_transfers;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Pre-loaded, normalized records for one run. Recomputed from current
/// storage state every run — resolutions are never cached across runs.
#[derive(Debug, Default)]
pub struct RunInput {
    pub records: BTreeMap<LedgerKind, Vec<LedgerRecord>>,
    /// Per ledger, the ids that dependent FK columns point at.
    pub referenced: BTreeMap<LedgerKind, BTreeSet<i64>>,
    /// Per ledger, rows skipped during normalization.
    pub malformed_skipped: BTreeMap<LedgerKind, usize>,
}

impl RunInput {
    pub fn ledger(&self, kind: LedgerKind) -> &[LedgerRecord] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn referenced_in(&self, kind: LedgerKind) -> BTreeSet<i64> {
        self.referenced.get(&kind).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ledger_pair: String,
    pub matched: usize,
    pub already_linked: usize,
    pub unmatched_sources: usize,
    pub unmatched_targets: usize,
    pub duplicate_groups: usize,
    pub superseded: usize,
    pub needs_review: usize,
    pub transfers: usize,
    pub malformed_skipped: usize,
    pub matched_total_cents: i64,
    pub unmatched_source_total_cents: i64,
    pub transfer_total_cents: i64,
}

/// Everything a run resolved, plus the summary. Pure data; the store
/// layer decides whether any of it is applied.
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub matches: Vec<MatchResult>,
    pub transfers: Vec<TransferPair>,
    pub duplicates: Vec<DuplicateGroup>,
    pub unmatched_sources: Vec<i64>,
    pub unmatched_targets: Vec<i64>,
    pub summary: RunSummary,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the engine: index, candidates, scores, assignment, duplicate
/// groups, transfer pairs, summary. No storage access.
pub fn run(config: &ReconcileConfig, input: &RunInput) -> Result<Resolution, EngineError> {
    config.validate()?;

    let (source_kind, target_kind) = config.ledger_pair.roles();
    let params = ScoreParams {
        weights: config.weights,
        amount_ceiling_cents: config.amount_tolerance_cents,
        date_window_days: config.date_window_days,
        min_confidence: config.min_confidence,
        max_transfer_cost: config.max_transfer_cost,
        vocab: &config.vocabulary,
    };

    let sources = input.ledger(source_kind);

    let duplicates = if config.dedup {
        dedup::find_groups(
            sources,
            config.dedup_signature,
            &input.referenced_in(source_kind),
        )
    } else {
        Vec::new()
    };

    // Records a non-review group will delete take no further part.
    let superseded_ids: BTreeSet<i64> = duplicates
        .iter()
        .filter(|g| !g.needs_review)
        .flat_map(|g| g.superseded.iter().copied())
        .collect();

    let mut matches = Vec::new();
    let mut transfers = Vec::new();
    let mut unmatched_sources = Vec::new();
    let mut unmatched_targets = Vec::new();
    let mut already_linked = 0usize;

    if config.ledger_pair == LedgerPair::TransferScan {
        let live: Vec<LedgerRecord> = sources
            .iter()
            .filter(|r| !superseded_ids.contains(&r.id))
            .cloned()
            .collect();
        transfers = find_transfers(
            &live,
            &params,
            config.amount_tolerance_cents,
            config.date_window_days,
            config.bucket_days,
        );

        let paired: BTreeSet<i64> = transfers
            .iter()
            .flat_map(|t| [t.out_id, t.in_id])
            .collect();
        for record in &live {
            if !paired.contains(&record.id) {
                unmatched_sources.push(record.id);
            }
        }
    } else {
        let targets = input.ledger(target_kind);
        let index = WindowIndex::build(targets, config.bucket_days);

        // Targets consumed by links written in previous runs.
        let consumed_targets: BTreeSet<i64> =
            sources.iter().filter_map(|r| r.linked_id).collect();

        let mut candidates: Vec<MatchCandidate> = Vec::new();
        for source in sources {
            if superseded_ids.contains(&source.id) {
                continue;
            }
            if source.linked_id.is_some() {
                already_linked += 1;
                continue;
            }
            for target in index.candidates(
                source,
                config.amount_tolerance_cents,
                config.date_window_days,
            ) {
                if consumed_targets.contains(&target.id) {
                    continue;
                }
                if let Some(candidate) =
                    score_pair(source, target, ScoreStrategy::WeightedMatch, &params)
                {
                    candidates.push(candidate);
                }
            }
        }

        matches = assign::resolve(&candidates);

        let matched_sources: BTreeSet<i64> = matches.iter().map(|m| m.source_id).collect();
        let matched_targets: BTreeSet<i64> = matches.iter().map(|m| m.target_id).collect();

        for source in sources {
            if superseded_ids.contains(&source.id) || source.linked_id.is_some() {
                continue;
            }
            if !matched_sources.contains(&source.id) {
                unmatched_sources.push(source.id);
            }
        }
        for target in targets {
            if !matched_targets.contains(&target.id) && !consumed_targets.contains(&target.id) {
                unmatched_targets.push(target.id);
            }
        }
    }

    let summary = summarize(
        config,
        input,
        source_kind,
        &matches,
        &transfers,
        &duplicates,
        &unmatched_sources,
        &unmatched_targets,
        already_linked,
    );

    Ok(Resolution {
        matches,
        transfers,
        duplicates,
        unmatched_sources,
        unmatched_targets,
        summary,
    })
}

#[allow(clippy::too_many_arguments)]
fn summarize(
    config: &ReconcileConfig,
    input: &RunInput,
    source_kind: LedgerKind,
    matches: &[MatchResult],
    transfers: &[TransferPair],
    duplicates: &[DuplicateGroup],
    unmatched_sources: &[i64],
    unmatched_targets: &[i64],
    already_linked: usize,
) -> RunSummary {
    let sources = input.ledger(source_kind);
    let magnitude_of = |id: i64| -> i64 {
        sources
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.magnitude_cents())
            .unwrap_or(0)
    };

    RunSummary {
        ledger_pair: config.ledger_pair.to_string(),
        matched: matches.len(),
        already_linked,
        unmatched_sources: unmatched_sources.len(),
        unmatched_targets: unmatched_targets.len(),
        duplicate_groups: duplicates.len(),
        // Only groups a write run will actually collapse; review-flagged
        // members stay put and must not inflate the count.
        superseded: duplicates
            .iter()
            .filter(|g| !g.needs_review)
            .map(|g| g.superseded.len())
            .sum(),
        needs_review: duplicates.iter().filter(|g| g.needs_review).count(),
        transfers: transfers.len(),
        malformed_skipped: input.malformed_skipped.values().sum(),
        matched_total_cents: matches.iter().map(|m| magnitude_of(m.source_id)).sum(),
        unmatched_source_total_cents: unmatched_sources.iter().map(|id| magnitude_of(*id)).sum(),
        transfer_total_cents: transfers.iter().map(|t| t.amount_cents).sum(),
    }
}
