use std::collections::{BTreeMap, BTreeSet};

use crate::model::{DuplicateGroup, LedgerRecord};
use crate::similarity::normalize_text;

/// How records are bucketed into duplicate groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    /// Default: `(date, amount cents, normalized counterparty)`.
    DateAmountText,
    /// Group by the source system's natural key, where present.
    /// Records without a key never group under this signature.
    NaturalKey,
}

pub fn signature(record: &LedgerRecord, kind: SignatureKind) -> Option<String> {
    match kind {
        SignatureKind::DateAmountText => Some(format!(
            "{}|{}|{}",
            record.date,
            record.amount_cents,
            normalize_text(&record.counterparty)
        )),
        SignatureKind::NaturalKey => record.natural_key.clone(),
    }
}

/// Group one ledger's records by signature and pick each group's keeper.
///
/// Keeper selection, first rule satisfied wins:
/// 1. manually entered and not referenced by any dependent row;
/// 2. referenced by a dependent row (deleting it would orphan the link);
/// 3. smallest id (earliest import).
///
/// When two or more members tie on rule 1 or rule 2 the group is
/// flagged `needs_review` and must not be auto-applied; the keeper is
/// still designated (smallest id among the tied) so the report can show
/// what the rules would have chosen.
///
/// `referenced` holds the ids that dependent FK columns point at.
pub fn find_groups(
    records: &[LedgerRecord],
    kind: SignatureKind,
    referenced: &BTreeSet<i64>,
) -> Vec<DuplicateGroup> {
    let mut by_signature: BTreeMap<String, Vec<&LedgerRecord>> = BTreeMap::new();
    for record in records {
        if let Some(sig) = signature(record, kind) {
            by_signature.entry(sig).or_default().push(record);
        }
    }

    let mut groups = Vec::new();
    for (sig, mut members) in by_signature {
        if members.len() < 2 {
            continue;
        }
        members.sort_by_key(|r| r.id);

        let ledger = members[0].ledger;
        let (keeper_id, needs_review) = select_keeper(&members, referenced);
        let superseded = members
            .iter()
            .map(|r| r.id)
            .filter(|id| *id != keeper_id)
            .collect();

        groups.push(DuplicateGroup {
            ledger,
            signature: sig,
            keeper_id,
            superseded,
            needs_review,
        });
    }
    groups
}

fn select_keeper(members: &[&LedgerRecord], referenced: &BTreeSet<i64>) -> (i64, bool) {
    let manual_unreferenced: Vec<i64> = members
        .iter()
        .filter(|r| r.manual_entry && !referenced.contains(&r.id))
        .map(|r| r.id)
        .collect();
    if let Some(first) = manual_unreferenced.first() {
        return (*first, manual_unreferenced.len() > 1);
    }

    let linked: Vec<i64> = members
        .iter()
        .filter(|r| referenced.contains(&r.id))
        .map(|r| r.id)
        .collect();
    if let Some(first) = linked.first() {
        return (*first, linked.len() > 1);
    }

    // members are sorted by id, so the first is the earliest import.
    (members[0].id, false)
}
