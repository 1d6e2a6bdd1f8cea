use rusqlite::{params, Connection};

use bookmatch_engine::config::LedgerPair;
use bookmatch_engine::pipeline::Resolution;

use crate::error::StoreError;
use crate::schema::{dependents_of, table_for};

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyStats {
    pub links_written: usize,
    pub superseded_deleted: usize,
    pub fks_repointed: usize,
}

/// Write the resolution inside one transaction: re-point dependent FKs
/// from superseded to keeper, delete the superseded rows, then set the
/// owned link column for every accepted match. Any error rolls the
/// whole thing back; no partial write survives.
///
/// Groups flagged for review are left untouched. Transfer pairs carry
/// no owned link column and are report-only.
pub fn apply(
    conn: &mut Connection,
    pair: LedgerPair,
    resolution: &Resolution,
) -> Result<ApplyStats, StoreError> {
    let commit_err = |detail: String| StoreError::CommitFailure { detail };

    let (source_kind, _) = pair.roles();
    let source = table_for(source_kind);

    let tx = conn
        .transaction()
        .map_err(|e| commit_err(e.to_string()))?;
    let mut stats = ApplyStats::default();

    for group in &resolution.duplicates {
        if group.needs_review {
            continue;
        }
        for &superseded in &group.superseded {
            for (table, column) in dependents_of(source_kind) {
                let repointed = tx
                    .execute(
                        &format!("UPDATE {table} SET {column} = ?1 WHERE {column} = ?2"),
                        params![group.keeper_id, superseded],
                    )
                    .map_err(|e| commit_err(e.to_string()))?;
                stats.fks_repointed += repointed;
            }
            stats.superseded_deleted += tx
                .execute(
                    &format!("DELETE FROM {} WHERE id = ?1", source.table),
                    params![superseded],
                )
                .map_err(|e| commit_err(e.to_string()))?;
        }
    }

    if let Some(link) = source.link {
        for m in &resolution.matches {
            stats.links_written += tx
                .execute(
                    &format!("UPDATE {} SET {link} = ?1 WHERE id = ?2", source.table),
                    params![m.target_id, m.source_id],
                )
                .map_err(|e| commit_err(e.to_string()))?;
        }
    }

    tx.commit().map_err(|e| commit_err(e.to_string()))?;
    Ok(stats)
}
