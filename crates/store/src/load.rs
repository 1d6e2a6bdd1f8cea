use std::collections::BTreeSet;

use rusqlite::Connection;

use bookmatch_engine::config::LedgerPair;
use bookmatch_engine::model::{LedgerKind, LedgerRecord};
use bookmatch_engine::normalize::{normalize, RawRow};
use bookmatch_engine::pipeline::RunInput;

use crate::error::StoreError;
use crate::schema::{dependents_of, table_for};

/// Load and normalize both ledgers of the pair. Malformed rows are
/// skipped and counted, never fatal; referenced-id sets come from the
/// dependent FK columns.
pub fn load_input(conn: &Connection, pair: LedgerPair) -> Result<RunInput, StoreError> {
    let (source, target) = pair.roles();
    let mut kinds = vec![source];
    if target != source {
        kinds.push(target);
    }

    let mut input = RunInput::default();
    for kind in kinds {
        let (records, skipped) = load_ledger(conn, kind)?;
        input.records.insert(kind, records);
        input.malformed_skipped.insert(kind, skipped);
        input.referenced.insert(kind, referenced_ids(conn, kind)?);
    }
    Ok(input)
}

fn load_ledger(
    conn: &Connection,
    kind: LedgerKind,
) -> Result<(Vec<LedgerRecord>, usize), StoreError> {
    let spec = table_for(kind);
    let query_err = |detail: String| StoreError::Query {
        table: spec.table.to_string(),
        detail,
    };

    let sql = format!(
        "SELECT id, {date}, {amount}, {debit}, {credit}, {text}, account_id, {link}, {nk}, {manual} \
         FROM {table} ORDER BY id",
        date = spec.date,
        amount = spec.amount.unwrap_or("NULL"),
        debit = spec.debit.unwrap_or("NULL"),
        credit = spec.credit.unwrap_or("NULL"),
        text = spec.text,
        link = spec.link.unwrap_or("NULL"),
        nk = spec.natural_key.unwrap_or("NULL"),
        manual = spec.manual_entry.unwrap_or("0"),
        table = spec.table,
    );

    let mut stmt = conn.prepare(&sql).map_err(|e| query_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawRow {
                id: row.get(0)?,
                date: row.get(1)?,
                amount: row.get(2)?,
                debit: row.get(3)?,
                credit: row.get(4)?,
                text: row.get(5)?,
                account_id: row.get(6)?,
                linked_id: row.get(7)?,
                natural_key: row.get(8)?,
                manual_entry: row.get::<_, i64>(9)? != 0,
            })
        })
        .map_err(|e| query_err(e.to_string()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for raw in rows {
        let raw = raw.map_err(|e| query_err(e.to_string()))?;
        match normalize(&raw, kind) {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }
    Ok((records, skipped))
}

/// Ids of this ledger that some dependent FK column points at.
fn referenced_ids(conn: &Connection, kind: LedgerKind) -> Result<BTreeSet<i64>, StoreError> {
    let mut ids = BTreeSet::new();
    for (table, column) in dependents_of(kind) {
        let sql = format!("SELECT DISTINCT {column} FROM {table} WHERE {column} IS NOT NULL");
        let mut stmt = conn.prepare(&sql).map_err(|e| StoreError::Query {
            table: table.to_string(),
            detail: e.to_string(),
        })?;
        let rows = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .map_err(|e| StoreError::Query {
                table: table.to_string(),
                detail: e.to_string(),
            })?;
        for id in rows {
            ids.insert(id.map_err(|e| StoreError::Query {
                table: table.to_string(),
                detail: e.to_string(),
            })?);
        }
    }
    Ok(ids)
}
