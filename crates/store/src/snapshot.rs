use chrono::Utc;
use rusqlite::Connection;

use crate::error::StoreError;

/// One snapshot table, created before any mutation.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub source_table: String,
    pub snapshot_table: String,
    pub rows: i64,
}

/// Copy every listed table into `snapshot_<table>_<ts>` and verify the
/// row counts match. Any failure aborts the run before a single row is
/// touched.
pub fn take(conn: &Connection, tables: &[&str]) -> Result<Vec<SnapshotInfo>, StoreError> {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let mut infos = Vec::with_capacity(tables.len());

    for table in tables {
        let failure = |detail: String| StoreError::SnapshotFailure {
            table: table.to_string(),
            detail,
        };

        let snapshot_table = free_table_name(conn, &format!("snapshot_{table}_{stamp}"))
            .map_err(failure)?;
        conn.execute(
            &format!("CREATE TABLE {snapshot_table} AS SELECT * FROM {table}"),
            [],
        )
        .map_err(|e| failure(e.to_string()))?;

        let source_rows = count_rows(conn, table).map_err(failure)?;
        let snapshot_rows = count_rows(conn, &snapshot_table).map_err(failure)?;
        if source_rows != snapshot_rows {
            return Err(failure(format!(
                "row count mismatch: {source_rows} in source, {snapshot_rows} in snapshot"
            )));
        }

        infos.push(SnapshotInfo {
            source_table: table.to_string(),
            snapshot_table,
            rows: snapshot_rows,
        });
    }
    Ok(infos)
}

/// First unused table name: the base, then `<base>_2`, `<base>_3`, …
/// Repeat runs within one timestamp tick land on fresh tables.
fn free_table_name(conn: &Connection, base: &str) -> Result<String, String> {
    let exists = |name: &str| -> Result<bool, String> {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n > 0)
        .map_err(|e| e.to_string())
    };

    if !exists(base)? {
        return Ok(base.to_string());
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{base}_{n}");
        if !exists(&candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn count_rows(conn: &Connection, table: &str) -> Result<i64, String> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .map_err(|e| e.to_string())
}
