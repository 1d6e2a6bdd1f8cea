use std::path::Path;

use rusqlite::Connection;

use bookmatch_engine::config::ReconcileConfig;
use bookmatch_engine::pipeline::{self, Resolution};

use crate::apply::{apply, ApplyStats};
use crate::error::StoreError;
use crate::load::load_input;
use crate::schema::{mutable_tables, SCHEMA};
use crate::snapshot::{self, SnapshotInfo};

/// Run lifecycle. Dry-run never enters `SnapshotTaken` or `Applied`;
/// write mode snapshots before anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    SnapshotTaken,
    CandidatesGenerated,
    Resolved,
    DryRunReported,
    Applied,
    Done,
}

impl RunState {
    /// Legal forward transitions only; anything else is a logic bug.
    fn advance(self, next: RunState) -> RunState {
        let legal = matches!(
            (self, next),
            (Self::Idle, Self::SnapshotTaken)
                | (Self::Idle, Self::CandidatesGenerated)
                | (Self::SnapshotTaken, Self::CandidatesGenerated)
                | (Self::CandidatesGenerated, Self::Resolved)
                | (Self::Resolved, Self::DryRunReported)
                | (Self::Resolved, Self::Applied)
                | (Self::DryRunReported, Self::Done)
                | (Self::Applied, Self::Done)
        );
        debug_assert!(legal, "illegal transition {self:?} -> {next:?}");
        next
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub resolution: Resolution,
    pub snapshots: Vec<SnapshotInfo>,
    pub applied: Option<ApplyStats>,
    pub state: RunState,
}

pub fn open(path: &Path) -> Result<Connection, StoreError> {
    Connection::open(path).map_err(|e| StoreError::Open {
        path: path.display().to_string(),
        detail: e.to_string(),
    })
}

pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA).map_err(|e| StoreError::Query {
        table: "schema".into(),
        detail: e.to_string(),
    })
}

/// One end-to-end reconciliation run over the connection. Blocking,
/// single-threaded; the caller owns run serialization.
pub fn execute(
    conn: &mut Connection,
    config: &ReconcileConfig,
) -> Result<RunOutcome, StoreError> {
    let mut state = RunState::Idle;

    let snapshots = if config.write {
        let infos = snapshot::take(conn, &mutable_tables(config.ledger_pair))?;
        state = state.advance(RunState::SnapshotTaken);
        infos
    } else {
        Vec::new()
    };

    let input = load_input(conn, config.ledger_pair)?;
    state = state.advance(RunState::CandidatesGenerated);

    let resolution = pipeline::run(config, &input)?;
    state = state.advance(RunState::Resolved);

    let applied = if config.write {
        let stats = apply(conn, config.ledger_pair, &resolution)?;
        state = state.advance(RunState::Applied);
        Some(stats)
    } else {
        state = state.advance(RunState::DryRunReported);
        None
    };

    Ok(RunOutcome {
        resolution,
        snapshots,
        applied,
        state: state.advance(RunState::Done),
    })
}
