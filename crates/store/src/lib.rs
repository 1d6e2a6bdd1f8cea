//! SQLite storage layer: schema, row loading, pre-mutation snapshots,
//! atomic apply, and the run orchestrator. The engine crate never sees
//! a connection; everything here converts between tables and the
//! engine's record types.

pub mod apply;
pub mod error;
pub mod load;
pub mod run;
pub mod schema;
pub mod snapshot;

pub use apply::ApplyStats;
pub use error::StoreError;
pub use run::{execute, RunOutcome, RunState};
pub use snapshot::SnapshotInfo;
