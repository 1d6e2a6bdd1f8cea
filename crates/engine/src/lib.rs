//! `bookmatch-engine` — ledger reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded, normalized ledger records and
//! returns resolved matches, duplicate groups, and transfer pairs.
//! No CLI or IO dependencies.

pub mod assign;
pub mod config;
pub mod dedup;
pub mod error;
pub mod index;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod score;
pub mod similarity;
pub mod transfer;
pub mod vocab;

pub use config::{LedgerPair, ReconcileConfig};
pub use error::EngineError;
pub use model::{LedgerKind, LedgerRecord, MatchCandidate, MatchResult, TransferPair};
pub use pipeline::{run, Resolution, RunInput};
