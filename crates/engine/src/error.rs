use std::fmt;

use crate::model::LedgerKind;

#[derive(Debug)]
pub enum EngineError {
    /// Bad or missing date/amount on one record. Callers skip the
    /// record, count it, and continue — never fatal to a run.
    MalformedRecord {
        ledger: LedgerKind,
        id: i64,
        reason: String,
    },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad tolerance, weights, thresholds).
    ConfigValidation(String),
    /// Report rendering error.
    Report(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRecord { ledger, id, reason } => {
                write!(f, "{ledger} record {id}: {reason}")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Report(msg) => write!(f, "report error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
