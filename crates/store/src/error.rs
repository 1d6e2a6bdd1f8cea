use bookmatch_engine::EngineError;

/// Storage-layer failures. Snapshot and commit failures abort the whole
/// run; they carry enough context (table names, driver detail) that the
/// run can be retried safely.
#[derive(Debug)]
pub enum StoreError {
    Open { path: String, detail: String },
    Query { table: String, detail: String },
    SnapshotFailure { table: String, detail: String },
    CommitFailure { detail: String },
    Engine(EngineError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, detail } => {
                write!(f, "cannot open database {path}: {detail}")
            }
            Self::Query { table, detail } => {
                write!(f, "query against {table} failed: {detail}")
            }
            Self::SnapshotFailure { table, detail } => {
                write!(f, "snapshot of {table} failed, run aborted: {detail}")
            }
            Self::CommitFailure { detail } => {
                write!(f, "apply transaction rolled back: {detail}")
            }
            Self::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<EngineError> for StoreError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}
