use bookmatch_engine::config::LedgerPair;
use bookmatch_engine::model::LedgerKind;

/// Full DDL. Money columns are TEXT on purpose: amounts are parsed
/// straight to integer cents and never travel through floating point.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS receipts (
    id INTEGER PRIMARY KEY,
    date TEXT,
    total TEXT,
    vendor TEXT,
    account_id INTEGER NOT NULL DEFAULT 1,
    banking_transaction_id INTEGER,
    manual_entry INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS banking_transactions (
    id INTEGER PRIMARY KEY,
    date TEXT,
    debit TEXT,
    credit TEXT,
    description TEXT,
    account_id INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS payments (
    id INTEGER PRIMARY KEY,
    date TEXT,
    amount TEXT,
    payee TEXT,
    account_id INTEGER NOT NULL DEFAULT 1,
    receipt_id INTEGER,
    reference_key TEXT,
    manual_entry INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS etransfer_transactions (
    id INTEGER PRIMARY KEY,
    date TEXT,
    amount TEXT,
    name TEXT,
    account_id INTEGER NOT NULL DEFAULT 1,
    banking_transaction_id INTEGER,
    reference_number TEXT
);

CREATE TABLE IF NOT EXISTS charters (
    id INTEGER PRIMARY KEY,
    date TEXT,
    customer TEXT
);

CREATE TABLE IF NOT EXISTS charter_payments (
    id INTEGER PRIMARY KEY,
    charter_id INTEGER NOT NULL,
    payment_id INTEGER NOT NULL
);
"#;

// ---------------------------------------------------------------------------
// Table registry
// ---------------------------------------------------------------------------

/// Column layout of one ledger table. `None` means the ledger has no
/// such column; the loader substitutes NULL.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub table: &'static str,
    pub date: &'static str,
    pub amount: Option<&'static str>,
    pub debit: Option<&'static str>,
    pub credit: Option<&'static str>,
    pub text: &'static str,
    /// FK this ledger owns; written on an accepted match.
    pub link: Option<&'static str>,
    pub natural_key: Option<&'static str>,
    pub manual_entry: Option<&'static str>,
}

pub fn table_for(kind: LedgerKind) -> TableSpec {
    match kind {
        LedgerKind::Receipt => TableSpec {
            table: "receipts",
            date: "date",
            amount: Some("total"),
            debit: None,
            credit: None,
            text: "vendor",
            link: Some("banking_transaction_id"),
            natural_key: None,
            manual_entry: Some("manual_entry"),
        },
        LedgerKind::BankingTransaction => TableSpec {
            table: "banking_transactions",
            date: "date",
            amount: None,
            debit: Some("debit"),
            credit: Some("credit"),
            text: "description",
            link: None,
            natural_key: None,
            manual_entry: None,
        },
        LedgerKind::Payment => TableSpec {
            table: "payments",
            date: "date",
            amount: Some("amount"),
            debit: None,
            credit: None,
            text: "payee",
            link: Some("receipt_id"),
            natural_key: Some("reference_key"),
            manual_entry: Some("manual_entry"),
        },
        LedgerKind::Etransfer => TableSpec {
            table: "etransfer_transactions",
            date: "date",
            amount: Some("amount"),
            debit: None,
            credit: None,
            text: "name",
            link: Some("banking_transaction_id"),
            natural_key: Some("reference_number"),
            manual_entry: None,
        },
    }
}

/// (table, column) pairs that reference records of the given ledger.
/// Re-pointed from superseded to keeper before a superseded row is
/// deleted.
pub fn dependents_of(kind: LedgerKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        LedgerKind::Receipt => &[("payments", "receipt_id")],
        LedgerKind::BankingTransaction => &[
            ("receipts", "banking_transaction_id"),
            ("etransfer_transactions", "banking_transaction_id"),
        ],
        LedgerKind::Payment => &[("charter_payments", "payment_id")],
        LedgerKind::Etransfer => &[],
    }
}

/// Every table a run for this pair may mutate. Snapshot scope.
pub fn mutable_tables(pair: LedgerPair) -> Vec<&'static str> {
    let (source, _) = pair.roles();
    let mut tables = vec![table_for(source).table];
    for (table, _) in dependents_of(source) {
        if !tables.contains(table) {
            tables.push(table);
        }
    }
    tables
}
