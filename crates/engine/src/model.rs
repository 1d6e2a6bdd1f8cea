use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ledgers
// ---------------------------------------------------------------------------

/// One independently-maintained record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Receipt,
    BankingTransaction,
    Payment,
    Etransfer,
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Receipt => write!(f, "receipt"),
            Self::BankingTransaction => write!(f, "banking_transaction"),
            Self::Payment => write!(f, "payment"),
            Self::Etransfer => write!(f, "etransfer"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single normalized row from any ledger table.
///
/// `amount_cents` is always signed: debit negative, credit positive.
/// Sources that keep debit/credit in separate columns are collapsed to
/// this form by `normalize` before anything downstream sees them.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRecord {
    pub id: i64,
    pub ledger: LedgerKind,
    pub date: NaiveDate,
    pub amount_cents: i64,
    /// Free-text vendor/description — the only semantic hint besides
    /// amount and date.
    pub counterparty: String,
    pub account_id: i64,
    /// Cross-reference written by a previous run, if any. Lives on the
    /// record whose schema owns the FK column.
    pub linked_id: Option<i64>,
    /// Natural key assigned by the source system (e.g. a payment
    /// reference key). Used for exact-duplicate detection independent
    /// of date/amount.
    pub natural_key: Option<String>,
    pub manual_entry: bool,
}

impl LedgerRecord {
    /// Unsigned amount, for cross-ledger comparison where the two sides
    /// record opposite directions.
    pub fn magnitude_cents(&self) -> i64 {
        self.amount_cents.abs()
    }

    pub fn is_outflow(&self) -> bool {
        self.amount_cents < 0
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// A pairing score. The weighted strategy produces a probability-style
/// confidence in [0,1] (higher is better); the transfer strategy
/// produces a handcrafted additive cost (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    Confidence(f64),
    Cost(f64),
}

impl Score {
    /// Sort key where smaller sorts first, i.e. better.
    pub fn rank(&self) -> f64 {
        match self {
            Self::Confidence(c) => -c,
            Self::Cost(c) => *c,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Confidence(v) | Self::Cost(v) => *v,
        }
    }
}

/// Contributing factor recorded on a candidate, in the order the scorer
/// observed it. Audit trail and deterministic tie-break input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonTag {
    NaturalKey,
    ExactAmount,
    AmountClose,
    SameDate,
    DateClose,
    VendorMatch,
    VendorPartial,
    OppositeDirections,
    ExplicitTransfer,
    CashWithdrawal,
    ArrowCheque,
    PenniesAmount,
}

impl std::fmt::Display for ReasonTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NaturalKey => "natural_key",
            Self::ExactAmount => "exact_amount",
            Self::AmountClose => "amount_close",
            Self::SameDate => "same_date",
            Self::DateClose => "date_close",
            Self::VendorMatch => "vendor_match",
            Self::VendorPartial => "vendor_partial",
            Self::OppositeDirections => "opposite_directions",
            Self::ExplicitTransfer => "explicit_transfer",
            Self::CashWithdrawal => "cash_withdrawal",
            Self::ArrowCheque => "arrow_cheque",
            Self::PenniesAmount => "pennies_amount",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Candidates + results
// ---------------------------------------------------------------------------

/// A scored pairing of a source-ledger record with a target-ledger
/// record, prior to assignment.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate {
    pub source_id: i64,
    pub target_id: i64,
    pub score: Score,
    pub reasons: Vec<ReasonTag>,
}

/// An accepted pairing after assignment resolution. Each source id and
/// each target id appears in at most one result per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub source_id: i64,
    pub target_id: i64,
    pub score: Score,
    pub reasons: Vec<ReasonTag>,
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

/// Why a cross-account pair is considered a transfer. Drives whether the
/// pair is excluded from expense/revenue totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferClass {
    ExplicitTransfer,
    CashWithdrawal,
    ArrowChequeTransfer,
    AmountDateMatch,
}

impl std::fmt::Display for TransferClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExplicitTransfer => write!(f, "explicit_transfer"),
            Self::CashWithdrawal => write!(f, "cash_withdrawal"),
            Self::ArrowChequeTransfer => write!(f, "arrow_cheque_transfer"),
            Self::AmountDateMatch => write!(f, "amount_date_match"),
        }
    }
}

/// An accepted cross-account pairing: one side OUT, the other IN, on
/// different accounts.
#[derive(Debug, Clone, Serialize)]
pub struct TransferPair {
    pub out_id: i64,
    pub in_id: i64,
    pub out_account: i64,
    pub in_account: i64,
    pub amount_cents: i64,
    pub cost: f64,
    pub class: TransferClass,
    pub reasons: Vec<ReasonTag>,
}

// ---------------------------------------------------------------------------
// Duplicate groups
// ---------------------------------------------------------------------------

/// Records of a single ledger sharing a signature. Exactly one keeper;
/// the rest are superseded. Computed per run, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub ledger: LedgerKind,
    pub signature: String,
    pub keeper_id: i64,
    pub superseded: Vec<i64>,
    /// True when the keeper-selection rules tied. Surfaced for manual
    /// review; never auto-applied.
    pub needs_review: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rank_orders_both_modes() {
        // Higher confidence ranks earlier
        assert!(Score::Confidence(0.9).rank() < Score::Confidence(0.5).rank());
        // Lower cost ranks earlier
        assert!(Score::Cost(1.0).rank() < Score::Cost(4.0).rank());
    }

    #[test]
    fn reason_tags_render_snake_case() {
        assert_eq!(ReasonTag::ExactAmount.to_string(), "exact_amount");
        assert_eq!(ReasonTag::ArrowCheque.to_string(), "arrow_cheque");
        assert_eq!(TransferClass::AmountDateMatch.to_string(), "amount_date_match");
    }

    #[test]
    fn ledger_kind_display() {
        assert_eq!(LedgerKind::BankingTransaction.to_string(), "banking_transaction");
        assert_eq!(LedgerKind::Etransfer.to_string(), "etransfer");
    }
}
