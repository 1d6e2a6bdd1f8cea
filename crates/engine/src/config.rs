use serde::Deserialize;

use crate::dedup::SignatureKind;
use crate::error::EngineError;
use crate::model::LedgerKind;
use crate::score::Weights;
use crate::vocab::Vocabulary;

// ---------------------------------------------------------------------------
// Ledger pairs
// ---------------------------------------------------------------------------

/// Which pair of ledgers a run reconciles. The source side owns the
/// cross-reference column written on an accepted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerPair {
    /// Receipts against bank-statement lines.
    ReceiptBanking,
    /// Payments against receipts.
    PaymentReceipt,
    /// E-transfers against bank-statement lines.
    EtransferBanking,
    /// Inter-account transfer scan within the banking ledger.
    TransferScan,
}

impl LedgerPair {
    /// (source ledger, target ledger) for the matching pass.
    /// `TransferScan` works within a single ledger.
    pub fn roles(&self) -> (LedgerKind, LedgerKind) {
        match self {
            Self::ReceiptBanking => (LedgerKind::Receipt, LedgerKind::BankingTransaction),
            Self::PaymentReceipt => (LedgerKind::Payment, LedgerKind::Receipt),
            Self::EtransferBanking => (LedgerKind::Etransfer, LedgerKind::BankingTransaction),
            Self::TransferScan => {
                (LedgerKind::BankingTransaction, LedgerKind::BankingTransaction)
            }
        }
    }
}

impl std::fmt::Display for LedgerPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReceiptBanking => write!(f, "receipt_banking"),
            Self::PaymentReceipt => write!(f, "payment_receipt"),
            Self::EtransferBanking => write!(f, "etransfer_banking"),
            Self::TransferScan => write!(f, "transfer_scan"),
        }
    }
}

impl std::str::FromStr for LedgerPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receipt_banking" | "receipt-banking" => Ok(Self::ReceiptBanking),
            "payment_receipt" | "payment-receipt" => Ok(Self::PaymentReceipt),
            "etransfer_banking" | "etransfer-banking" => Ok(Self::EtransferBanking),
            "transfer_scan" | "transfer-scan" => Ok(Self::TransferScan),
            other => Err(format!("unknown ledger pair: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Everything a reconciliation run needs, passed explicitly into the
/// orchestrator. No process-wide state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub ledger_pair: LedgerPair,
    /// Strict amount ceiling in cents: a difference exactly at the
    /// ceiling is out, one cent below is in. 1 means exact match only.
    pub amount_tolerance_cents: i64,
    pub date_window_days: u32,
    /// Index bucket width. Must cover the date window, otherwise
    /// adjacent-bucket lookup could miss candidates.
    pub bucket_days: u32,
    pub min_confidence: f64,
    pub max_transfer_cost: f64,
    /// Run the duplicate detector over the source ledger.
    pub dedup: bool,
    pub dedup_signature: SignatureKind,
    pub weights: Weights,
    pub vocabulary: Vocabulary,
    /// Mutate storage. Defaults off: dry-run everywhere unless asked.
    pub write: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            ledger_pair: LedgerPair::ReceiptBanking,
            amount_tolerance_cents: 1000,
            date_window_days: 5,
            bucket_days: 7,
            min_confidence: 0.55,
            max_transfer_cost: 10.0,
            dedup: true,
            dedup_signature: SignatureKind::DateAmountText,
            weights: Weights::default(),
            vocabulary: Vocabulary::default(),
            write: false,
        }
    }
}

impl ReconcileConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: ReconcileConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.amount_tolerance_cents < 1 {
            return Err(EngineError::ConfigValidation(format!(
                "amount_tolerance_cents must be >= 1, got {}",
                self.amount_tolerance_cents
            )));
        }
        if self.bucket_days == 0 {
            return Err(EngineError::ConfigValidation(
                "bucket_days must be >= 1".into(),
            ));
        }
        if self.bucket_days < self.date_window_days {
            return Err(EngineError::ConfigValidation(format!(
                "bucket_days ({}) must cover date_window_days ({})",
                self.bucket_days, self.date_window_days
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(EngineError::ConfigValidation(format!(
                "min_confidence must be in [0,1], got {}",
                self.min_confidence
            )));
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(EngineError::ConfigValidation(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ReconcileConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_minimal_toml() {
        let config = ReconcileConfig::from_toml(
            r#"
ledger_pair = "transfer_scan"
date_window_days = 3
bucket_days = 7
"#,
        )
        .unwrap();
        assert_eq!(config.ledger_pair, LedgerPair::TransferScan);
        assert_eq!(config.date_window_days, 3);
        // Untouched fields keep their defaults.
        assert_eq!(config.amount_tolerance_cents, 1000);
        assert!(!config.write);
    }

    #[test]
    fn parse_with_weights_and_vocab() {
        let config = ReconcileConfig::from_toml(
            r#"
ledger_pair = "receipt_banking"

[weights]
amount = 0.5
date = 0.25
text = 0.25

[vocabulary]
transfer = ["transfer", "virement"]
"#,
        )
        .unwrap();
        assert_eq!(config.weights.amount, 0.5);
        assert_eq!(config.vocabulary.transfer, vec!["transfer", "virement"]);
    }

    #[test]
    fn reject_bad_weights() {
        let err = ReconcileConfig::from_toml(
            r#"
[weights]
amount = 0.9
date = 0.3
text = 0.3
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn reject_zero_tolerance() {
        let mut config = ReconcileConfig::default();
        config.amount_tolerance_cents = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_window_wider_than_bucket() {
        let mut config = ReconcileConfig::default();
        config.date_window_days = 10;
        config.bucket_days = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn ledger_pair_from_str_accepts_dashes() {
        assert_eq!(
            "receipt-banking".parse::<LedgerPair>().unwrap(),
            LedgerPair::ReceiptBanking
        );
        assert!("nonsense".parse::<LedgerPair>().is_err());
    }
}
