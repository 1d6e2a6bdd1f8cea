use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Keyword signal classes recognized in counterparty text. Used for
/// transfer detection and for duplicate-keeper heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Transfer,
    Cash,
    Cheque,
    Fee,
    Deposit,
    /// The "Arrow cheque" pattern: a cheque description carrying the
    /// arrow marker, used for inter-account cheque transfers.
    ArrowCheque,
}

/// Data-driven keyword vocabularies. The lists historically lived
/// inline in conditional branches across the maintenance scripts; as a
/// table, tests can enumerate exact expected tags without touching
/// matching logic. Overridable from config TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub transfer: Vec<String>,
    pub cash: Vec<String>,
    pub cheque: Vec<String>,
    pub fee: Vec<String>,
    pub deposit: Vec<String>,
    pub arrow: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            transfer: list(&["transfer", "tfr", "xfer", "e-transfer", "etfr"]),
            cash: list(&["cash withdrawal", "withdrawal", "atm", "abm"]),
            cheque: list(&["cheque", "check", "chq"]),
            fee: list(&["fee", "service charge", "nsf", "interest charge"]),
            deposit: list(&["deposit", "dep"]),
            arrow: list(&["arrow"]),
        }
    }
}

/// Case-insensitive substring scan of `text` against the vocabulary.
/// `ArrowCheque` fires only when both an arrow marker and a cheque
/// keyword are present.
pub fn classify(text: &str, vocab: &Vocabulary) -> BTreeSet<Signal> {
    let lower = text.to_lowercase();
    // Keywords are lowercased too: a config override like "TRANSFER"
    // must behave the same as "transfer".
    let hit = |keywords: &[String]| {
        keywords
            .iter()
            .any(|k| !k.is_empty() && lower.contains(k.to_lowercase().as_str()))
    };

    let mut signals = BTreeSet::new();
    if hit(&vocab.transfer) {
        signals.insert(Signal::Transfer);
    }
    if hit(&vocab.cash) {
        signals.insert(Signal::Cash);
    }
    if hit(&vocab.cheque) {
        signals.insert(Signal::Cheque);
    }
    if hit(&vocab.fee) {
        signals.insert(Signal::Fee);
    }
    if hit(&vocab.deposit) {
        signals.insert(Signal::Deposit);
    }
    if hit(&vocab.arrow) && signals.contains(&Signal::Cheque) {
        signals.insert(Signal::ArrowCheque);
    }
    signals
}
