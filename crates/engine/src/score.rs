use serde::{Deserialize, Serialize};

use crate::model::{LedgerRecord, MatchCandidate, ReasonTag, Score};
use crate::similarity::{
    amount_similarity, date_similarity, shares_vendor_token, text_similarity,
};
use crate::vocab::{classify, Signal, Vocabulary};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Named scoring strategies. Callers pick the one appropriate to the
/// ledger pair being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStrategy {
    /// Weighted average of amount/date/vendor similarity — a
    /// probability-style confidence in [0,1], higher is better.
    /// Used for receipt↔banking style matching.
    WeightedMatch,
    /// Handcrafted additive cost for cross-account transfer matching:
    /// base penalty proportional to the date gap, fixed bonuses layered
    /// on for keyword hits and non-round amounts. Lower is better.
    TransferCost,
}

/// Weights for the `WeightedMatch` strategy. Must sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub amount: f64,
    pub date: f64,
    pub text: f64,
}

impl Default for Weights {
    fn default() -> Self {
        // Documented defaults for receipt↔banking matching.
        Self { amount: 0.40, date: 0.30, text: 0.30 }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.amount + self.date + self.text
    }
}

/// Everything the scorer needs besides the two records.
pub struct ScoreParams<'a> {
    pub weights: Weights,
    pub amount_ceiling_cents: i64,
    pub date_window_days: u32,
    pub min_confidence: f64,
    pub max_transfer_cost: f64,
    pub vocab: &'a Vocabulary,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score one (source, candidate) pair. Returns `None` when the score
/// falls under the configured confidence floor / over the cost ceiling,
/// so sub-threshold candidates never reach the matcher. Pairs whose
/// amount difference exceeds the ceiling are filtered upstream by the
/// index and never arrive here.
pub fn score_pair(
    source: &LedgerRecord,
    target: &LedgerRecord,
    strategy: ScoreStrategy,
    params: &ScoreParams<'_>,
) -> Option<MatchCandidate> {
    match strategy {
        ScoreStrategy::WeightedMatch => weighted_match(source, target, params),
        ScoreStrategy::TransferCost => transfer_cost(source, target, params),
    }
}

fn weighted_match(
    source: &LedgerRecord,
    target: &LedgerRecord,
    params: &ScoreParams<'_>,
) -> Option<MatchCandidate> {
    let mut reasons = Vec::new();

    // An equal natural key is definitive regardless of date drift.
    if let (Some(sk), Some(tk)) = (&source.natural_key, &target.natural_key) {
        if sk == tk {
            reasons.push(ReasonTag::NaturalKey);
            if source.magnitude_cents() == target.magnitude_cents() {
                reasons.push(ReasonTag::ExactAmount);
            }
            return Some(MatchCandidate {
                source_id: source.id,
                target_id: target.id,
                score: Score::Confidence(1.0),
                reasons,
            });
        }
    }

    let amount = amount_similarity(
        source.magnitude_cents(),
        target.magnitude_cents(),
        params.amount_ceiling_cents,
    );
    let date = date_similarity(source.date, target.date, params.date_window_days);
    let text = text_similarity(&source.counterparty, &target.counterparty);

    if source.magnitude_cents() == target.magnitude_cents() {
        reasons.push(ReasonTag::ExactAmount);
    } else if amount > 0.0 {
        reasons.push(ReasonTag::AmountClose);
    }
    if source.date == target.date {
        reasons.push(ReasonTag::SameDate);
    } else if date > 0.0 {
        reasons.push(ReasonTag::DateClose);
    }
    if text >= 0.9 || shares_vendor_token(&source.counterparty, &target.counterparty) {
        reasons.push(ReasonTag::VendorMatch);
    } else if text > 0.0 {
        reasons.push(ReasonTag::VendorPartial);
    }

    let confidence =
        params.weights.amount * amount + params.weights.date * date + params.weights.text * text;
    if confidence < params.min_confidence {
        return None;
    }

    Some(MatchCandidate {
        source_id: source.id,
        target_id: target.id,
        score: Score::Confidence(confidence.min(1.0)),
        reasons,
    })
}

/// Transfer cost model, carried over from the inter-account transfer
/// finder: start from the day gap, subtract fixed bonuses for signals
/// that make an accidental amount collision unlikely.
const BONUS_EXPLICIT_TRANSFER: f64 = 3.0;
const BONUS_ARROW_CHEQUE: f64 = 2.5;
const BONUS_CASH_WITHDRAWAL: f64 = 2.0;
const BONUS_PENNIES: f64 = 2.0;
const PENALTY_PER_DOLLAR_OFF: f64 = 0.5;

fn transfer_cost(
    source: &LedgerRecord,
    target: &LedgerRecord,
    params: &ScoreParams<'_>,
) -> Option<MatchCandidate> {
    let mut reasons = Vec::new();
    let day_gap = (source.date - target.date).num_days().unsigned_abs();
    let mut cost = day_gap as f64;

    if source.is_outflow() != target.is_outflow() {
        reasons.push(ReasonTag::OppositeDirections);
    }

    let amount_diff = (source.magnitude_cents() - target.magnitude_cents()).abs();
    if amount_diff == 0 {
        reasons.push(ReasonTag::ExactAmount);
    } else {
        reasons.push(ReasonTag::AmountClose);
        cost += amount_diff as f64 / 100.0 * PENALTY_PER_DOLLAR_OFF;
    }
    if day_gap == 0 {
        reasons.push(ReasonTag::SameDate);
    }

    let source_signals = classify(&source.counterparty, params.vocab);
    let target_signals = classify(&target.counterparty, params.vocab);

    if source_signals.contains(&Signal::Transfer) || target_signals.contains(&Signal::Transfer) {
        cost -= BONUS_EXPLICIT_TRANSFER;
        reasons.push(ReasonTag::ExplicitTransfer);
    }
    if source_signals.contains(&Signal::ArrowCheque)
        || target_signals.contains(&Signal::ArrowCheque)
    {
        cost -= BONUS_ARROW_CHEQUE;
        reasons.push(ReasonTag::ArrowCheque);
    }
    if source_signals.contains(&Signal::Cash) || target_signals.contains(&Signal::Cash) {
        cost -= BONUS_CASH_WITHDRAWAL;
        reasons.push(ReasonTag::CashWithdrawal);
    }
    // Non-round "pennies" amounts colliding by accident is rare.
    if source.magnitude_cents() % 100 != 0 && amount_diff == 0 {
        cost -= BONUS_PENNIES;
        reasons.push(ReasonTag::PenniesAmount);
    }

    if cost > params.max_transfer_cost {
        return None;
    }

    Some(MatchCandidate {
        source_id: source.id,
        target_id: target.id,
        score: Score::Cost(cost),
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerKind;
    use chrono::NaiveDate;

    fn rec(id: i64, date: &str, cents: i64, text: &str) -> LedgerRecord {
        LedgerRecord {
            id,
            ledger: LedgerKind::Receipt,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount_cents: cents,
            counterparty: text.into(),
            account_id: 1,
            linked_id: None,
            natural_key: None,
            manual_entry: false,
        }
    }

    fn params(vocab: &Vocabulary) -> ScoreParams<'_> {
        ScoreParams {
            weights: Weights::default(),
            amount_ceiling_cents: 1000,
            date_window_days: 5,
            min_confidence: 0.55,
            max_transfer_cost: 10.0,
            vocab,
        }
    }

    #[test]
    fn receipt_banking_exact_pair() {
        let vocab = Vocabulary::default();
        let p = params(&vocab);
        let receipt = rec(1, "2012-05-03", 4250, "Shell Gas");
        let banking = rec(2, "2012-05-03", -4250, "POS PURCHASE SHELL 04482");
        let cand = score_pair(&receipt, &banking, ScoreStrategy::WeightedMatch, &p).unwrap();
        assert!(matches!(cand.score, Score::Confidence(c) if c > 0.7));
        assert!(cand.reasons.contains(&ReasonTag::ExactAmount));
        assert!(cand.reasons.contains(&ReasonTag::SameDate));
        assert!(cand.reasons.contains(&ReasonTag::VendorMatch));
    }

    #[test]
    fn below_floor_never_emitted() {
        let vocab = Vocabulary::default();
        let p = params(&vocab);
        // $9.99 off, 4 days apart, unrelated text.
        let a = rec(1, "2012-05-03", 4250, "Shell Gas");
        let b = rec(2, "2012-05-07", -5249, "HYDRO BILL");
        assert!(score_pair(&a, &b, ScoreStrategy::WeightedMatch, &p).is_none());
    }

    #[test]
    fn natural_key_short_circuits() {
        let vocab = Vocabulary::default();
        let p = params(&vocab);
        let mut a = rec(1, "2012-05-03", 4250, "x");
        let mut b = rec(2, "2012-05-06", -4250, "y");
        a.natural_key = Some("PAY-0042".into());
        b.natural_key = Some("PAY-0042".into());
        let cand = score_pair(&a, &b, ScoreStrategy::WeightedMatch, &p).unwrap();
        assert_eq!(cand.score, Score::Confidence(1.0));
        assert_eq!(cand.reasons[0], ReasonTag::NaturalKey);
    }

    #[test]
    fn transfer_cost_rewards_keywords() {
        let vocab = Vocabulary::default();
        let p = params(&vocab);
        let out = rec(1, "2012-06-01", -50000, "TRANSFER TO 002");
        let inn = rec(2, "2012-06-02", 50000, "TRANSFER FROM 001");
        let cand = score_pair(&out, &inn, ScoreStrategy::TransferCost, &p).unwrap();
        // day gap 1 - explicit transfer bonus 3 = -2
        assert!(matches!(cand.score, Score::Cost(c) if (c - (-2.0)).abs() < 1e-9));
        assert!(cand.reasons.contains(&ReasonTag::ExplicitTransfer));
        assert!(cand.reasons.contains(&ReasonTag::OppositeDirections));
    }

    #[test]
    fn transfer_cost_pennies_bonus() {
        let vocab = Vocabulary::default();
        let p = params(&vocab);
        let out = rec(1, "2012-06-01", -43317, "WITHDRAWAL");
        let inn = rec(2, "2012-06-01", 43317, "DEPOSIT");
        let cand = score_pair(&out, &inn, ScoreStrategy::TransferCost, &p).unwrap();
        assert!(cand.reasons.contains(&ReasonTag::PenniesAmount));
        assert!(cand.reasons.contains(&ReasonTag::CashWithdrawal));
    }

    #[test]
    fn transfer_cost_over_ceiling_dropped() {
        let vocab = Vocabulary::default();
        let mut p = params(&vocab);
        p.max_transfer_cost = 3.0;
        // 5-day gap, no keyword help, round amount.
        let out = rec(1, "2012-06-01", -50000, "MISC");
        let inn = rec(2, "2012-06-06", 50000, "MISC");
        assert!(score_pair(&out, &inn, ScoreStrategy::TransferCost, &p).is_none());
    }
}
