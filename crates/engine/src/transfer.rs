use crate::assign;
use crate::index::WindowIndex;
use crate::model::{
    LedgerRecord, MatchCandidate, ReasonTag, Score, TransferClass, TransferPair,
};
use crate::score::{score_pair, ScoreParams, ScoreStrategy};

/// Find inter-account transfer pairs within one ledger's records:
/// an outflow on one account matched to an inflow on another account,
/// close in amount and date, scored by the transfer cost model and
/// resolved to a one-to-one assignment.
pub fn find_transfers(
    records: &[LedgerRecord],
    params: &ScoreParams<'_>,
    amount_tolerance_cents: i64,
    date_window_days: u32,
    bucket_days: u32,
) -> Vec<TransferPair> {
    let index = WindowIndex::build(records, bucket_days);

    let mut candidates: Vec<MatchCandidate> = Vec::new();
    for out in records.iter().filter(|r| r.is_outflow()) {
        for target in index.candidates(out, amount_tolerance_cents, date_window_days) {
            if target.is_outflow() || target.account_id == out.account_id {
                continue;
            }
            if let Some(candidate) =
                score_pair(out, target, ScoreStrategy::TransferCost, params)
            {
                candidates.push(candidate);
            }
        }
    }

    let by_id = |id: i64| records.iter().find(|r| r.id == id);

    assign::resolve(&candidates)
        .into_iter()
        .filter_map(|result| {
            let out = by_id(result.source_id)?;
            let inn = by_id(result.target_id)?;
            let cost = match result.score {
                Score::Cost(c) => c,
                Score::Confidence(c) => -c,
            };
            Some(TransferPair {
                out_id: out.id,
                in_id: inn.id,
                out_account: out.account_id,
                in_account: inn.account_id,
                amount_cents: out.magnitude_cents(),
                cost,
                class: classify_pair(&result.reasons),
                reasons: result.reasons,
            })
        })
        .collect()
}

/// Classification precedence: explicit transfer keywords, then cash
/// withdrawal, then the arrow cheque pattern, else a bare amount/date
/// coincidence.
fn classify_pair(reasons: &[ReasonTag]) -> TransferClass {
    if reasons.contains(&ReasonTag::ExplicitTransfer) {
        TransferClass::ExplicitTransfer
    } else if reasons.contains(&ReasonTag::CashWithdrawal) {
        TransferClass::CashWithdrawal
    } else if reasons.contains(&ReasonTag::ArrowCheque) {
        TransferClass::ArrowChequeTransfer
    } else {
        TransferClass::AmountDateMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerKind;
    use crate::score::Weights;
    use crate::vocab::Vocabulary;
    use chrono::NaiveDate;

    fn rec(id: i64, account: i64, date: &str, cents: i64, text: &str) -> LedgerRecord {
        LedgerRecord {
            id,
            ledger: LedgerKind::BankingTransaction,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount_cents: cents,
            counterparty: text.into(),
            account_id: account,
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
    fn explicit_transfer_across_accounts() {
        let vocab = Vocabulary::default();
        let records = vec![
            rec(1, 1, "2012-06-01", -50000, "TRANSFER TO 002"),
            rec(2, 2, "2012-06-02", 50000, "TRANSFER FROM 001"),
        ];
        let pairs = find_transfers(&records, &params(&vocab), 1, 5, 7);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].class, TransferClass::ExplicitTransfer);
        assert_eq!((pairs[0].out_id, pairs[0].in_id), (1, 2));
        assert_eq!(pairs[0].amount_cents, 50000);
    }

    #[test]
    fn same_account_never_pairs() {
        let vocab = Vocabulary::default();
        let records = vec![
            rec(1, 1, "2012-06-01", -50000, "TRANSFER"),
            rec(2, 1, "2012-06-01", 50000, "TRANSFER"),
        ];
        assert!(find_transfers(&records, &params(&vocab), 1, 5, 7).is_empty());
    }

    #[test]
    fn cash_withdrawal_classification() {
        let vocab = Vocabulary::default();
        let records = vec![
            rec(1, 1, "2012-06-01", -20000, "ATM WITHDRAWAL"),
            rec(2, 2, "2012-06-01", 20000, "DEPOSIT"),
        ];
        let pairs = find_transfers(&records, &params(&vocab), 1, 5, 7);
        assert_eq!(pairs[0].class, TransferClass::CashWithdrawal);
    }

    #[test]
    fn arrow_cheque_classification() {
        let vocab = Vocabulary::default();
        let records = vec![
            rec(1, 1, "2012-06-01", -75033, "CHEQUE 0042 ARROW"),
            rec(2, 2, "2012-06-03", 75033, "DEPOSIT 0042"),
        ];
        let pairs = find_transfers(&records, &params(&vocab), 1, 5, 7);
        assert_eq!(pairs[0].class, TransferClass::ArrowChequeTransfer);
    }

    #[test]
    fn bare_amount_date_match() {
        let vocab = Vocabulary::default();
        let records = vec![
            rec(1, 1, "2012-06-01", -50000, "MISC DEBIT"),
            rec(2, 2, "2012-06-01", 50000, "MISC CREDIT"),
        ];
        let pairs = find_transfers(&records, &params(&vocab), 1, 5, 7);
        assert_eq!(pairs[0].class, TransferClass::AmountDateMatch);
    }

    #[test]
    fn contested_inflow_goes_to_cheaper_pair() {
        let vocab = Vocabulary::default();
        let records = vec![
            rec(1, 1, "2012-06-01", -50000, "TRANSFER OUT"),
            rec(2, 2, "2012-06-04", -50000, "MISC DEBIT"),
            rec(3, 3, "2012-06-01", 50000, "CREDIT"),
        ];
        let pairs = find_transfers(&records, &params(&vocab), 1, 5, 7);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].out_id, 1);
    }
}
