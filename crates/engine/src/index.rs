use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::model::LedgerRecord;

/// Candidate lookup index over one ledger's records.
///
/// Buckets by `(date bucket, amount magnitude)` so "which records of
/// ledger B could plausibly correspond to this record of ledger A" is
/// answered without an O(n·m) scan. Lookups union the record's own date
/// bucket with both neighbours — dates sitting on a bucket boundary
/// would otherwise be missed — then post-filter with the caller's
/// tolerances. Immutable once built; rebuilt per run.
pub struct WindowIndex<'a> {
    bucket_days: i64,
    buckets: HashMap<i64, BTreeMap<i64, Vec<&'a LedgerRecord>>>,
}

impl<'a> WindowIndex<'a> {
    pub fn build(records: &'a [LedgerRecord], bucket_days: u32) -> Self {
        let bucket_days = i64::from(bucket_days.max(1));
        let mut buckets: HashMap<i64, BTreeMap<i64, Vec<&'a LedgerRecord>>> = HashMap::new();
        for record in records {
            buckets
                .entry(date_bucket(record.date, bucket_days))
                .or_default()
                .entry(record.magnitude_cents())
                .or_default()
                .push(record);
        }
        Self { bucket_days, buckets }
    }

    /// Records whose amount magnitude and date sit inside the supplied
    /// tolerances, in ascending id order.
    ///
    /// The amount ceiling is strict: a difference exactly at the ceiling
    /// is excluded, one cent below is included.
    pub fn candidates(
        &self,
        record: &LedgerRecord,
        amount_tolerance_cents: i64,
        date_window_days: u32,
    ) -> Vec<&'a LedgerRecord> {
        let magnitude = record.magnitude_cents();
        let slack = (amount_tolerance_cents - 1).max(0);
        let lo = magnitude.saturating_sub(slack);
        let hi = magnitude.saturating_add(slack);

        let own = date_bucket(record.date, self.bucket_days);
        let mut out: Vec<&'a LedgerRecord> = Vec::new();
        for bucket in [own - 1, own, own + 1] {
            let Some(by_amount) = self.buckets.get(&bucket) else {
                continue;
            };
            for (_, records) in by_amount.range(lo..=hi) {
                for candidate in records {
                    let day_gap = (candidate.date - record.date).num_days().unsigned_abs();
                    if day_gap <= u64::from(date_window_days) {
                        out.push(candidate);
                    }
                }
            }
        }

        out.sort_by_key(|r| r.id);
        out
    }
}

fn date_bucket(date: NaiveDate, bucket_days: i64) -> i64 {
    i64::from(date.num_days_from_ce()).div_euclid(bucket_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerKind;

    fn rec(id: i64, date: &str, cents: i64) -> LedgerRecord {
        LedgerRecord {
            id,
            ledger: LedgerKind::BankingTransaction,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            amount_cents: cents,
            counterparty: String::new(),
            account_id: 1,
            linked_id: None,
            natural_key: None,
            manual_entry: false,
        }
    }

    #[test]
    fn exact_amount_same_day() {
        let records = vec![rec(1, "2012-05-03", -4250), rec(2, "2012-05-03", -9900)];
        let index = WindowIndex::build(&records, 7);
        let probe = rec(10, "2012-05-03", 4250);
        let found = index.candidates(&probe, 1, 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn ceiling_is_strict() {
        // $10.00 ceiling: a $10.00 difference is excluded, $9.99 included.
        let records = vec![rec(1, "2012-05-03", 5250), rec(2, "2012-05-03", 5249)];
        let index = WindowIndex::build(&records, 7);
        let probe = rec(10, "2012-05-03", 4250);
        let found = index.candidates(&probe, 1000, 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn window_boundary_dates_found_across_buckets() {
        // Adjacent bucket union: a candidate one day away but across a
        // bucket edge must still come back.
        let records = vec![rec(1, "2012-05-07", 10000)];
        let index = WindowIndex::build(&records, 1);
        let probe = rec(10, "2012-05-06", 10000);
        let found = index.candidates(&probe, 1, 1);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn date_window_filters_post_hoc() {
        let records = vec![rec(1, "2012-05-10", 10000)];
        let index = WindowIndex::build(&records, 30);
        let probe = rec(10, "2012-05-03", 10000);
        // Same bucket, but 7 days apart > 3-day window.
        assert!(index.candidates(&probe, 1, 3).is_empty());
        assert_eq!(index.candidates(&probe, 1, 7).len(), 1);
    }

    #[test]
    fn magnitude_comparison_ignores_direction() {
        // Receipt +42.50 against banking debit -42.50.
        let records = vec![rec(1, "2012-05-03", -4250)];
        let index = WindowIndex::build(&records, 7);
        let probe = rec(10, "2012-05-03", 4250);
        assert_eq!(index.candidates(&probe, 1, 0).len(), 1);
    }

    #[test]
    fn results_ordered_by_id() {
        let records = vec![
            rec(5, "2012-05-03", 4250),
            rec(2, "2012-05-03", 4250),
            rec(9, "2012-05-04", 4250),
        ];
        let index = WindowIndex::build(&records, 7);
        let probe = rec(10, "2012-05-03", 4250);
        let ids: Vec<i64> = index.candidates(&probe, 1, 2).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
