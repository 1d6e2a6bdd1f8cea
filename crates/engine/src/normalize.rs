use chrono::NaiveDate;

use crate::error::EngineError;
use crate::model::{LedgerKind, LedgerRecord};

/// A row as it comes off storage, before normalization.
///
/// Different ledgers store money differently: a single signed `amount`
/// column, or split nullable `debit`/`credit` columns. Both forms are
/// carried here as the raw strings and collapsed by `normalize`.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub id: i64,
    pub date: Option<String>,
    pub amount: Option<String>,
    pub debit: Option<String>,
    pub credit: Option<String>,
    pub text: Option<String>,
    pub account_id: i64,
    pub linked_id: Option<i64>,
    pub natural_key: Option<String>,
    pub manual_entry: bool,
}

/// Collapse a raw row into the uniform record shape.
///
/// Fails with `MalformedRecord` when the date is missing/unparsable or
/// when every amount form is null/zero. No side effects.
pub fn normalize(raw: &RawRow, ledger: LedgerKind) -> Result<LedgerRecord, EngineError> {
    let malformed = |reason: String| EngineError::MalformedRecord {
        ledger,
        id: raw.id,
        reason,
    };

    let date_str = raw
        .date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("missing date".into()))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| malformed(format!("cannot parse date '{date_str}'")))?;

    let amount_cents = resolve_amount(raw).ok_or_else(|| malformed("no usable amount".into()))?;
    if amount_cents == 0 {
        return Err(malformed("zero amount".into()));
    }

    Ok(LedgerRecord {
        id: raw.id,
        ledger,
        date,
        amount_cents,
        counterparty: raw.text.clone().unwrap_or_default(),
        account_id: raw.account_id,
        linked_id: raw.linked_id,
        natural_key: raw
            .natural_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        manual_entry: raw.manual_entry,
    })
}

/// Signed cents from whichever amount form the row carries.
/// Debit columns encode outflow, so they come back negative; a signed
/// `amount` column is taken as-is.
fn resolve_amount(raw: &RawRow) -> Option<i64> {
    if let Some(cents) = raw.amount.as_deref().and_then(parse_amount_cents) {
        return Some(cents);
    }
    let debit = raw.debit.as_deref().and_then(parse_amount_cents);
    let credit = raw.credit.as_deref().and_then(parse_amount_cents);
    match (debit, credit) {
        (None, None) => None,
        (d, c) => Some(c.unwrap_or(0) - d.unwrap_or(0).abs()),
    }
}

/// Parse a decimal money string straight to cents. Never goes through
/// floating point. Tolerates `$`, thousands separators, a leading sign,
/// and parenthesized negatives.
pub fn parse_amount_cents(input: &str) -> Option<i64> {
    let mut s = input.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = &s[1..s.len() - 1];
    }
    let s = s.trim().trim_start_matches('$').trim();
    let s = if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        rest
    } else if let Some(rest) = s.strip_prefix('+') {
        rest
    } else {
        s
    };
    let s: String = s.chars().filter(|c| *c != ',').collect();
    if s.is_empty() {
        return None;
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s.as_str(), ""),
    };
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 2 {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut cents: i64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
    if frac.len() == 1 {
        cents *= 10;
    }

    let total = whole.checked_mul(100)?.checked_add(cents)?;
    Some(if negative { -total } else { total })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: i64) -> RawRow {
        RawRow {
            id,
            date: Some("2012-05-03".into()),
            ..RawRow::default()
        }
    }

    #[test]
    fn parse_amounts() {
        assert_eq!(parse_amount_cents("42.50"), Some(4250));
        assert_eq!(parse_amount_cents("42.5"), Some(4250));
        assert_eq!(parse_amount_cents("42"), Some(4200));
        assert_eq!(parse_amount_cents("-42.50"), Some(-4250));
        assert_eq!(parse_amount_cents("$1,234.99"), Some(123499));
        assert_eq!(parse_amount_cents("(500.00)"), Some(-50000));
        assert_eq!(parse_amount_cents(".75"), Some(75));
        assert_eq!(parse_amount_cents(""), None);
        assert_eq!(parse_amount_cents("abc"), None);
        assert_eq!(parse_amount_cents("1.234"), None);
    }

    #[test]
    fn signed_amount_column() {
        let mut r = raw(1);
        r.amount = Some("42.50".into());
        r.text = Some("Shell Gas".into());
        let rec = normalize(&r, LedgerKind::Receipt).unwrap();
        assert_eq!(rec.amount_cents, 4250);
        assert_eq!(rec.counterparty, "Shell Gas");
    }

    #[test]
    fn debit_credit_split_columns() {
        let mut r = raw(2);
        r.debit = Some("42.50".into());
        let rec = normalize(&r, LedgerKind::BankingTransaction).unwrap();
        assert_eq!(rec.amount_cents, -4250);

        let mut r = raw(3);
        r.credit = Some("100.00".into());
        let rec = normalize(&r, LedgerKind::BankingTransaction).unwrap();
        assert_eq!(rec.amount_cents, 10000);
    }

    #[test]
    fn missing_amounts_rejected() {
        let r = raw(4);
        let err = normalize(&r, LedgerKind::Receipt).unwrap_err();
        assert!(err.to_string().contains("no usable amount"));
    }

    #[test]
    fn zero_amount_rejected() {
        let mut r = raw(5);
        r.amount = Some("0.00".into());
        let err = normalize(&r, LedgerKind::Receipt).unwrap_err();
        assert!(err.to_string().contains("zero amount"));
    }

    #[test]
    fn bad_date_rejected() {
        let mut r = raw(6);
        r.date = Some("05/03/2012".into());
        r.amount = Some("10.00".into());
        assert!(normalize(&r, LedgerKind::Receipt).is_err());

        let mut r = raw(7);
        r.date = None;
        r.amount = Some("10.00".into());
        assert!(normalize(&r, LedgerKind::Receipt).is_err());
    }

    #[test]
    fn blank_natural_key_dropped() {
        let mut r = raw(8);
        r.amount = Some("10.00".into());
        r.natural_key = Some("   ".into());
        let rec = normalize(&r, LedgerKind::Payment).unwrap();
        assert_eq!(rec.natural_key, None);
    }
}
