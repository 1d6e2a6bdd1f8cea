use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Amount proximity in [0,1]: 1.0 under one cent of difference,
/// degrading linearly to 0 at `ceiling_cents`.
pub fn amount_similarity(a_cents: i64, b_cents: i64, ceiling_cents: i64) -> f64 {
    let diff = (a_cents - b_cents).abs();
    if diff == 0 {
        return 1.0;
    }
    if ceiling_cents <= 0 || diff >= ceiling_cents {
        return 0.0;
    }
    1.0 - diff as f64 / ceiling_cents as f64
}

/// Date proximity in [0,1]: 1.0 at zero days apart, linearly decaying
/// to 0 at `max_days`.
pub fn date_similarity(d1: NaiveDate, d2: NaiveDate, max_days: u32) -> f64 {
    let gap = (d1 - d2).num_days().unsigned_abs();
    if gap == 0 {
        return 1.0;
    }
    if max_days == 0 || gap >= u64::from(max_days) {
        return 0.0;
    }
    1.0 - gap as f64 / f64::from(max_days)
}

/// Normalized-token overlap in [0,1]: 1.0 on exact equality after
/// normalization, 0.9 on substring containment, else Jaccard on the
/// token sets.
pub fn text_similarity(s1: &str, s2: &str) -> f64 {
    let a = normalize_text(s1);
    let b = normalize_text(s2);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.9;
    }

    let ta = tokens(&a);
    let tb = tokens(&b);
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Whether the two strings share a distinctive vendor token — an
/// alphabetic token of four or more characters. Statement lines bury
/// the vendor name in POS noise ("POS PURCHASE SHELL 04482"), so plain
/// set overlap under-reports an obvious vendor hit.
pub fn shares_vendor_token(s1: &str, s2: &str) -> bool {
    let a = normalize_text(s1);
    let b = normalize_text(s2);
    let distinctive = |t: &&str| t.len() >= 4 && t.chars().any(|c| c.is_alphabetic());
    let ta: BTreeSet<&str> = tokens(&a).into_iter().filter(distinctive).collect();
    let shared = tokens(&b).into_iter().filter(distinctive).any(|t| ta.contains(t));
    shared
}

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            for lc in c.to_lowercase() {
                out.push(lc);
            }
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

fn tokens(normalized: &str) -> BTreeSet<&str> {
    normalized.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn amount_exact_and_decay() {
        assert_eq!(amount_similarity(4250, 4250, 1000), 1.0);
        let half = amount_similarity(4250, 4750, 1000);
        assert!((half - 0.5).abs() < 1e-9);
        assert_eq!(amount_similarity(4250, 5250, 1000), 0.0);
        assert_eq!(amount_similarity(4250, 9999, 1000), 0.0);
    }

    #[test]
    fn date_exact_and_decay() {
        assert_eq!(date_similarity(d("2012-05-03"), d("2012-05-03"), 5), 1.0);
        let one_off = date_similarity(d("2012-05-03"), d("2012-05-04"), 5);
        assert!((one_off - 0.8).abs() < 1e-9);
        assert_eq!(date_similarity(d("2012-05-03"), d("2012-05-08"), 5), 0.0);
    }

    #[test]
    fn text_exact_after_normalization() {
        assert_eq!(text_similarity("Shell Gas", "SHELL GAS"), 1.0);
        assert_eq!(text_similarity("Shell-Gas.", "shell gas"), 1.0);
    }

    #[test]
    fn text_containment() {
        let s = text_similarity("Shell Gas", "POS PURCHASE SHELL GAS 04482");
        assert!((s - 0.9).abs() < 1e-9);
    }

    #[test]
    fn text_jaccard_overlap() {
        // {fuel, co} vs {fuel, ltd}: 1 shared / 3 union
        let s = text_similarity("Fuel Co", "Fuel Ltd");
        assert!((s - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(text_similarity("", "Shell"), 0.0);
        assert_eq!(text_similarity("...", "Shell"), 0.0);
    }

    #[test]
    fn vendor_token_shared_through_pos_noise() {
        assert!(shares_vendor_token("Shell Gas", "POS PURCHASE SHELL 04482"));
        // "gas" is only three characters; no distinctive token shared.
        assert!(!shares_vendor_token("Gas Bar", "POS PURCHASE 04482"));
        assert!(!shares_vendor_token("Fuel Co", "Shell 04482"));
    }

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(normalize_text("  POS*PURCHASE -- SHELL #04482  "), "pos purchase shell 04482");
    }
}
