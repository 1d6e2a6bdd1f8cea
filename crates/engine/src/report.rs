use crate::error::EngineError;
use crate::pipeline::Resolution;

/// Format cents as a plain dollar string, sign preserved.
pub fn cents_to_dollars(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Render the resolution as delimited text for human review: one row
/// per match, transfer pair, duplicate group, and unmatched record.
pub fn render_report(resolution: &Resolution, delimiter: u8) -> Result<String, EngineError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    let write =
        |writer: &mut csv::Writer<Vec<u8>>, row: &[String]| -> Result<(), EngineError> {
            writer
                .write_record(row)
                .map_err(|e| EngineError::Report(e.to_string()))
        };

    write(
        &mut writer,
        &["kind", "source_id", "target_id", "score", "tags", "status"].map(String::from),
    )?;

    for m in &resolution.matches {
        write(
            &mut writer,
            &[
                "match".into(),
                m.source_id.to_string(),
                m.target_id.to_string(),
                format!("{:.4}", m.score.value()),
                join_tags(&m.reasons),
                "accepted".into(),
            ],
        )?;
    }

    for t in &resolution.transfers {
        write(
            &mut writer,
            &[
                "transfer".into(),
                t.out_id.to_string(),
                t.in_id.to_string(),
                format!("{:.2}", t.cost),
                join_tags(&t.reasons),
                t.class.to_string(),
            ],
        )?;
    }

    for g in &resolution.duplicates {
        let status = if g.needs_review {
            "needs-manual-review"
        } else {
            "superseded"
        };
        write(
            &mut writer,
            &[
                "duplicate".into(),
                g.keeper_id.to_string(),
                g.superseded
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join("+"),
                String::new(),
                g.signature.clone(),
                status.into(),
            ],
        )?;
    }

    for id in &resolution.unmatched_sources {
        write(
            &mut writer,
            &[
                "unmatched_source".into(),
                id.to_string(),
                String::new(),
                String::new(),
                String::new(),
                "no_candidate".into(),
            ],
        )?;
    }
    for id in &resolution.unmatched_targets {
        write(
            &mut writer,
            &[
                "unmatched_target".into(),
                String::new(),
                id.to_string(),
                String::new(),
                String::new(),
                "no_candidate".into(),
            ],
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EngineError::Report(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| EngineError::Report(e.to_string()))
}

/// Plain count summary for stderr.
pub fn render_summary(resolution: &Resolution) -> String {
    let s = &resolution.summary;
    format!(
        "{}: {} matched (${}), {} unmatched (${}), {} duplicate group(s) ({} superseded, {} need review), {} transfer(s) (${}), {} malformed skipped",
        s.ledger_pair,
        s.matched,
        cents_to_dollars(s.matched_total_cents),
        s.unmatched_sources,
        cents_to_dollars(s.unmatched_source_total_cents),
        s.duplicate_groups,
        s.superseded,
        s.needs_review,
        s.transfers,
        cents_to_dollars(s.transfer_total_cents),
        s.malformed_skipped,
    )
}

fn join_tags<T: std::fmt::Display>(tags: &[T]) -> String {
    tags.iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("+")
}
