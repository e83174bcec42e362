//! Human-readable rendering of a cleaning report.

use crate::types::{CleaningReport, RemovalRecord};
use polars::prelude::DataFrame;
use std::fmt::Write;

/// Rows listed per warning before the rest are summarized.
const MAX_LISTED_ROWS: usize = 20;

fn render_record(out: &mut String, record: &RemovalRecord) {
    let _ = writeln!(out, "Warning: {}:", record.reason);
    for (row, value) in record.rows.iter().zip(&record.values).take(MAX_LISTED_ROWS) {
        let _ = writeln!(out, "  row {}: {}", row, value);
    }
    if record.count() > MAX_LISTED_ROWS {
        let _ = writeln!(out, "  ... and {} more", record.count() - MAX_LISTED_ROWS);
    }
}

/// One `Warning:` block per removal, followed by a summary.
pub fn render(report: &CleaningReport) -> String {
    let mut out = String::new();

    if report.account_columns.is_empty() {
        let _ = writeln!(out, "No account number column found; duplicates were not checked.");
    }

    if !report.duplicate_keys.is_empty() {
        let _ = writeln!(
            out,
            "Warning: Duplicate account numbers found in [{}]:",
            report.account_columns.join(", ")
        );
        for key in &report.duplicate_keys {
            let _ = writeln!(out, "  {}", key.join(" | "));
        }
    }

    for record in &report.removals {
        render_record(&mut out, record);
    }

    if !report.parsed_date_columns.is_empty() {
        let _ = writeln!(
            out,
            "Parsed date columns: {}",
            report.parsed_date_columns.join(", ")
        );
    }

    let _ = writeln!(
        out,
        "Rows: {} -> {} ({} removed) in {}ms",
        report.rows_before, report.rows_after, report.rows_removed, report.duration_ms
    );
    out
}

/// The first `n` rows of `df`, formatted as a table.
pub fn preview(df: &DataFrame, n: usize) -> String {
    format!("{}", df.head(Some(n)))
}
