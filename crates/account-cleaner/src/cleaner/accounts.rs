//! Account column detection and deduplication.
//!
//! Rows are compared on their typed values through polars grouping, so
//! floats or timestamps that only differ past their display precision are
//! still told apart.

use super::{Removal, WorkingFrame};
use crate::config::CleanerConfig;
use crate::error::Result;
use crate::types::{CleaningReport, RemovalRule};
use crate::utils::{column_names, render_series};
use polars::prelude::*;
use tracing::warn;

/// Columns whose lowercased name is one of the configured account aliases.
pub fn find_account_columns(df: &DataFrame, config: &CleanerConfig) -> Vec<String> {
    column_names(df)
        .into_iter()
        .filter(|name| config.is_account_column(name))
        .collect()
}

/// Render the account key of every row for the report, e.g. `A1 | x`.
fn display_keys(df: &DataFrame, columns: &[String]) -> Result<Vec<String>> {
    let mut rows = vec![Vec::with_capacity(columns.len()); df.height()];
    for name in columns {
        let rendered = render_series(df.column(name)?.as_materialized_series())?;
        for (row, cell) in rows.iter_mut().zip(rendered) {
            row.push(cell);
        }
    }
    Ok(rows.into_iter().map(|cells| cells.join(" | ")).collect())
}

/// Name for a temporary row index that clashes with no existing column.
fn row_index_name(df: &DataFrame) -> PlSmallStr {
    let mut name = String::from("__row_nr");
    while df.get_column_index(&name).is_some() {
        name.push('_');
    }
    name.into()
}

/// Flag every row that repeats an earlier row in every column.
fn repeated_row_mask(df: &DataFrame) -> Result<Vec<bool>> {
    let index = row_index_name(df);
    let columns = column_names(df);

    let first_rows = df
        .with_row_index(index.clone(), None)?
        .unique_stable(Some(columns.as_slice()), UniqueKeepStrategy::First, None)?;
    let kept = first_rows.column(index.as_str())?.cast(&DataType::UInt64)?;

    let mut drop = vec![true; df.height()];
    for position in kept.u64()?.into_iter().flatten() {
        drop[position as usize] = false;
    }
    Ok(drop)
}

/// Remove rows that repeat an earlier row in every column, keeping the first.
pub(crate) fn remove_exact_duplicates(
    frame: &mut WorkingFrame,
    account_columns: &[String],
    report: &mut CleaningReport,
) -> Result<()> {
    let drop = repeated_row_mask(frame.df())?;
    if !drop.contains(&true) {
        return Ok(());
    }
    let values = display_keys(frame.df(), account_columns)?;

    frame.remove_rows(
        &drop,
        &values,
        Removal {
            rule: RemovalRule::DuplicateRows,
            column: None,
            reason: "Exact duplicate rows found and will be removed".to_string(),
        },
        report,
    )?;

    Ok(())
}

/// Remove every row whose account key still occurs more than once.
///
/// After exact duplicates are gone, a repeated key means conflicting data
/// under the same account, so none of the rows sharing it is kept.
pub(crate) fn remove_residual_duplicates(
    frame: &mut WorkingFrame,
    account_columns: &[String],
    report: &mut CleaningReport,
) -> Result<()> {
    let keys = frame.df().select(account_columns.iter().map(String::as_str))?;
    let duplicated = keys.is_duplicated()?;
    if !duplicated.any() {
        return Ok(());
    }
    let drop: Vec<bool> = duplicated.into_iter().map(|d| d.unwrap_or(false)).collect();

    // First-seen order keeps the warning stable
    let repeated_keys = keys
        .filter(&BooleanChunked::from_slice("repeated".into(), &drop))?
        .unique_stable(None, UniqueKeepStrategy::First, None)?;
    let mut duplicate_keys = vec![Vec::with_capacity(account_columns.len()); repeated_keys.height()];
    for name in account_columns {
        let rendered = render_series(repeated_keys.column(name)?.as_materialized_series())?;
        for (key, cell) in duplicate_keys.iter_mut().zip(rendered) {
            key.push(cell);
        }
    }

    let listing: Vec<String> = duplicate_keys.iter().map(|k| k.join(" | ")).collect();
    warn!(
        "Duplicate account numbers found in columns [{}]: {}",
        account_columns.join(", "),
        listing.join("; ")
    );

    let values = display_keys(frame.df(), account_columns)?;
    frame.remove_rows(
        &drop,
        &values,
        Removal {
            rule: RemovalRule::ResidualDuplicate,
            column: None,
            reason: format!(
                "Duplicate account numbers found in {} and will be removed",
                account_columns.join(", ")
            ),
        },
        report,
    )?;
    report.duplicate_keys = duplicate_keys;

    Ok(())
}
