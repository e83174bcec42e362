//! Report and result types returned by the cleaner.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Why a row was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalRule {
    /// Row had a null (or NaN) in at least one column.
    MissingValues,
    /// Row repeated an earlier row in every column.
    DuplicateRows,
    /// Row shared its account key with another row holding different data.
    ResidualDuplicate,
    /// Numeric column held a negative value.
    NegativeValue,
    /// Date column held a null or too-early value.
    InvalidDate,
    /// Text date column held a value that could not be read as a date.
    UnparseableDate,
}

impl RemovalRule {
    /// Human-readable reason used in console warnings.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingValues => "Missing values",
            Self::DuplicateRows => "Duplicate rows",
            Self::ResidualDuplicate => "Duplicate account numbers",
            Self::NegativeValue => "Negative values",
            Self::InvalidDate => "Invalid dates",
            Self::UnparseableDate => "Unparseable dates",
        }
    }
}

impl std::fmt::Display for RemovalRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// One batch of rows removed by a single rule (and column, where relevant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalRecord {
    pub rule: RemovalRule,
    /// Column that triggered the removal, if the rule is column-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Zero-based positions of the removed rows in the input dataset.
    pub rows: Vec<usize>,
    /// Offending value for each removed row, rendered as text.
    pub values: Vec<String>,
    pub reason: String,
}

impl RemovalRecord {
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Structured account of everything [`DataCleaner::clean`](crate::DataCleaner::clean) removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    pub columns: usize,
    /// Columns matched against the account aliases.
    pub account_columns: Vec<String>,
    /// Text columns converted to dates.
    pub parsed_date_columns: Vec<String>,
    /// Account key combinations that still repeated after removing exact duplicates.
    pub duplicate_keys: Vec<Vec<String>>,
    pub removals: Vec<RemovalRecord>,
    pub duration_ms: u64,
}

impl CleaningReport {
    /// Rows removed by a given rule, across all columns.
    pub fn removed_by(&self, rule: RemovalRule) -> usize {
        self.removals
            .iter()
            .filter(|r| r.rule == rule)
            .map(RemovalRecord::count)
            .sum()
    }

    /// Whether the dataset came through untouched.
    pub fn is_clean(&self) -> bool {
        self.removals.is_empty()
    }
}

/// The cleaned dataset together with its report.
#[derive(Debug, Clone)]
pub struct CleanResult {
    pub data: DataFrame,
    pub report: CleaningReport,
}
