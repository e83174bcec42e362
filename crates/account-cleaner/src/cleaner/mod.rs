//! Data cleaning module for account datasets.
//!
//! [`DataCleaner::clean`] applies a fixed sequence of rules, each one
//! operating on the output of the previous:
//! 1. Dropping rows with missing values
//! 2. Finding account identifier columns
//! 3. Removing duplicate rows and conflicting account records
//! 4. Removing negative numeric values
//! 5. Removing null or too-early values in date columns
//! 6. Parsing free-text date columns
//!
//! Every removed row is recorded in the returned [`CleaningReport`].

mod accounts;
pub mod date_parser;
mod dates;
mod missing;
mod numeric;

pub use accounts::find_account_columns;
pub use date_parser::parse_lenient;

use crate::config::CleanerConfig;
use crate::error::Result;
use crate::types::{CleanResult, CleaningReport, RemovalRecord, RemovalRule};
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Applies the cleaning rules to a dataset.
///
/// # Example
///
/// ```rust,ignore
/// use account_cleaner::{CleanerConfig, DataCleaner};
///
/// let cleaner = DataCleaner::new(CleanerConfig::default());
/// let result = cleaner.clean(&df)?;
/// println!("{} rows kept", result.report.rows_after);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: CleanerConfig,
}

static_assertions::assert_impl_all!(DataCleaner: Send, Sync);

impl DataCleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Clean a copy of `df`. The input frame is left untouched.
    ///
    /// Data-quality problems never fail; only polars errors propagate.
    pub fn clean(&self, df: &DataFrame) -> Result<CleanResult> {
        let start = Instant::now();
        let mut frame = WorkingFrame::new(df.clone());
        let mut report = CleaningReport {
            rows_before: df.height(),
            columns: df.width(),
            ..Default::default()
        };

        info!(
            "Cleaning dataset: {} rows x {} columns",
            df.height(),
            df.width()
        );

        missing::drop_incomplete_rows(&mut frame, self.config.treat_nan_as_missing, &mut report)?;

        let account_columns = find_account_columns(frame.df(), &self.config);
        if account_columns.is_empty() {
            debug!("No account column found, skipping deduplication");
        } else {
            debug!("Account columns: {:?}", account_columns);
            accounts::remove_exact_duplicates(&mut frame, &account_columns, &mut report)?;
            accounts::remove_residual_duplicates(&mut frame, &account_columns, &mut report)?;
        }
        report.account_columns = account_columns;

        numeric::remove_negative_values(&mut frame, &mut report)?;
        dates::remove_invalid_dates(&mut frame, self.config.min_date, &mut report)?;
        dates::parse_text_date_columns(&mut frame, &self.config, &mut report)?;

        report.rows_after = frame.height();
        report.rows_removed = report.rows_before - report.rows_after;
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Cleaning complete: {} -> {} rows ({} removed)",
            report.rows_before, report.rows_after, report.rows_removed
        );

        Ok(CleanResult {
            data: frame.into_inner(),
            report,
        })
    }
}

/// What a removal is recorded as.
pub(crate) struct Removal<'a> {
    pub rule: RemovalRule,
    pub column: Option<&'a str>,
    pub reason: String,
}

/// A DataFrame that remembers where each of its rows came from.
pub(crate) struct WorkingFrame {
    df: DataFrame,
    origin: Vec<usize>,
}

impl WorkingFrame {
    pub fn new(df: DataFrame) -> Self {
        let origin = (0..df.height()).collect();
        Self { df, origin }
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn into_inner(self) -> DataFrame {
        self.df
    }

    /// Owned copy of a column as a Series.
    pub fn series(&self, name: &str) -> Result<Series> {
        Ok(self.df.column(name)?.as_materialized_series().clone())
    }

    pub fn replace_column(&mut self, name: &str, series: Series) -> Result<()> {
        self.df.replace(name, series)?;
        Ok(())
    }

    /// Drop every row flagged in `drop` and record it under `removal`.
    ///
    /// `values` holds one rendering per current row; only the dropped
    /// ones end up in the report. Returns the number of rows removed.
    pub fn remove_rows(
        &mut self,
        drop: &[bool],
        values: &[String],
        removal: Removal<'_>,
        report: &mut CleaningReport,
    ) -> Result<usize> {
        debug_assert_eq!(drop.len(), self.height());

        let dropped: Vec<usize> = drop
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| d.then_some(i))
            .collect();
        if dropped.is_empty() {
            return Ok(0);
        }

        let record = RemovalRecord {
            rule: removal.rule,
            column: removal.column.map(str::to_string),
            rows: dropped.iter().map(|&i| self.origin[i]).collect(),
            values: dropped
                .iter()
                .map(|&i| values.get(i).cloned().unwrap_or_default())
                .collect(),
            reason: removal.reason,
        };

        let keep: Vec<bool> = drop.iter().map(|d| !d).collect();
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        self.df = self.df.filter(&mask)?;
        self.origin = self
            .origin
            .iter()
            .zip(&keep)
            .filter_map(|(&o, &k)| k.then_some(o))
            .collect();

        warn!("{} - removing {} row(s)", record.reason, record.count());
        let count = record.count();
        report.removals.push(record);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::temporal_values;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn cleaner() -> DataCleaner {
        DataCleaner::new(
            CleanerConfig::builder()
                .account_aliases(["acct", "acct#", "ac_no"])
                .build()
                .unwrap(),
        )
    }

    fn strings(df: &DataFrame, column: &str) -> Vec<String> {
        crate::utils::render_series(df.column(column).unwrap().as_materialized_series()).unwrap()
    }

    #[test]
    fn test_working_frame_tracks_origin() {
        let df = df!["x" => [1, 2, 3, 4]].unwrap();
        let mut frame = WorkingFrame::new(df);
        let mut report = CleaningReport::default();

        let values: Vec<String> = (0..4).map(|i| i.to_string()).collect();
        let removal = |reason: &str| Removal {
            rule: RemovalRule::NegativeValue,
            column: Some("x"),
            reason: reason.to_string(),
        };

        frame
            .remove_rows(&[false, true, false, false], &values, removal("first"), &mut report)
            .unwrap();
        frame
            .remove_rows(&[false, false, true], &values, removal("second"), &mut report)
            .unwrap();

        assert_eq!(frame.height(), 2);
        assert_eq!(report.removals[0].rows, vec![1]);
        // Position 2 of the shrunk frame is row 3 of the input
        assert_eq!(report.removals[1].rows, vec![3]);
    }

    #[test]
    fn test_remove_rows_noop_records_nothing() {
        let df = df!["x" => [1, 2]].unwrap();
        let mut frame = WorkingFrame::new(df);
        let mut report = CleaningReport::default();
        let removed = frame
            .remove_rows(
                &[false, false],
                &[],
                Removal {
                    rule: RemovalRule::MissingValues,
                    column: None,
                    reason: "nothing".to_string(),
                },
                &mut report,
            )
            .unwrap();

        assert_eq!(removed, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_exact_duplicate_collapses_and_negative_removed() {
        // Rows 0 and 1 are identical; row 2 has a negative amount
        let df = df![
            "acct" => ["A1", "A1", "A2"],
            "amt" => [10, 10, -5],
        ]
        .unwrap();

        let result = cleaner().clean(&df).unwrap();

        assert_eq!(result.data.height(), 1);
        assert_eq!(strings(&result.data, "acct"), vec!["A1"]);
        assert_eq!(strings(&result.data, "amt"), vec!["10"]);
        assert_eq!(result.report.removed_by(RemovalRule::DuplicateRows), 1);
        assert_eq!(result.report.removed_by(RemovalRule::NegativeValue), 1);
        assert!(result.report.duplicate_keys.is_empty());
    }

    #[test]
    fn test_conflicting_account_rows_all_removed() {
        let df = df![
            "acct" => ["A1", "A1", "B2"],
            "amt" => [10, 20, 30],
        ]
        .unwrap();

        let result = cleaner().clean(&df).unwrap();

        assert_eq!(strings(&result.data, "acct"), vec!["B2"]);
        assert_eq!(result.report.duplicate_keys, vec![vec!["A1".to_string()]]);
        let record = &result.report.removals[0];
        assert_eq!(record.rule, RemovalRule::ResidualDuplicate);
        assert_eq!(record.rows, vec![0, 1]);
    }

    #[test]
    fn test_no_account_column_skips_dedup() {
        let df = df![
            "customer" => ["A1", "A1"],
            "amt" => [10, 20],
        ]
        .unwrap();

        let result = cleaner().clean(&df).unwrap();

        assert_eq!(result.data.height(), 2);
        assert!(result.report.account_columns.is_empty());
        assert!(result.report.is_clean());
    }

    #[test]
    fn test_account_alias_is_case_insensitive() {
        let df = df![
            "ACCT#" => ["A1", "A1"],
            "amt" => [1, 2],
        ]
        .unwrap();

        let result = cleaner().clean(&df).unwrap();

        assert_eq!(result.report.account_columns, vec!["ACCT#".to_string()]);
        assert_eq!(result.data.height(), 0);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let df = df![
            "acct" => [Some("A1"), None],
            "amt" => [-1, 2],
        ]
        .unwrap();
        let before = df.clone();

        let _ = cleaner().clean(&df).unwrap();

        assert!(df.equals_missing(&before));
    }

    #[test]
    fn test_text_dates_parsed_and_invalid_removed() {
        let df = df![
            "acct" => ["A1", "A2", "A3", "A4"],
            "TransactionDate" => ["2023-01-01", "N/A", "Feb 9, 2023", "1899-12-31"],
        ]
        .unwrap();

        let result = cleaner().clean(&df).unwrap();
        let dates = temporal_values(
            result
                .data
                .column("TransactionDate")
                .unwrap()
                .as_materialized_series(),
        )
        .unwrap();

        let expected: Vec<_> = [(2023, 1, 1), (2023, 2, 9)]
            .iter()
            .map(|&(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
            })
            .collect();
        assert_eq!(dates, expected);
        assert_eq!(result.report.removed_by(RemovalRule::UnparseableDate), 1);
        assert_eq!(result.report.removed_by(RemovalRule::InvalidDate), 1);
        assert_eq!(
            result.report.parsed_date_columns,
            vec!["TransactionDate".to_string()]
        );
    }

    #[test]
    fn test_empty_dataset() {
        let df = DataFrame::empty();
        let result = cleaner().clean(&df).unwrap();
        assert_eq!(result.data.height(), 0);
        assert!(result.report.is_clean());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let df = df![
            "acct" => [Some("A1"), Some("A1"), Some("A2"), Some("A3"), None, Some("A4"), Some("A5")],
            "amt" => [Some(1.5), Some(2.0), Some(-1.0), Some(4.0), Some(5.0), Some(6.0), Some(7.5)],
            "open_date" => [
                "2020-01-01", "2020-01-02", "2020-01-03", "bad", "2020-01-05", "2020-01-06", "07/01/2020",
            ],
        ]
        .unwrap();

        let first = cleaner().clean(&df).unwrap();
        assert_eq!(strings(&first.data, "acct"), vec!["A4", "A5"]);

        let second = cleaner().clean(&first.data).unwrap();

        assert!(second.report.is_clean());
        assert!(second.data.equals_missing(&first.data));
    }
}
