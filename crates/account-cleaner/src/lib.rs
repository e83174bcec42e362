//! Account Dataset Cleaner Library
//!
//! Batch cleaning of spreadsheets of account records, built on Polars.
//!
//! # Overview
//!
//! A dataset is loaded from a workbook or delimited file, passed through a
//! fixed sequence of cleaning rules and written back out as CSV:
//!
//! - **Missing Values**: Rows with any null (or NaN) cell are dropped
//! - **Account Deduplication**: Exact duplicate rows collapse to one; account
//!   numbers that still repeat are removed entirely
//! - **Negative Values**: Rows with negative numbers are dropped
//! - **Date Validation**: Null or pre-1900 dates are dropped
//! - **Date Parsing**: Free-text columns named like dates are converted to
//!   timestamps, value by value
//!
//! Every removal is recorded in a [`CleaningReport`] returned with the data.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use account_cleaner::{load_dataset, write_csv, CleanerConfig, DataCleaner};
//!
//! let df = load_dataset("accounts.xlsx", None)?;
//!
//! let config = CleanerConfig::builder()
//!     .account_aliases(["acct#", "account_number"])
//!     .day_first(true)
//!     .build()?;
//!
//! let mut result = DataCleaner::new(config).clean(&df)?;
//! write_csv(&mut result.data, "accounts_cleaned.csv", b',')?;
//!
//! println!("{} rows removed", result.report.rows_removed);
//! ```
//!
//! # Configuration
//!
//! [`CleanerConfig`] holds the cleaning rules; [`JobConfig`] adds the
//! input and output locations and can be read from a JSON file:
//!
//! ```json
//! {
//!   "input_path": "data/accounts.xlsx",
//!   "sheet": "2023",
//!   "cleaner": { "account_aliases": ["acct#", "ac_no"], "day_first": true }
//! }
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod io;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, find_account_columns, parse_lenient};
pub use config::{
    CleanerConfig, CleanerConfigBuilder, ConfigValidationError, DEFAULT_ACCOUNT_ALIASES,
    DEFAULT_DATE_MARKER, JobConfig,
};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use io::{load_dataset, write_csv};
pub use reporting::{ReportWriter, preview, render};
pub use types::{CleanResult, CleaningReport, RemovalRecord, RemovalRule};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype, is_temporal_dtype};
