//! Configuration types for the account cleaner.
//!
//! [`CleanerConfig`] controls the cleaning rules and is built with a
//! validating builder. [`JobConfig`] wraps it with the input and output
//! locations so nothing about a run is hard-coded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Column names recognised as account identifiers when none are configured.
pub const DEFAULT_ACCOUNT_ALIASES: [&str; 5] =
    ["acct#", "ac_no", "account_number", "acct_no", "acc_no"];

/// Substring that marks a text column as holding dates.
pub const DEFAULT_DATE_MARKER: &str = "date";

/// Earliest date accepted in date columns.
pub fn default_min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_aliases() -> BTreeSet<String> {
    DEFAULT_ACCOUNT_ALIASES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Configuration for [`DataCleaner`](crate::cleaner::DataCleaner).
///
/// Use [`CleanerConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use account_cleaner::CleanerConfig;
///
/// let config = CleanerConfig::builder()
///     .account_aliases(["acct_no", "customer_id"])
///     .day_first(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Lowercase aliases for the account identifier column.
    /// Default: [`DEFAULT_ACCOUNT_ALIASES`]
    pub account_aliases: BTreeSet<String>,

    /// Dates strictly before this are invalid.
    /// Default: 1900-01-01
    pub min_date: NaiveDate,

    /// Text columns whose lowercased name contains this are parsed as dates.
    /// Default: "date"
    pub date_column_marker: String,

    /// Read ambiguous numeric dates such as `03/04/2023` as day-first.
    /// Default: false
    pub day_first: bool,

    /// Count float NaN as a missing value when dropping incomplete rows.
    /// Default: true
    pub treat_nan_as_missing: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            account_aliases: default_aliases(),
            min_date: default_min_date(),
            date_column_marker: DEFAULT_DATE_MARKER.to_string(),
            day_first: false,
            treat_nan_as_missing: true,
        }
    }
}

impl CleanerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleanerConfigBuilder {
        CleanerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.account_aliases.is_empty() {
            return Err(ConfigValidationError::NoAccountAliases);
        }

        if self.account_aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigValidationError::BlankAccountAlias);
        }

        if self.date_column_marker.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDateMarker);
        }

        Ok(())
    }

    /// Check whether a column name is one of the account aliases.
    ///
    /// Both sides are compared lowercased, so aliases read from a JSON job
    /// file match regardless of case.
    pub fn is_account_column(&self, column: &str) -> bool {
        let column = column.trim().to_lowercase();
        self.account_aliases
            .iter()
            .any(|alias| alias.trim().to_lowercase() == column)
    }

    /// Check whether a column name marks a free-text date column.
    pub fn is_date_named(&self, column: &str) -> bool {
        column
            .to_lowercase()
            .contains(&self.date_column_marker.to_lowercase())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("At least one account column alias is required")]
    NoAccountAliases,

    #[error("Account column aliases must not be blank")]
    BlankAccountAlias,

    #[error("Date column marker must not be empty")]
    EmptyDateMarker,

    #[error("Invalid delimiter {0:?} (must be a single ASCII character)")]
    InvalidDelimiter(String),
}

/// Builder for [`CleanerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleanerConfigBuilder {
    account_aliases: Option<BTreeSet<String>>,
    min_date: Option<NaiveDate>,
    date_column_marker: Option<String>,
    day_first: Option<bool>,
    treat_nan_as_missing: Option<bool>,
}

impl CleanerConfigBuilder {
    /// Replace the account alias set. Aliases are lowercased and trimmed.
    pub fn account_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.account_aliases = Some(
            aliases
                .into_iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .collect(),
        );
        self
    }

    /// Set the earliest valid date.
    pub fn min_date(mut self, date: NaiveDate) -> Self {
        self.min_date = Some(date);
        self
    }

    /// Set the substring that marks free-text date columns.
    pub fn date_column_marker(mut self, marker: impl Into<String>) -> Self {
        self.date_column_marker = Some(marker.into());
        self
    }

    /// Read ambiguous numeric dates day-first.
    pub fn day_first(mut self, day_first: bool) -> Self {
        self.day_first = Some(day_first);
        self
    }

    /// Count float NaN as missing.
    pub fn treat_nan_as_missing(mut self, enable: bool) -> Self {
        self.treat_nan_as_missing = Some(enable);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleanerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleanerConfig, ConfigValidationError> {
        let config = CleanerConfig {
            account_aliases: self.account_aliases.unwrap_or_else(default_aliases),
            min_date: self.min_date.unwrap_or_else(default_min_date),
            date_column_marker: self
                .date_column_marker
                .unwrap_or_else(|| DEFAULT_DATE_MARKER.to_string()),
            day_first: self.day_first.unwrap_or(false),
            treat_nan_as_missing: self.treat_nan_as_missing.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

/// A complete cleaning job: where to read, where to write, how to clean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Spreadsheet or delimited text file to read.
    pub input_path: PathBuf,

    /// Worksheet to read. `None` selects the first sheet.
    #[serde(default)]
    pub sheet: Option<String>,

    /// Destination of the cleaned delimited file.
    /// `None` writes `<input_stem>_cleaned.csv` next to the input.
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Field delimiter of the output file.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Cleaning rules.
    #[serde(default)]
    pub cleaner: CleanerConfig,
}

fn default_delimiter() -> char {
    ','
}

impl JobConfig {
    /// Create a job with default cleaning rules.
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            sheet: None,
            output_path: None,
            delimiter: default_delimiter(),
            cleaner: CleanerConfig::default(),
        }
    }

    /// Read a job description from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let job: JobConfig = serde_json::from_str(&text)?;
        job.validate()?;
        Ok(job)
    }

    /// Validate the job, including its cleaning rules.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '\n' | '\r' | '"') {
            return Err(ConfigValidationError::InvalidDelimiter(
                self.delimiter.to_string(),
            ));
        }
        self.cleaner.validate()
    }

    /// Output path, defaulting to `<input_stem>_cleaned.csv` beside the input.
    pub fn resolved_output_path(&self) -> PathBuf {
        if let Some(ref path) = self.output_path {
            return path.clone();
        }

        let stem = input_stem(&self.input_path);
        let file_name = format!("{}_cleaned.csv", stem);
        match self.input_path.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Delimiter as the byte the CSV writer expects.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }
}

/// Extract the file stem (name without extension) from a path.
pub fn input_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}
