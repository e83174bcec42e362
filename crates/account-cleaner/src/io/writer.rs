//! Writing cleaned datasets as delimited text.

use crate::error::{Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Format used for `Datetime` columns in the written file.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write `df` with a header row and no index column.
///
/// Parent directories are created as needed.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .context(format!("Failed to create {}", parent.display()))?;
    }

    let mut file =
        File::create(path).context(format!("Failed to create {}", path.display()))?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(delimiter)
        .with_quote_char(b'"')
        .with_date_format(Some("%Y-%m-%d".to_string()))
        .with_datetime_format(Some(DATETIME_FORMAT.to_string()))
        .finish(df)
        .context(format!("Failed to write {}", path.display()))?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::datetime_series;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let opened = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0);
        let mut df = DataFrame::new(vec![
            Series::new("acct".into(), &["A1"]).into_column(),
            Series::new("amt".into(), &[10i64]).into_column(),
            datetime_series("open_date".into(), &[opened])
                .unwrap()
                .into_column(),
        ])
        .unwrap();

        write_csv(&mut df, &path, b',').unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "acct,amt,open_date\nA1,10,2023-01-15 00:00:00\n");
    }

    #[test]
    fn test_write_custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let mut df = df!["a" => [1, 2], "b" => ["x", "y"]].unwrap();

        write_csv(&mut df, &path, b'\t').unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next(), Some("a\tb"));
        assert_eq!(content.lines().count(), 3);
    }
}
