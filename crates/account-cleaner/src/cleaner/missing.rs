//! Removal of incomplete rows.

use super::{Removal, WorkingFrame};
use crate::error::Result;
use crate::types::{CleaningReport, RemovalRule};
use crate::utils::{column_names, missing_mask};

/// Drop every row with a missing value in any column.
///
/// The report lists, per removed row, which columns were missing.
pub(crate) fn drop_incomplete_rows(
    frame: &mut WorkingFrame,
    nan_is_missing: bool,
    report: &mut CleaningReport,
) -> Result<()> {
    let height = frame.height();
    let mut drop = vec![false; height];
    let mut missing_columns: Vec<Vec<String>> = vec![Vec::new(); height];
    let mut affected: Vec<String> = Vec::new();

    for name in column_names(frame.df()) {
        let series = frame.series(&name)?;
        let mask = missing_mask(&series, nan_is_missing)?;

        let mut hit = false;
        for (row, missing) in mask.into_iter().enumerate() {
            if missing {
                drop[row] = true;
                missing_columns[row].push(name.clone());
                hit = true;
            }
        }
        if hit {
            affected.push(name);
        }
    }

    let values: Vec<String> = missing_columns.iter().map(|cols| cols.join(", ")).collect();

    frame.remove_rows(
        &drop,
        &values,
        Removal {
            rule: RemovalRule::MissingValues,
            column: None,
            reason: format!("Missing values found in columns: {}", affected.join(", ")),
        },
        report,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_drop_incomplete_rows() {
        let df = df![
            "acct" => [Some("A1"), None, Some("A3"), Some("A4")],
            "amt" => [Some(1.0), Some(2.0), None, Some(f64::NAN)],
        ]
        .unwrap();
        let mut frame = WorkingFrame::new(df);
        let mut report = CleaningReport::default();

        drop_incomplete_rows(&mut frame, true, &mut report).unwrap();

        assert_eq!(frame.height(), 1);
        let record = &report.removals[0];
        assert_eq!(record.rows, vec![1, 2, 3]);
        assert_eq!(record.values, vec!["acct", "amt", "amt"]);
        assert_eq!(record.reason, "Missing values found in columns: acct, amt");
    }

    #[test]
    fn test_nan_kept_when_not_missing() {
        let df = df!["amt" => [1.0, f64::NAN]].unwrap();
        let mut frame = WorkingFrame::new(df);
        let mut report = CleaningReport::default();

        drop_incomplete_rows(&mut frame, false, &mut report).unwrap();

        assert_eq!(frame.height(), 2);
        assert!(report.is_clean());
    }
}
