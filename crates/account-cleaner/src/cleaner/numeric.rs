//! Removal of negative values from numeric columns.

use super::{Removal, WorkingFrame};
use crate::error::Result;
use crate::types::{CleaningReport, RemovalRule};
use crate::utils::{DtypeCategory, column_names, get_dtype_category, render_series};
use polars::prelude::*;
use tracing::debug;

/// For each numeric column in order, drop rows holding a negative value.
///
/// Columns are checked one after another on the shrinking frame, so a row
/// removed for one column is not reported again for a later one.
pub(crate) fn remove_negative_values(
    frame: &mut WorkingFrame,
    report: &mut CleaningReport,
) -> Result<()> {
    for name in column_names(frame.df()) {
        let series = frame.series(&name)?;
        if get_dtype_category(series.dtype()) != DtypeCategory::Numeric {
            continue;
        }

        let floats = series.cast(&DataType::Float64)?;
        let drop: Vec<bool> = floats
            .f64()?
            .into_iter()
            .map(|v| v.is_some_and(|v| v < 0.0))
            .collect();
        if !drop.contains(&true) {
            debug!("No negative values in '{}'", name);
            continue;
        }

        let values = render_series(&series)?;
        frame.remove_rows(
            &drop,
            &values,
            Removal {
                rule: RemovalRule::NegativeValue,
                column: Some(name.as_str()),
                reason: format!("Negative values found in column '{}' and will be removed", name),
            },
            report,
        )?;
    }

    Ok(())
}
