//! Validation of date columns and parsing of free-text date columns.

use super::date_parser::parse_lenient;
use super::{Removal, WorkingFrame};
use crate::config::CleanerConfig;
use crate::error::Result;
use crate::types::{CleaningReport, RemovalRule};
use crate::utils::{
    DtypeCategory, column_names, datetime_series, format_datetime, get_dtype_category,
    start_of_day, temporal_values,
};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

fn render_temporal(value: &Option<NaiveDateTime>) -> String {
    value
        .as_ref()
        .map(format_datetime)
        .unwrap_or_else(|| "null".to_string())
}

fn invalid_date_reason(column: &str) -> String {
    format!("Invalid dates found in column '{}' and will be removed", column)
}

/// Drop rows whose Date/Datetime value is null or earlier than `min_date`.
pub(crate) fn remove_invalid_dates(
    frame: &mut WorkingFrame,
    min_date: NaiveDate,
    report: &mut CleaningReport,
) -> Result<()> {
    let threshold = start_of_day(min_date);

    for name in column_names(frame.df()) {
        let series = frame.series(&name)?;
        if get_dtype_category(series.dtype()) != DtypeCategory::Temporal {
            continue;
        }

        let values = temporal_values(&series)?;
        let drop: Vec<bool> = values
            .iter()
            .map(|v| v.is_none_or(|dt| dt < threshold))
            .collect();
        let rendered: Vec<String> = values.iter().map(render_temporal).collect();

        frame.remove_rows(
            &drop,
            &rendered,
            Removal {
                rule: RemovalRule::InvalidDate,
                column: Some(name.as_str()),
                reason: invalid_date_reason(&name),
            },
            report,
        )?;
    }

    Ok(())
}

/// Convert text columns named like dates into `Datetime` columns.
///
/// Each value is parsed on its own; rows whose value cannot be read are
/// removed, as are rows whose parsed date falls before the configured
/// minimum.
pub(crate) fn parse_text_date_columns(
    frame: &mut WorkingFrame,
    config: &CleanerConfig,
    report: &mut CleaningReport,
) -> Result<()> {
    let threshold = start_of_day(config.min_date);

    for name in column_names(frame.df()) {
        let series = frame.series(&name)?;
        if get_dtype_category(series.dtype()) != DtypeCategory::String
            || !config.is_date_named(&name)
        {
            continue;
        }

        debug!("Parsing text dates in '{}'", name);
        let raw: Vec<String> = series
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or("null").to_string())
            .collect();
        let parsed: Vec<Option<NaiveDateTime>> = series
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| parse_lenient(s, config.day_first)))
            .collect();

        let unparseable: Vec<bool> = parsed.iter().map(Option::is_none).collect();
        frame.remove_rows(
            &unparseable,
            &raw,
            Removal {
                rule: RemovalRule::UnparseableDate,
                column: Some(name.as_str()),
                reason: format!(
                    "Unparseable dates found in column '{}' and will be removed",
                    name
                ),
            },
            report,
        )?;

        let kept: Vec<Option<NaiveDateTime>> = parsed.into_iter().filter(Option::is_some).collect();
        frame.replace_column(&name, datetime_series(name.as_str().into(), &kept)?)?;
        report.parsed_date_columns.push(name.clone());

        let too_early: Vec<bool> = kept
            .iter()
            .map(|v| v.is_some_and(|dt| dt < threshold))
            .collect();
        let rendered: Vec<String> = kept.iter().map(render_temporal).collect();
        frame.remove_rows(
            &too_early,
            &rendered,
            Removal {
                rule: RemovalRule::InvalidDate,
                column: Some(name.as_str()),
                reason: invalid_date_reason(&name),
            },
            report,
        )?;
    }

    Ok(())
}
