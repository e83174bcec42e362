//! Shared helpers for inspecting polars columns and values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Calendar dates or timestamps
    Temporal,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a float.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType stores a calendar date or timestamp.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Date | DataType::Datetime(_, _))
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_temporal_dtype(dtype) {
        DtypeCategory::Temporal
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Column names of a DataFrame as owned strings.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

// =============================================================================
// Temporal Utilities
// =============================================================================

/// Midnight at the start of `date`.
#[inline]
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

/// Convert a physical datetime value in the given unit to a naive UTC timestamp.
pub fn datetime_from_physical(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value)?,
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value)?,
        TimeUnit::Nanoseconds => DateTime::from_timestamp_nanos(value),
    };
    Some(dt.naive_utc())
}

/// Convert days since the unix epoch to a date.
pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    // 719_163 days separate 0001-01-01 (CE day 1) from 1970-01-01
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(719_163)?)
}

/// Read a Date or Datetime series as naive timestamps (nulls stay `None`).
pub fn temporal_values(series: &Series) -> PolarsResult<Vec<Option<NaiveDateTime>>> {
    match series.dtype() {
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(date_from_epoch_days).map(start_of_day))
                .collect())
        }
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let physical = series.cast(&DataType::Int64)?;
            Ok(physical
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|v| datetime_from_physical(v, unit)))
                .collect())
        }
        other => Err(PolarsError::ComputeError(
            format!("expected a date column, got {}", other).into(),
        )),
    }
}

/// Build a `Datetime(ms)` series from naive timestamps.
pub fn datetime_series(name: PlSmallStr, values: &[Option<NaiveDateTime>]) -> PolarsResult<Series> {
    let millis: Vec<Option<i64>> = values
        .iter()
        .map(|v| v.map(|dt| dt.and_utc().timestamp_millis()))
        .collect();
    Series::new(name, millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Render a timestamp as a date when it has no time of day.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == chrono::NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// =============================================================================
// Value Rendering
// =============================================================================

/// Render every value of a series as text, for reports and row keys.
///
/// Strings are rendered without quotes and temporal values as ISO dates so
/// the output matches what ends up in the written file.
pub fn render_series(series: &Series) -> PolarsResult<Vec<String>> {
    let dtype = series.dtype();

    if is_temporal_dtype(dtype) {
        return Ok(temporal_values(series)?
            .into_iter()
            .map(|v| v.map(|dt| format_datetime(&dt)).unwrap_or_else(|| "null".to_string()))
            .collect());
    }

    if matches!(dtype, DataType::String) {
        return Ok(series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string).unwrap_or_else(|| "null".to_string()))
            .collect());
    }

    let mut rendered = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let value = series.get(i)?;
        rendered.push(match value {
            AnyValue::Null => "null".to_string(),
            other => format!("{}", other),
        });
    }
    Ok(rendered)
}

/// Per-row missing flags: null anywhere, or NaN in a float column when `nan_is_missing`.
pub fn missing_mask(series: &Series, nan_is_missing: bool) -> PolarsResult<Vec<bool>> {
    let mut mask: Vec<bool> = series
        .is_null()
        .into_iter()
        .map(|v| v.unwrap_or(false))
        .collect();

    if nan_is_missing && is_float_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        for (flag, value) in mask.iter_mut().zip(floats.f64()?.into_iter()) {
            if value.is_some_and(f64::is_nan) {
                *flag = true;
            }
        }
    }

    Ok(mask)
}

// =============================================================================
// Tests
// =============================================================================
