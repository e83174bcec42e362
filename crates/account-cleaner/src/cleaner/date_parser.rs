//! Best-effort parsing of human-written dates.
//!
//! Accepts ISO 8601 / RFC 3339, RFC 2822, numeric dates in any of the
//! common orders, compact `YYYYMMDD` and dates spelled with month names,
//! each optionally followed by a time of day. Offset-aware values are
//! converted to naive UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun)\b\.?",
    )
    .expect("Invalid regex: weekday")
});

static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("Invalid regex: ordinal"));

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})[-/.](\d{1,2})[-/.](\d{1,4})$").expect("Invalid regex: numeric date")
});

static TRAILING_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)[ T](\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)(?:\s*([ap]\.?m\.?))?$")
        .expect("Invalid regex: trailing time")
});

/// Naive timestamp layouts tried before the structured fallback.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset-aware layouts not covered by RFC 3339.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a date or timestamp written in any supported layout.
///
/// Ambiguous numeric dates like `03/04/2023` are month-first unless
/// `day_first` is set; when the preferred order is impossible (`13/04/2023`)
/// the other order is used.
pub fn parse_lenient(value: &str, day_first: bool) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    let normalized = normalize(trimmed);
    if normalized.is_empty() {
        return None;
    }

    let (date_part, time) = match TRAILING_TIME.captures(&normalized) {
        Some(caps) => {
            let time = parse_time(&caps[2], caps.get(3).map(|m| m.as_str()))?;
            (caps[1].trim().to_string(), time)
        }
        None => (normalized.clone(), NaiveTime::MIN),
    };

    parse_date(&date_part, day_first).map(|date| date.and_time(time))
}

/// Strip weekday names, ordinal suffixes and commas, collapse whitespace.
fn normalize(value: &str) -> String {
    let without_weekday = WEEKDAY.replace_all(value, " ");
    let without_ordinals = ORDINAL.replace_all(&without_weekday, "$1");
    without_ordinals
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_time(clock: &str, meridiem: Option<&str>) -> Option<NaiveTime> {
    let time = NaiveTime::parse_from_str(clock, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .ok()?;

    let Some(meridiem) = meridiem else {
        return Some(time);
    };

    let hour = time.hour();
    if hour == 0 || hour > 12 {
        return None;
    }
    let pm = meridiem.to_ascii_lowercase().starts_with('p');
    let hour24 = match (pm, hour) {
        (false, 12) => 0,
        (false, h) => h,
        (true, 12) => 12,
        (true, h) => h + 12,
    };
    time.with_hour(hour24)
}

fn parse_date(value: &str, day_first: bool) -> Option<NaiveDate> {
    if let Some(caps) = NUMERIC_DATE.captures(value) {
        return parse_numeric_date(&caps[1], &caps[2], &caps[3], day_first);
    }

    if value.len() == 8 && value.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }

    parse_named_month(value)
}

fn parse_numeric_date(a: &str, b: &str, c: &str, day_first: bool) -> Option<NaiveDate> {
    let (x, y, z): (u32, u32, u32) = (a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);

    // 2023-04-05, year first
    if a.len() == 4 {
        return NaiveDate::from_ymd_opt(x as i32, y, z);
    }

    if c.len() != 4 && c.len() != 2 {
        return None;
    }
    let year = expand_year(z, c.len());

    let (first, second) = if day_first { (y, x) } else { (x, y) };
    NaiveDate::from_ymd_opt(year, first, second)
        .or_else(|| NaiveDate::from_ymd_opt(year, second, first))
}

/// Two-digit years follow the POSIX `%y` pivot: 69-99 -> 19xx, 00-68 -> 20xx.
fn expand_year(year: u32, digits: usize) -> i32 {
    let year = year as i32;
    if digits == 2 {
        if year >= 69 { 1900 + year } else { 2000 + year }
    } else {
        year
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.trim_end_matches('.').to_ascii_lowercase();
    if lower.len() < 3 || !lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let full_names = [
        "january", "february", "march", "april", "may", "june", "july", "august",
        "september", "october", "november", "december",
    ];
    MONTHS
        .iter()
        .zip(full_names.iter())
        .position(|(abbr, full)| lower.starts_with(abbr) && full.starts_with(lower.as_str()))
        .map(|idx| idx as u32 + 1)
}

/// `Jan 5 2023`, `5 January 2023`, `2023 Jan 5`, `January 2023`, `5-Jan-23`.
fn parse_named_month(value: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = value
        .split(|c: char| c.is_whitespace() || c == '-' || c == '/' || c == '.')
        .filter(|t| !t.is_empty())
        .collect();

    let mut month = None;
    let mut numbers: Vec<&str> = Vec::new();
    for token in &tokens {
        if let Some(m) = month_from_name(token) {
            if month.replace(m).is_some() {
                return None;
            }
        } else if token.chars().all(|c| c.is_ascii_digit()) {
            numbers.push(*token);
        } else {
            return None;
        }
    }
    let month = month?;

    match numbers.as_slice() {
        [year] if year.len() == 4 => NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1),
        [first, second] => {
            let (day, year) = if first.len() == 4 || first.parse::<u32>().ok()? > 31 {
                (second, first)
            } else {
                (first, second)
            };
            if day.len() > 2 {
                return None;
            }
            let year = expand_year(year.parse().ok()?, year.len());
            NaiveDate::from_ymd_opt(year, month, day.parse().ok()?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_lenient("2023-01-01", false), Some(date(2023, 1, 1)));
        assert_eq!(parse_lenient("1899-12-31", false), Some(date(1899, 12, 31)));
        assert_eq!(parse_lenient("2023/1/5", false), Some(date(2023, 1, 5)));
        assert_eq!(
            parse_lenient("2023-01-05 14:30:00", false),
            Some(datetime(2023, 1, 5, 14, 30, 0))
        );
        assert_eq!(
            parse_lenient("2023-01-05T14:30", false),
            Some(datetime(2023, 1, 5, 14, 30, 0))
        );
    }

    #[test]
    fn test_offset_aware_converted_to_utc() {
        assert_eq!(
            parse_lenient("2023-01-05T14:30:00+02:00", false),
            Some(datetime(2023, 1, 5, 12, 30, 0))
        );
        assert_eq!(
            parse_lenient("Thu, 05 Jan 2023 14:30:00 +0000", false),
            Some(datetime(2023, 1, 5, 14, 30, 0))
        );
    }

    #[test]
    fn test_numeric_month_first_by_default() {
        assert_eq!(parse_lenient("03/04/2023", false), Some(date(2023, 3, 4)));
        assert_eq!(parse_lenient("03/04/2023", true), Some(date(2023, 4, 3)));
    }

    #[test]
    fn test_numeric_swaps_impossible_order() {
        assert_eq!(parse_lenient("13/04/2023", false), Some(date(2023, 4, 13)));
        assert_eq!(parse_lenient("04/13/2023", true), Some(date(2023, 4, 13)));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(parse_lenient("1/2/23", false), Some(date(2023, 1, 2)));
        assert_eq!(parse_lenient("1.2.99", true), Some(date(1999, 2, 1)));
    }

    #[test]
    fn test_compact_date() {
        assert_eq!(parse_lenient("20230209", false), Some(date(2023, 2, 9)));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_lenient("Jan 5, 2023", false), Some(date(2023, 1, 5)));
        assert_eq!(parse_lenient("5 January 2023", false), Some(date(2023, 1, 5)));
        assert_eq!(parse_lenient("2023 Sept 5", false), Some(date(2023, 9, 5)));
        assert_eq!(parse_lenient("09-Feb-23", false), Some(date(2023, 2, 9)));
        assert_eq!(parse_lenient("March 2023", false), Some(date(2023, 3, 1)));
        assert_eq!(
            parse_lenient("Thursday, February 9th, 2023", false),
            Some(date(2023, 2, 9))
        );
    }

    #[test]
    fn test_month_name_with_time() {
        assert_eq!(
            parse_lenient("Feb 9 2023 3:15 PM", false),
            Some(datetime(2023, 2, 9, 15, 15, 0))
        );
        assert_eq!(
            parse_lenient("02/09/2023 12:05 am", false),
            Some(datetime(2023, 2, 9, 0, 5, 0))
        );
    }

    #[test]
    fn test_rejects_garbage() {
        for value in ["N/A", "", "   ", "tomorrow", "2023-02-30", "13/13/2023", "Jan", "10:30"] {
            assert_eq!(parse_lenient(value, false), None, "{value:?} should not parse");
        }
    }

    #[test]
    fn test_month_from_name() {
        assert_eq!(month_from_name("Sept"), Some(9));
        assert_eq!(month_from_name("DECEMBER"), Some(12));
        assert_eq!(month_from_name("dec."), Some(12));
        assert_eq!(month_from_name("ma"), None);
        assert_eq!(month_from_name("marchx"), None);
    }
}
