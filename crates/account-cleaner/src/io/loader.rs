//! Dataset loading from spreadsheets and delimited text files.

use crate::cleaner::parse_lenient;
use crate::error::{CleaningError, Result, ResultExt};
use crate::utils::{datetime_series, format_datetime};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extensions read through calamine.
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Rows sampled by polars when inferring CSV column types.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a dataset, choosing the reader from the file extension.
///
/// Workbooks read `sheet` when given and the first worksheet otherwise;
/// the first row is always the header.
pub fn load_dataset(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CleaningError::InputNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    info!("Loading dataset from: {}", path.display());
    let df = match extension.as_str() {
        ext if SPREADSHEET_EXTENSIONS.contains(&ext) => load_workbook(path, sheet)?,
        "csv" | "txt" => load_csv_with_fallbacks(path, b',')?,
        "tsv" => load_csv_with_fallbacks(path, b'\t')?,
        _ => {
            return Err(CleaningError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            });
        }
    };

    info!("Dataset loaded successfully: {:?}", df.shape());
    Ok(df)
}

// =============================================================================
// Spreadsheets
// =============================================================================

/// A spreadsheet cell reduced to the kinds of value a column can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Bool(v) => Some(v.to_string()),
            Self::DateTime(v) => Some(format_datetime(v)),
            Self::Text(v) => Some(v.clone()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => Self::Null,
            Data::Int(v) => Self::Int(*v),
            Data::Float(v) => Self::Float(*v),
            Data::Bool(v) => Self::Bool(*v),
            Data::String(s) if s.trim().is_empty() => Self::Null,
            Data::String(s) => Self::Text(s.clone()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(v) => Self::DateTime(v),
                None => Self::Text(cell.to_string()),
            },
            Data::DateTimeIso(s) => match parse_lenient(s, false) {
                Some(v) => Self::DateTime(v),
                None => Self::Text(s.clone()),
            },
            Data::DurationIso(s) => Self::Text(s.clone()),
        }
    }
}

fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let available = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) if available.iter().any(|s| s == name) => name.to_string(),
        Some(name) => {
            return Err(CleaningError::SheetNotFound {
                sheet: name.to_string(),
                available,
            });
        }
        None => available
            .first()
            .cloned()
            .ok_or_else(|| CleaningError::EmptyWorkbook(path.to_path_buf()))?,
    };

    debug!("Reading worksheet '{}'", sheet_name);
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(CleaningError::from)
        .context(format!("Failed to read sheet '{}'", sheet_name))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| CleaningError::EmptyWorkbook(path.to_path_buf()))?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| CellValue::from(cell).render().unwrap_or_default())
        .collect();

    let body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();

    frame_from_rows(headers, body)
}

/// Give blank headers a positional name and suffix repeated ones.
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let base = match raw.trim() {
                "" => format!("column_{}", i + 1),
                name => name.to_string(),
            };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

fn is_integral(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64
}

/// Build one column from its cells, inferring the narrowest fitting dtype.
///
/// Whole-number floats count as integers since workbooks store every number
/// as a float. A column mixing kinds falls back to text.
fn build_column(name: &str, cells: &[CellValue]) -> PolarsResult<Series> {
    let present = || cells.iter().filter(|c| **c != CellValue::Null);
    let name: PlSmallStr = name.into();

    if present().next().is_none() {
        return Ok(Series::full_null(name, cells.len(), &DataType::String));
    }

    if present().all(|c| match c {
        CellValue::Int(_) => true,
        CellValue::Float(v) => is_integral(*v),
        _ => false,
    }) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                CellValue::Int(v) => Some(*v),
                CellValue::Float(v) => Some(*v as i64),
                _ => None,
            })
            .collect();
        return Ok(Series::new(name, values));
    }

    if present().all(|c| matches!(c, CellValue::Int(_) | CellValue::Float(_))) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                CellValue::Int(v) => Some(*v as f64),
                CellValue::Float(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Ok(Series::new(name, values));
    }

    if present().all(|c| matches!(c, CellValue::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                CellValue::Bool(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Ok(Series::new(name, values));
    }

    if present().all(|c| matches!(c, CellValue::DateTime(_))) {
        let values: Vec<Option<NaiveDateTime>> = cells
            .iter()
            .map(|c| match c {
                CellValue::DateTime(v) => Some(*v),
                _ => None,
            })
            .collect();
        return datetime_series(name, &values);
    }

    let values: Vec<Option<String>> = cells.iter().map(CellValue::render).collect();
    Ok(Series::new(name, values))
}

/// Assemble a DataFrame from a header row and body rows of cells.
///
/// Short rows are padded with nulls; cells beyond the header are dropped.
pub fn frame_from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<DataFrame> {
    let headers = unique_headers(headers);
    let mut columns = Vec::with_capacity(headers.len());

    for (index, name) in headers.iter().enumerate() {
        let cells: Vec<CellValue> = rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or(CellValue::Null))
            .collect();
        let series = build_column(name, &cells)
            .context(format!("Failed to build column '{}'", name))?;
        columns.push(series.into_column());
    }

    Ok(DataFrame::new(columns)?)
}

// =============================================================================
// Delimited text
// =============================================================================

/// Load a delimited file with multiple fallback strategies.
fn load_csv_with_fallbacks(path: &Path, separator: u8) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"')),
        )
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(None),
        )
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: Pre-clean content
    let content = std::fs::read_to_string(path)
        .context(format!("Could not read {}", path.display()))?;
    let cursor = Cursor::new(clean_csv_content(&content));

    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .into_reader_with_file_handle(cursor)
        .finish()
        .context(format!("Failed to parse {}", path.display()))
}

/// Collapse tripled quotes and drop blank lines.
///
/// Doubled quotes are left alone: they are either an escaped quote or an
/// empty quoted field.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_unique_headers() {
        let headers = vec![
            "acct".to_string(),
            " ".to_string(),
            "acct".to_string(),
            "amt".to_string(),
        ];
        assert_eq!(
            unique_headers(headers),
            vec!["acct", "column_2", "acct_1", "amt"]
        );
    }

    #[test]
    fn test_dtype_inference() {
        let opened = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let headers = ["ints", "floats", "flags", "opened", "mixed", "empty"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec![
                CellValue::Float(1.0),
                CellValue::Int(1),
                CellValue::Bool(true),
                CellValue::DateTime(opened),
                CellValue::Int(7),
                CellValue::Null,
            ],
            vec![
                CellValue::Int(2),
                CellValue::Float(2.5),
                CellValue::Null,
                CellValue::Null,
                text("seven"),
            ],
        ];

        let df = frame_from_rows(headers, rows).unwrap();

        let dtypes: Vec<DataType> = df.dtypes();
        assert_eq!(
            dtypes,
            vec![
                DataType::Int64,
                DataType::Float64,
                DataType::Boolean,
                DataType::Datetime(TimeUnit::Milliseconds, None),
                DataType::String,
                DataType::String,
            ]
        );
        assert_eq!(df.column("empty").unwrap().null_count(), 2);
        assert_eq!(df.column("flags").unwrap().null_count(), 1);
    }

    #[test]
    fn test_calamine_cells_convert() {
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Null);
        assert_eq!(CellValue::from(&Data::String("  ".to_string())), CellValue::Null);
        assert_eq!(CellValue::from(&Data::Int(4)), CellValue::Int(4));
        assert_eq!(
            CellValue::from(&Data::DateTimeIso("2023-02-01".to_string())),
            CellValue::DateTime(
                NaiveDate::from_ymd_opt(2023, 2, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "acct_no,amount,open_date").unwrap();
        writeln!(file, "A1,10.5,2023-01-01").unwrap();
        writeln!(file, "A2,-3,N/A").unwrap();
        drop(file);

        let df = load_dataset(&path, None).unwrap();

        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("amount").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_load_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.tsv");
        std::fs::write(&path, "acct_no\tamount\nA1\t1\nA2\t2\n").unwrap();

        let df = load_dataset(&path, None).unwrap();

        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("amount").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_missing_input() {
        let err = load_dataset("does/not/exist.xlsx", None).unwrap_err();
        assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(&path, "{}").unwrap();

        let err = load_dataset(&path, None).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_clean_csv_content() {
        assert_eq!(
            clean_csv_content("a,b\n\n\"\"\"x\"\"\",1\n"),
            "a,b\n\"x\",1"
        );
    }

    #[test]
    fn test_clean_csv_content_keeps_empty_quoted_fields() {
        assert_eq!(
            clean_csv_content("a,b,c\n\"\",1,\"say \"\"hi\"\" now\"\n"),
            "a,b,c\n\"\",1,\"say \"\"hi\"\" now\""
        );
    }
}
