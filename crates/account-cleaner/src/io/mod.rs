//! Reading input datasets and writing cleaned output.
//!
//! Workbooks (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) are read with calamine
//! and typed column by column; delimited text goes through the polars CSV
//! reader.

mod loader;
mod writer;

pub use loader::{CellValue, frame_from_rows, load_dataset};
pub use writer::write_csv;
