//! Report output.
//!
//! A [`CleaningReport`](crate::types::CleaningReport) can be rendered as
//! console text with [`render`], printed as JSON (`--json`), or written
//! next to the cleaned file with [`ReportWriter`] (`--emit-report`).
//!
//! # Example
//!
//! ```rust,ignore
//! use account_cleaner::reporting::{render, ReportWriter};
//!
//! print!("{}", render(&result.report));
//!
//! let writer = ReportWriter::new("output");
//! writer.write_json(&result.report, "accounts")?;
//! ```

mod console;
mod writer;

pub use console::{preview, render};
pub use writer::ReportWriter;
