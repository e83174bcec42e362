//! CLI entry point for the account dataset cleaner.

use account_cleaner::config::input_stem;
use account_cleaner::{
    CleaningError, DataCleaner, JobConfig, ReportWriter, load_dataset, preview, render, write_csv,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{debug, info};

/// Rows shown in the preview after cleaning.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean spreadsheets of account records",
    long_about = "Removes incomplete rows, duplicate and conflicting account records, \
                  negative amounts and invalid dates, then writes the cleaned data as CSV.\n\n\
                  EXAMPLES:\n  \
                  # Clean the first sheet of a workbook\n  \
                  account-cleaner -i accounts.xlsx\n\n  \
                  # Pick a sheet, an extra account alias and an output file\n  \
                  account-cleaner -i accounts.xlsx --sheet 2023 -a customer_no -o out/clean.csv\n\n  \
                  # Run a saved job and print the report as JSON\n  \
                  account-cleaner --config job.json --json | jq .rows_removed"
)]
struct Args {
    /// Path to the workbook or CSV file to clean
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV path
    ///
    /// Defaults to <input_name>_cleaned.csv next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worksheet to read (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Account column alias, case-insensitive (repeatable)
    ///
    /// Replaces the default alias list when given
    #[arg(short = 'a', long = "account-alias")]
    account_aliases: Vec<String>,

    /// JSON job file; other flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Earliest valid date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_min_date)]
    min_date: Option<NaiveDate>,

    /// Read ambiguous dates such as 03/04/2023 as day-first
    #[arg(long)]
    day_first: bool,

    /// Substring marking text columns to parse as dates
    #[arg(long)]
    date_marker: Option<String>,

    /// Output field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the cleaning report.
    #[arg(long)]
    json: bool,

    /// Write the cleaning report as JSON next to the output file
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_min_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Merge the job file (if any) with command-line overrides.
fn build_job(args: &Args) -> Result<JobConfig> {
    let mut job = match (&args.config, &args.input) {
        (Some(path), _) => {
            debug!("Reading job file: {}", path.display());
            JobConfig::from_json_file(path)?
        }
        (None, Some(input)) => JobConfig::new(input.clone()),
        (None, None) => return Err(anyhow!("An input file is required (--input or --config)")),
    };

    if let Some(ref input) = args.input {
        job.input_path = input.clone();
    }
    if let Some(ref output) = args.output {
        job.output_path = Some(output.clone());
    }
    if let Some(ref sheet) = args.sheet {
        job.sheet = Some(sheet.clone());
    }
    if let Some(delimiter) = args.delimiter {
        job.delimiter = delimiter;
    }

    let cleaner = &mut job.cleaner;
    if !args.account_aliases.is_empty() {
        cleaner.account_aliases = args
            .account_aliases
            .iter()
            .map(|a| a.trim().to_lowercase())
            .collect();
    }
    if let Some(min_date) = args.min_date {
        cleaner.min_date = min_date;
    }
    if args.day_first {
        cleaner.day_first = true;
    }
    if let Some(ref marker) = args.date_marker {
        cleaner.date_column_marker = marker.clone();
    }

    job.validate()?;
    Ok(job)
}

fn run(args: &Args) -> Result<()> {
    let job = build_job(args)?;

    let data = load_dataset(&job.input_path, job.sheet.as_deref())?;

    let cleaner = DataCleaner::new(job.cleaner.clone());
    let mut result = cleaner.clean(&data)?;

    let output_path = job.resolved_output_path();
    write_csv(&mut result.data, &output_path, job.delimiter_byte())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
        return Ok(());
    }

    if args.emit_report {
        let report_dir = output_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let writer = ReportWriter::new(report_dir);
        let report_path = writer.write_json(&result.report, &input_stem(&job.input_path))?;
        info!("Report written to: {}", report_path.display());
    }

    // Console output is the purpose of the default mode, so it bypasses logging
    print!("{}", render(&result.report));
    println!();
    println!("Cleaned data written to {}", output_path.display());
    println!("{}", preview(&result.data, PREVIEW_ROWS));

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load .env before logging so RUST_LOG can be set there
    dotenv().ok();

    // Initialize logging (disabled if --json is set)
    init_logging(&args.log_level, args.quiet, args.json);

    match run(&args) {
        Ok(()) => Ok(()),
        Err(err) if args.json => {
            // Keep stdout machine-readable on failure too
            match err.downcast_ref::<CleaningError>() {
                Some(cleaning) => println!("{}", serde_json::to_string_pretty(cleaning)?),
                None => println!(
                    "{}",
                    serde_json::json!({ "code": "ERROR", "message": err.to_string() })
                ),
            }
            std::process::exit(1);
        }
        Err(err) => Err(err),
    }
}
