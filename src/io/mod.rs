//! I/O module
//!
//! Handles operation script parsing and report output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, CSV report)
//! - `json_format` - JSON report
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod json_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{convert_csv_record, write_reports_csv, CsvRecord};
pub use json_format::write_reports_json;
pub use sync_reader::SyncReader;

use crate::core::AccountReport;
use clap::ValueEnum;
use std::io::Write;

/// Report formats written by the command-line driver
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One summary row per account
    #[default]
    Csv,
    /// Full summaries including account numbers and ledgers
    Json,
}

/// Write account reports in the requested format
pub fn write_reports(
    reports: &[AccountReport],
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), String> {
    match format {
        OutputFormat::Csv => write_reports_csv(reports, output),
        OutputFormat::Json => write_reports_json(reports, output),
    }
}
