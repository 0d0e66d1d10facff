//! JSON report output
//!
//! Unlike the CSV report, the JSON report carries each account's generated
//! number and its full chronological ledger.

use crate::core::AccountReport;
use std::io::Write;

/// Write account reports as a pretty-printed JSON array
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if serialization or a write failed
pub fn write_reports_json(reports: &[AccountReport], output: &mut dyn Write) -> Result<(), String> {
    let mut sorted: Vec<&AccountReport> = reports.iter().collect();
    sorted.sort_by(|a, b| a.account.cmp(&b.account));

    serde_json::to_writer_pretty(&mut *output, &sorted)
        .map_err(|e| format!("Failed to write JSON report: {}", e))?;
    writeln!(output).map_err(|e| format!("Failed to write JSON report: {}", e))?;
    output
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))
}
