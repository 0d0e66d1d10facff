//! CSV format handling for operation scripts and account reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to operation records
//! - Account report serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::core::AccountReport;
use crate::types::{OperationRecord, OperationType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the script format with columns: op, customer, account, amount.
/// Every column except `op` is optional; which ones are required depends on
/// the operation.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub customer: Option<String>,
    pub account: Option<String>,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to an OperationRecord
///
/// This function:
/// - Parses the operation name (case-insensitive; `withdrawal` is accepted
///   as an alias of `withdraw`)
/// - Treats blank fields as absent
/// - Parses the amount into a Decimal (if present)
/// - Checks that the fields the operation needs are present
///
/// Amount rules (sign, precision) are left to the ledger.
///
/// # Returns
///
/// * `Ok(OperationRecord)` - Successfully converted record
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, String> {
    let op = match csv_record.op.trim().to_lowercase().as_str() {
        "customer" => OperationType::Customer,
        "open" => OperationType::Open,
        "deposit" => OperationType::Deposit,
        "withdraw" | "withdrawal" => OperationType::Withdraw,
        _ => return Err(format!("Invalid operation type: '{}'", csv_record.op)),
    };

    let customer = non_blank(csv_record.customer);
    let account = non_blank(csv_record.account);

    let amount = match non_blank(csv_record.amount) {
        Some(amount_str) => match Decimal::from_str(&amount_str) {
            Ok(decimal) => Some(decimal),
            Err(_) => return Err(format!("Invalid amount '{}'", amount_str)),
        },
        None => None,
    };

    let missing = match op {
        OperationType::Customer if customer.is_none() => Some("a customer"),
        OperationType::Open if customer.is_none() => Some("a customer"),
        OperationType::Open if account.is_none() => Some("an account"),
        OperationType::Deposit | OperationType::Withdraw if account.is_none() => {
            Some("an account")
        }
        OperationType::Deposit | OperationType::Withdraw if amount.is_none() => {
            Some("an amount")
        }
        _ => None,
    };
    if let Some(field) = missing {
        return Err(format!("{:?} operation requires {}", op, field));
    }

    Ok(OperationRecord {
        op,
        customer,
        account,
        amount,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Write account reports to CSV format
///
/// Writes one row per account with columns:
/// account, customer, deposits, withdrawals, balance, transactions.
/// Rows are sorted by account label; amounts carry 2 decimal places.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_reports_csv(reports: &[AccountReport], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "account",
            "customer",
            "deposits",
            "withdrawals",
            "balance",
            "transactions",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted: Vec<&AccountReport> = reports.iter().collect();
    sorted.sort_by(|a, b| a.account.cmp(&b.account));

    for report in sorted {
        writer
            .write_record(&[
                report.account.clone(),
                report.customer.clone(),
                format!("{:.2}", report.summary.total_deposits),
                format!("{:.2}", report.summary.total_withdrawals),
                format!("{:.2}", report.summary.final_balance),
                report.summary.transactions.len().to_string(),
            ])
            .map_err(|e| format!("Failed to write account report: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
