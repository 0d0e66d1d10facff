//! Operation script records
//!
//! The command-line driver replays a CSV script of operations against the
//! ledger. Account numbers are generated on opening, so the script refers to
//! customers and accounts through local labels.

use rust_decimal::Decimal;

/// Operation types accepted in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// Register a customer under a label
    Customer,
    /// Open an account for a labelled customer and bind the account label
    Open,
    Deposit,
    Withdraw,
}

/// One parsed script row
///
/// Fields required by the operation type are guaranteed present once a row
/// has been converted; other fields are carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub op: OperationType,

    /// Customer label (customer, open)
    pub customer: Option<String>,

    /// Account label (open, deposit, withdraw)
    pub account: Option<String>,

    /// Amount (deposit, withdraw), not yet validated against ledger rules
    pub amount: Option<Decimal>,
}

impl OperationRecord {
    /// Label used to route this record to a sequential partition
    ///
    /// Customer registrations have no account label and act as barriers in
    /// the batch processor.
    pub fn partition_key(&self) -> Option<&str> {
        match self.op {
            OperationType::Customer => None,
            _ => self.account.as_deref(),
        }
    }
}
