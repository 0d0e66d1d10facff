//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account and account number
//! - `customer`: Customer record
//! - `transaction`: Transaction records, history entries and summaries
//! - `money`: Amount validation and scale
//! - `operation`: Operation script records
//! - `error`: Error types for the ledger

pub mod account;
pub mod customer;
pub mod error;
pub mod money;
pub mod operation;
pub mod transaction;

pub use account::{Account, AccountId, AccountNumber};
pub use customer::{Customer, CustomerId};
pub use error::{ErrorKind, LedgerError, OperationError, StoreError};
pub use money::{validate_amount, MONEY_SCALE};
pub use operation::{OperationRecord, OperationType};
pub use transaction::{Summary, Transaction, TransactionEntry, TransactionId, TransactionKind};
