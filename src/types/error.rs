//! Error types for the ledger engine
//!
//! Every failure the core can report is a [`LedgerError`]. Each variant falls
//! into one of four categories exposed through [`LedgerError::kind`], which
//! callers use to decide between a client-error response and an internal
//! failure.
//!
//! # Error Categories
//!
//! - **Validation**: non-positive or over-precise amounts, missing fields,
//!   malformed account numbers, arithmetic overflow
//! - **Not found**: unknown account number or customer id
//! - **Insufficient funds**: withdrawal larger than the current balance
//! - **Persistence**: the store could not complete the operation
//!
//! [`OperationError`] sits one level above and covers the operation script
//! replayed by the command-line driver.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Broad classification of a [`LedgerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied bad input; resubmitting corrected input succeeds
    Validation,
    /// Identifier was well-formed but does not resolve
    NotFound,
    /// Business-rule rejection of a withdrawal
    InsufficientFunds,
    /// Storage failure, surfaced as an internal error
    Persistence,
}

/// Main error type for ledger operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount is zero, negative, or has more than 2 decimal places
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Why it was rejected
        reason: String,
    },

    /// A required field was empty or absent
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// Account number does not follow the `BCCEHN` + 12 character format
    #[error("Invalid account number '{value}'")]
    InvalidAccountNumber {
        /// The rejected input
        value: String,
    },

    /// Applying the amount would overflow the decimal range
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account number
        account: String,
    },

    /// No account carries this account number
    #[error("Account {number} not found")]
    AccountNotFound {
        /// The unresolved account number
        number: String,
    },

    /// No customer has this id
    #[error("Customer {customer} not found")]
    CustomerNotFound {
        /// The unresolved customer id
        customer: Uuid,
    },

    /// Withdrawal exceeds the current balance
    ///
    /// The balance is left unchanged. Both figures are part of the message
    /// so callers can show it to the account holder as-is.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account number
        account: String,
        /// Balance at the time of the attempt
        balance: Decimal,
        /// Requested withdrawal amount
        requested: Decimal,
    },

    /// The store failed; nothing was committed
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

/// Errors raised by store implementations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Unique index on account numbers rejected an insert
    #[error("Account number {number} is already in use")]
    DuplicateAccountNumber {
        /// The colliding number
        number: String,
    },

    /// A record with this id already exists
    #[error("Duplicate {entity} record {id}")]
    DuplicateRecord {
        /// Record type
        entity: &'static str,
        /// Colliding id
        id: Uuid,
    },

    /// Compare-and-update found a different version than expected
    #[error("Version conflict on account {account}: expected {expected}, found {actual}")]
    VersionConflict {
        account: Uuid,
        expected: u64,
        actual: u64,
    },

    /// Update or transaction insert referenced an account the store does not hold
    #[error("Account {account} does not exist in the store")]
    MissingAccount { account: Uuid },

    /// Store could not be reached or is in an unusable state
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl LedgerError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount { .. }
            | LedgerError::MissingField { .. }
            | LedgerError::InvalidAccountNumber { .. }
            | LedgerError::ArithmeticOverflow { .. } => ErrorKind::Validation,
            LedgerError::AccountNotFound { .. } | LedgerError::CustomerNotFound { .. } => {
                ErrorKind::NotFound
            }
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, reason: &str) -> Self {
        LedgerError::InvalidAmount {
            amount,
            reason: reason.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: &str) -> Self {
        LedgerError::MissingField {
            field: field.to_string(),
        }
    }

    /// Create an InvalidAccountNumber error
    pub fn invalid_account_number(value: &str) -> Self {
        LedgerError::InvalidAccountNumber {
            value: value.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(number: &str) -> Self {
        LedgerError::AccountNotFound {
            number: number.to_string(),
        }
    }

    /// Create a CustomerNotFound error
    pub fn customer_not_found(customer: Uuid) -> Self {
        LedgerError::CustomerNotFound { customer }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: &str, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account: account.to_string(),
            balance,
            requested,
        }
    }
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }
}

/// Errors raised while replaying an operation script
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    /// Script referenced a customer label never registered
    #[error("Unknown customer '{label}'")]
    UnknownCustomer { label: String },

    /// Script referenced an account label never opened
    #[error("Unknown account '{label}'")]
    UnknownAccount { label: String },

    /// Script tried to bind a label twice
    #[error("Duplicate {entity} label '{label}'")]
    DuplicateLabel { entity: &'static str, label: String },

    /// The ledger rejected the operation
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::invalid_amount(
        LedgerError::invalid_amount(Decimal::new(-500, 2), "must be greater than zero"),
        "Invalid amount -5.00: must be greater than zero"
    )]
    #[case::missing_field(LedgerError::missing_field("name"), "Missing required field: name")]
    #[case::invalid_number(
        LedgerError::invalid_account_number("ABC"),
        "Invalid account number 'ABC'"
    )]
    #[case::account_not_found(
        LedgerError::account_not_found("BCCEHN000000000000"),
        "Account BCCEHN000000000000 not found"
    )]
    #[case::insufficient_funds(
        LedgerError::insufficient_funds("BCCEHN000000000001", Decimal::new(10000, 2), Decimal::new(50000, 2)),
        "Insufficient funds in account BCCEHN000000000001: balance 100.00, requested 500.00"
    )]
    #[case::overflow(
        LedgerError::arithmetic_overflow("deposit", "BCCEHN000000000001"),
        "Arithmetic overflow in deposit for account BCCEHN000000000001"
    )]
    #[case::persistence(
        LedgerError::from(StoreError::unavailable("disk full")),
        "Persistence failure: Store unavailable: disk full"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::invalid_amount(LedgerError::invalid_amount(Decimal::ZERO, "zero"), ErrorKind::Validation)]
    #[case::missing_field(LedgerError::missing_field("name"), ErrorKind::Validation)]
    #[case::invalid_number(LedgerError::invalid_account_number("x"), ErrorKind::Validation)]
    #[case::overflow(LedgerError::arithmetic_overflow("deposit", "x"), ErrorKind::Validation)]
    #[case::account_not_found(LedgerError::account_not_found("x"), ErrorKind::NotFound)]
    #[case::customer_not_found(LedgerError::customer_not_found(Uuid::nil()), ErrorKind::NotFound)]
    #[case::insufficient(
        LedgerError::insufficient_funds("x", Decimal::ONE, Decimal::new(2, 0)),
        ErrorKind::InsufficientFunds
    )]
    #[case::persistence(
        LedgerError::Persistence(StoreError::MissingAccount { account: Uuid::nil() }),
        ErrorKind::Persistence
    )]
    fn test_error_kind(#[case] error: LedgerError, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[test]
    fn test_operation_error_wraps_ledger_message() {
        let error: OperationError = LedgerError::account_not_found("BCCEHN000000000000").into();
        assert_eq!(error.to_string(), "Account BCCEHN000000000000 not found");
    }
}
