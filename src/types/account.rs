//! Account-related types for the ledger engine
//!
//! This module defines the Account structure and the human-facing
//! account number used by every ledger operation as the lookup key.

use super::customer::CustomerId;
use super::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Internal account identifier
pub type AccountId = Uuid;

/// Fixed prefix shared by every account number
pub const ACCOUNT_NUMBER_PREFIX: &str = "BCCEHN";

/// Number of characters following the prefix
pub const ACCOUNT_NUMBER_SUFFIX_LEN: usize = 12;

/// Human-readable unique account number
///
/// Always `BCCEHN` followed by 12 uppercase alphanumeric characters.
/// Construct one with [`AccountNumber::generate`] or by parsing a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Generate a candidate account number from a random UUID token
    ///
    /// Uniqueness is not guaranteed by construction; the store's unique
    /// index is the backstop and provisioning retries on collision.
    pub fn generate() -> Self {
        Self::from_token(Uuid::new_v4())
    }

    /// Derive an account number from the first 12 hex digits of a token
    pub fn from_token(token: Uuid) -> Self {
        let simple = token.simple().to_string();
        let suffix = simple[..ACCOUNT_NUMBER_SUFFIX_LEN].to_ascii_uppercase();
        AccountNumber(format!("{ACCOUNT_NUMBER_PREFIX}{suffix}"))
    }

    /// Borrow the account number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(value: &str) -> bool {
        value.len() == ACCOUNT_NUMBER_PREFIX.len() + ACCOUNT_NUMBER_SUFFIX_LEN
            && value.starts_with(ACCOUNT_NUMBER_PREFIX)
            && value[ACCOUNT_NUMBER_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    }
}

impl FromStr for AccountNumber {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if Self::is_well_formed(value) {
            Ok(AccountNumber(value.to_string()))
        } else {
            Err(LedgerError::invalid_account_number(value))
        }
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customer account state
///
/// The balance is only ever changed by applying a transaction through the
/// ledger engine; `version` counts those applications and doubles as the
/// compare-and-update token checked by the store on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Internal identifier
    pub id: AccountId,

    /// Unique human-facing account number
    pub number: AccountNumber,

    /// Owning customer
    pub customer_id: CustomerId,

    /// Current balance, never negative, scale 2
    pub balance: Decimal,

    /// Number of transactions applied so far
    pub version: u64,

    pub created_at: DateTime<Utc>,

    /// Time of the most recent transaction (or creation)
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `number` - The generated account number
    /// * `customer_id` - The owning customer, already checked to exist
    pub fn open(number: AccountNumber, customer_id: CustomerId) -> Self {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            number,
            customer_id,
            balance: Decimal::new(0, 2),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
