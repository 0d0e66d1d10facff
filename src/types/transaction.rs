//! Transaction-related types for the ledger engine
//!
//! This module defines the immutable transaction record appended to an
//! account's log, plus the presentation entry returned by history and
//! summary queries.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction identifier
pub type TransactionId = Uuid;

/// Transaction kinds supported by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Credit funds to an account
    Deposit,

    /// Debit funds from an account
    ///
    /// Bounded by the current balance.
    Withdrawal,
}

impl TransactionKind {
    /// Human-readable label shown next to each history entry
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
        }
    }

    /// Signed effect of an amount of this kind on the balance
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Deposit => amount,
            TransactionKind::Withdrawal => -amount,
        }
    }
}

/// Applied transaction
///
/// Created exactly once when a deposit or withdrawal is applied and never
/// mutated afterwards. `resulting_balance` is the account balance right
/// after this transaction, kept for auditability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    /// The account this transaction belongs to
    pub account_id: AccountId,

    pub kind: TransactionKind,

    /// Strictly positive amount, scale 2
    pub amount: Decimal,

    /// Apply time (UTC); never earlier than the previous transaction's
    pub timestamp: DateTime<Utc>,

    /// 1-based position within the account's log
    ///
    /// Breaks ties between transactions sharing a timestamp.
    pub sequence: u64,

    /// Account balance immediately after this transaction
    pub resulting_balance: Decimal,
}

impl Transaction {
    /// Ordering key used by summaries (oldest first)
    pub fn chronological_key(&self) -> (DateTime<Utc>, u64) {
        (self.timestamp, self.sequence)
    }
}

/// Transaction as presented by history and summary queries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionEntry {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Fixed label for `kind`
    pub label: &'static str,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
    pub resulting_balance: Decimal,
}

impl From<Transaction> for TransactionEntry {
    fn from(tx: Transaction) -> Self {
        TransactionEntry {
            id: tx.id,
            kind: tx.kind,
            label: tx.kind.label(),
            amount: tx.amount,
            timestamp: tx.timestamp,
            sequence: tx.sequence,
            resulting_balance: tx.resulting_balance,
        }
    }
}

/// Account summary: totals plus the chronological ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    /// The account's current balance
    pub final_balance: Decimal,
    /// Oldest first
    pub transactions: Vec<TransactionEntry>,
}
