//! Ledger engine
//!
//! This module provides the `LedgerEngine`, the sole mutator of account
//! balances. It applies deposits and withdrawals and rebuilds history and
//! summaries from the transaction log.
//!
//! # Consistency
//!
//! Each operation resolves the account number, then performs its
//! read-validate-write sequence while holding the account's mutex from
//! [`AccountLocks`]. The account is always re-read inside the lock, so two
//! concurrent withdrawals can never both pass the sufficiency check against
//! the same stale balance. The transaction insert and the balance update are
//! committed to the store as one [`ChangeSet`]; the store additionally
//! checks the account version it was computed from.
//!
//! The engine keeps no account or transaction state between calls.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::account_locks::AccountLocks;
use super::traits::{ChangeSet, LedgerStore};
use crate::types::{
    validate_amount, Account, AccountId, AccountNumber, LedgerError, Summary, Transaction,
    TransactionEntry, TransactionKind, MONEY_SCALE,
};

/// Applies deposits and withdrawals and answers balance queries
pub struct LedgerEngine<S> {
    /// Backing store for accounts and transaction logs
    store: Arc<S>,

    /// Per-account mutexes serializing operations on the same account
    locks: AccountLocks,
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Create a new LedgerEngine over a store
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: AccountLocks::new(),
        }
    }

    /// Deposit funds into an account
    ///
    /// # Returns
    ///
    /// * `Ok(Transaction)` - The applied transaction; its resulting balance is
    ///   the new account balance
    /// * `Err(LedgerError::AccountNotFound)` - If the account number does not resolve
    /// * `Err(LedgerError::InvalidAmount)` - If the amount is not positive or
    ///   has more than 2 decimal places
    /// * `Err(LedgerError::ArithmeticOverflow)` - If the balance would overflow
    /// * `Err(LedgerError::Persistence)` - If the store rejected the commit
    #[instrument(level = "debug", skip(self, number), fields(account = %number))]
    pub fn deposit(
        &self,
        number: &AccountNumber,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        self.apply(number, TransactionKind::Deposit, amount)
    }

    /// Withdraw funds from an account
    ///
    /// Same contract as [`deposit`](Self::deposit), plus:
    ///
    /// * `Err(LedgerError::InsufficientFunds)` - If the amount exceeds the
    ///   current balance; the account is left unchanged
    #[instrument(level = "debug", skip(self, number), fields(account = %number))]
    pub fn withdraw(
        &self,
        number: &AccountNumber,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        self.apply(number, TransactionKind::Withdrawal, amount)
    }

    /// All transactions of an account, most recent first
    ///
    /// The order is the one the store returns; it is meant for display, not
    /// for accumulation.
    pub fn history(&self, number: &AccountNumber) -> Result<Vec<TransactionEntry>, LedgerError> {
        let account_id = self.resolve(number)?.id;

        let transactions = self.locks.with_lock(account_id, || {
            self.store.list_transactions_by_account(account_id)
        })?;

        Ok(transactions.into_iter().map(TransactionEntry::from).collect())
    }

    /// Totals and the chronological ledger of an account
    ///
    /// Transactions are sorted oldest first, the opposite of
    /// [`history`](Self::history).
    pub fn summary(&self, number: &AccountNumber) -> Result<Summary, LedgerError> {
        let account_id = self.resolve(number)?.id;

        let (account, mut transactions) =
            self.locks
                .with_lock(account_id, || -> Result<_, LedgerError> {
                    let account = self.reload(account_id, number)?;
                    let transactions = self.store.list_transactions_by_account(account_id)?;
                    Ok((account, transactions))
                })?;

        let zero = Decimal::new(0, MONEY_SCALE);
        let mut total_deposits = zero;
        let mut total_withdrawals = zero;
        for tx in &transactions {
            let total = match tx.kind {
                TransactionKind::Deposit => &mut total_deposits,
                TransactionKind::Withdrawal => &mut total_withdrawals,
            };
            *total = checked_money(total.checked_add(tx.amount))
                .ok_or_else(|| LedgerError::arithmetic_overflow("summary", number.as_str()))?;
        }

        transactions.sort_by_key(Transaction::chronological_key);

        Ok(Summary {
            total_deposits,
            total_withdrawals,
            final_balance: account.balance,
            transactions: transactions.into_iter().map(TransactionEntry::from).collect(),
        })
    }

    /// Current balance of an account
    pub fn balance(&self, number: &AccountNumber) -> Result<Decimal, LedgerError> {
        Ok(self.resolve(number)?.balance)
    }

    /// Current state of an account
    pub fn account(&self, number: &AccountNumber) -> Result<Account, LedgerError> {
        self.resolve(number)
    }

    fn resolve(&self, number: &AccountNumber) -> Result<Account, LedgerError> {
        self.store
            .get_account_by_number(number)?
            .ok_or_else(|| LedgerError::account_not_found(number.as_str()))
    }

    fn reload(&self, account_id: AccountId, number: &AccountNumber) -> Result<Account, LedgerError> {
        self.store
            .get_account_by_id(account_id)?
            .ok_or_else(|| LedgerError::account_not_found(number.as_str()))
    }

    /// Read-validate-write for one deposit or withdrawal
    fn apply(
        &self,
        number: &AccountNumber,
        kind: TransactionKind,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let account_id = self.resolve(number)?.id;

        let amount = validate_amount(amount).inspect_err(|e| {
            warn!(account = %number, error = %e, "{} rejected", kind.label());
        })?;

        self.locks.with_lock(account_id, || -> Result<Transaction, LedgerError> {
            let account = self.reload(account_id, number)?;

            let new_balance = match kind {
                TransactionKind::Deposit => checked_money(account.balance.checked_add(amount))
                    .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", number.as_str()))?,
                TransactionKind::Withdrawal => {
                    if amount > account.balance {
                        warn!(
                            account = %number,
                            balance = %account.balance,
                            requested = %amount,
                            "withdrawal rejected: insufficient funds"
                        );
                        return Err(LedgerError::insufficient_funds(
                            number.as_str(),
                            account.balance,
                            amount,
                        ));
                    }
                    checked_money(account.balance.checked_sub(amount)).ok_or_else(|| {
                        LedgerError::arithmetic_overflow("withdrawal", number.as_str())
                    })?
                }
            };

            // Wall clocks can step backwards; keep the log's timestamps monotonic.
            let timestamp = Utc::now().max(account.updated_at);

            let transaction = Transaction {
                id: Uuid::new_v4(),
                account_id,
                kind,
                amount,
                timestamp,
                sequence: account.version + 1,
                resulting_balance: new_balance,
            };

            let expected_version = account.version;
            let mut updated = account;
            updated.balance = new_balance;
            updated.version += 1;
            updated.updated_at = timestamp;

            let mut changes = ChangeSet::new();
            changes
                .insert_transaction(transaction.clone())
                .update_account(updated, expected_version);
            self.store.commit(changes)?;

            debug!(
                account = %number,
                kind = kind.label(),
                amount = %amount,
                balance = %new_balance,
                sequence = transaction.sequence,
                "transaction applied"
            );

            Ok(transaction)
        })
    }
}

/// Reject results that lost their 2 fractional digits to fit the decimal range
fn checked_money(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| v.scale() == MONEY_SCALE)
}
