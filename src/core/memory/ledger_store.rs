//! Thread-safe in-memory ledger store
//!
//! This module provides the `MemoryLedgerStore` struct, the reference
//! implementation of [`LedgerStore`] used by the command-line driver and the
//! tests.
//!
//! # Design
//!
//! Accounts, the unique account-number index and the per-account transaction
//! logs live in separate `DashMap`s so lookups on different accounts never
//! contend. A commit gate (`RwLock<()>`) makes [`LedgerStore::commit`] all or
//! nothing: a commit validates every staged write before applying any of
//! them, and readers never observe a half-applied change set.

use crate::core::traits::{AccountRepository, ChangeSet, LedgerStore, TransactionRepository};
use crate::types::{
    Account, AccountId, AccountNumber, StoreError, Transaction, TransactionId,
};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard};

/// In-memory store for accounts and their transaction logs
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    /// Accounts by internal id
    accounts: DashMap<AccountId, Account>,

    /// Unique index: account number -> account id
    numbers: DashMap<AccountNumber, AccountId>,

    /// Append-only logs, oldest first
    transactions: DashMap<AccountId, Vec<Transaction>>,

    /// Unique index on transaction ids
    transaction_ids: DashMap<TransactionId, AccountId>,

    /// Held for writing during commit, for reading during lookups
    gate: RwLock<()>,
}

impl MemoryLedgerStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts held
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Number of transactions held across all accounts
    pub fn transaction_count(&self) -> usize {
        self.transaction_ids.len()
    }

    fn read_gate(&self) -> Result<RwLockReadGuard<'_, ()>, StoreError> {
        self.gate
            .read()
            .map_err(|_| StoreError::unavailable("commit gate poisoned"))
    }

    /// Check every staged write against the current state
    ///
    /// Must run under the write gate.
    fn validate(&self, changes: &ChangeSet) -> Result<(), StoreError> {
        let mut new_numbers = HashSet::new();
        let mut new_ids = HashSet::new();

        for account in changes.inserted_accounts() {
            if self.numbers.contains_key(&account.number) || !new_numbers.insert(&account.number) {
                return Err(StoreError::DuplicateAccountNumber {
                    number: account.number.to_string(),
                });
            }
            if self.accounts.contains_key(&account.id) || !new_ids.insert(account.id) {
                return Err(StoreError::DuplicateRecord {
                    entity: "account",
                    id: account.id,
                });
            }
        }

        for update in changes.updated_accounts() {
            let stored_version = self
                .accounts
                .get(&update.account.id)
                .map(|stored| stored.version)
                .ok_or(StoreError::MissingAccount {
                    account: update.account.id,
                })?;

            if stored_version != update.expected_version {
                return Err(StoreError::VersionConflict {
                    account: update.account.id,
                    expected: update.expected_version,
                    actual: stored_version,
                });
            }
        }

        let mut new_transaction_ids = HashSet::new();
        for tx in changes.inserted_transactions() {
            if !self.accounts.contains_key(&tx.account_id) && !new_ids.contains(&tx.account_id) {
                return Err(StoreError::MissingAccount {
                    account: tx.account_id,
                });
            }
            if self.transaction_ids.contains_key(&tx.id) || !new_transaction_ids.insert(tx.id) {
                return Err(StoreError::DuplicateRecord {
                    entity: "transaction",
                    id: tx.id,
                });
            }
        }

        Ok(())
    }
}

impl AccountRepository for MemoryLedgerStore {
    fn get_account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let _gate = self.read_gate()?;
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    fn get_account_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<Account>, StoreError> {
        let _gate = self.read_gate()?;
        let id = match self.numbers.get(number) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }
}

impl TransactionRepository for MemoryLedgerStore {
    fn list_transactions_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StoreError> {
        let _gate = self.read_gate()?;
        let mut transactions = self
            .transactions
            .get(&account_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        transactions.sort_by(|a, b| b.chronological_key().cmp(&a.chronological_key()));
        Ok(transactions)
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        let _gate = self
            .gate
            .write()
            .map_err(|_| StoreError::unavailable("commit gate poisoned"))?;

        self.validate(&changes)?;

        for account in changes.inserted_accounts() {
            self.numbers.insert(account.number.clone(), account.id);
            self.transactions.entry(account.id).or_insert_with(Vec::new);
            self.accounts.insert(account.id, account.clone());
        }

        for update in changes.updated_accounts() {
            self.accounts
                .insert(update.account.id, update.account.clone());
        }

        for tx in changes.inserted_transactions() {
            self.transaction_ids.insert(tx.id, tx.account_id);
            self.transactions
                .entry(tx.account_id)
                .or_insert_with(Vec::new)
                .push(tx.clone());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionKind;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn open_account(store: &MemoryLedgerStore) -> Account {
        let account = Account::open(AccountNumber::generate(), Uuid::new_v4());
        let mut changes = ChangeSet::new();
        changes.insert_account(account.clone());
        store.commit(changes).unwrap();
        account
    }

    fn deposit_tx(account: &Account, amount: Decimal, sequence: u64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            account_id: account.id,
            kind: TransactionKind::Deposit,
            amount,
            timestamp: Utc::now(),
            sequence,
            resulting_balance: amount,
        }
    }

    #[test]
    fn test_new_creates_empty_store() {
        let store = MemoryLedgerStore::new();
        assert_eq!(store.account_count(), 0);
        assert_eq!(store.transaction_count(), 0);
    }

    #[test]
    fn test_insert_and_lookup_by_id_and_number() {
        let store = MemoryLedgerStore::new();
        let account = open_account(&store);

        let by_id = store.get_account_by_id(account.id).unwrap().unwrap();
        let by_number = store.get_account_by_number(&account.number).unwrap().unwrap();

        assert_eq!(by_id, account);
        assert_eq!(by_number, account);
        assert!(store
            .list_transactions_by_account(account.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_lookup_unknown_returns_none() {
        let store = MemoryLedgerStore::new();
        assert!(store.get_account_by_id(Uuid::new_v4()).unwrap().is_none());
        assert!(store
            .get_account_by_number(&AccountNumber::generate())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_duplicate_account_number_rejected() {
        let store = MemoryLedgerStore::new();
        let first = open_account(&store);

        let clash = Account::open(first.number.clone(), Uuid::new_v4());
        let mut changes = ChangeSet::new();
        changes.insert_account(clash);

        let result = store.commit(changes);
        assert_eq!(
            result,
            Err(StoreError::DuplicateAccountNumber {
                number: first.number.to_string()
            })
        );
        assert_eq!(store.account_count(), 1);
    }

    #[test]
    fn test_update_with_stale_version_rejected() {
        let store = MemoryLedgerStore::new();
        let account = open_account(&store);

        let mut updated = account.clone();
        updated.balance = Decimal::new(1000, 2);
        updated.version = 1;

        let mut changes = ChangeSet::new();
        changes.update_account(updated.clone(), 5);

        let result = store.commit(changes);
        assert_eq!(
            result,
            Err(StoreError::VersionConflict {
                account: account.id,
                expected: 5,
                actual: 0
            })
        );
    }

    #[test]
    fn test_failed_commit_applies_nothing() {
        let store = MemoryLedgerStore::new();
        let account = open_account(&store);

        let mut updated = account.clone();
        updated.balance = Decimal::new(1000, 2);
        updated.version = 1;

        // Transaction insert is valid, account update is stale
        let mut changes = ChangeSet::new();
        changes
            .insert_transaction(deposit_tx(&account, Decimal::new(1000, 2), 1))
            .update_account(updated, 3);

        assert!(store.commit(changes).is_err());
        assert_eq!(store.transaction_count(), 0);
        assert_eq!(
            store.get_account_by_id(account.id).unwrap().unwrap().balance,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_transaction_for_unknown_account_rejected() {
        let store = MemoryLedgerStore::new();
        let orphan = Account::open(AccountNumber::generate(), Uuid::new_v4());

        let mut changes = ChangeSet::new();
        changes.insert_transaction(deposit_tx(&orphan, Decimal::ONE, 1));

        assert_eq!(
            store.commit(changes),
            Err(StoreError::MissingAccount { account: orphan.id })
        );
    }

    #[test]
    fn test_duplicate_transaction_id_rejected() {
        let store = MemoryLedgerStore::new();
        let account = open_account(&store);
        let tx = deposit_tx(&account, Decimal::ONE, 1);

        let mut changes = ChangeSet::new();
        changes.insert_transaction(tx.clone());
        store.commit(changes).unwrap();

        let mut changes = ChangeSet::new();
        changes.insert_transaction(tx.clone());
        assert_eq!(
            store.commit(changes),
            Err(StoreError::DuplicateRecord {
                entity: "transaction",
                id: tx.id
            })
        );
    }

    #[test]
    fn test_list_transactions_most_recent_first() {
        let store = MemoryLedgerStore::new();
        let account = open_account(&store);

        for sequence in 1..=3 {
            let mut changes = ChangeSet::new();
            changes.insert_transaction(deposit_tx(&account, Decimal::ONE, sequence));
            store.commit(changes).unwrap();
        }

        let sequences: Vec<u64> = store
            .list_transactions_by_account(account.id)
            .unwrap()
            .iter()
            .map(|tx| tx.sequence)
            .collect();
        assert_eq!(sequences, vec![3, 2, 1]);
    }

    #[test]
    fn test_concurrent_inserts_of_different_accounts() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryLedgerStore::new());

        let mut handles = vec![];
        for _ in 0..10 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || open_account(&store_clone)));
        }

        for handle in handles {
            let account = handle.join().unwrap();
            assert!(store.get_account_by_id(account.id).unwrap().is_some());
        }
        assert_eq!(store.account_count(), 10);
    }
}
