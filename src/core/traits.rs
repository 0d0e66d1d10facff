//! Storage ports consumed by the ledger core
//!
//! The core never talks to a concrete database. It reads through these
//! repository traits and writes by handing a [`ChangeSet`] to
//! [`LedgerStore::commit`], which must apply every staged write or none.

use crate::types::{
    Account, AccountId, AccountNumber, Customer, CustomerId, StoreError, Transaction,
};

/// Account lookups
pub trait AccountRepository: Send + Sync {
    /// Load an account by internal id
    fn get_account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Load an account by its unique account number
    fn get_account_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<Account>, StoreError>;
}

/// Transaction log lookups
pub trait TransactionRepository: Send + Sync {
    /// All transactions of an account, most recent first
    fn list_transactions_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StoreError>;
}

/// Customer existence check
pub trait CustomerRepository: Send + Sync {
    fn get_customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
}

/// Store holding both accounts and the transaction log
pub trait LedgerStore: AccountRepository + TransactionRepository {
    /// Apply a change set atomically
    ///
    /// Implementations must:
    /// - reject an inserted account whose number is already taken with
    ///   [`StoreError::DuplicateAccountNumber`]
    /// - reject an account update whose stored version differs from the
    ///   expected one with [`StoreError::VersionConflict`]
    /// - leave the store untouched when any check fails
    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError>;
}

/// Account update guarded by the version it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    pub account: Account,
    pub expected_version: u64,
}

/// Writes staged for a single commit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    inserted_accounts: Vec<Account>,
    updated_accounts: Vec<AccountUpdate>,
    inserted_transactions: Vec<Transaction>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a new account
    pub fn insert_account(&mut self, account: Account) -> &mut Self {
        self.inserted_accounts.push(account);
        self
    }

    /// Stage an account update, valid only if the stored version is `expected_version`
    pub fn update_account(&mut self, account: Account, expected_version: u64) -> &mut Self {
        self.updated_accounts.push(AccountUpdate {
            account,
            expected_version,
        });
        self
    }

    /// Stage a transaction append
    pub fn insert_transaction(&mut self, transaction: Transaction) -> &mut Self {
        self.inserted_transactions.push(transaction);
        self
    }

    pub fn inserted_accounts(&self) -> &[Account] {
        &self.inserted_accounts
    }

    pub fn updated_accounts(&self) -> &[AccountUpdate] {
        &self.updated_accounts
    }

    pub fn inserted_transactions(&self) -> &[Transaction] {
        &self.inserted_transactions
    }

    pub fn is_empty(&self) -> bool {
        self.inserted_accounts.is_empty()
            && self.updated_accounts.is_empty()
            && self.inserted_transactions.is_empty()
    }
}

/// Source of candidate account numbers
pub trait AccountNumberSource: Send + Sync {
    fn next_number(&self) -> AccountNumber;
}

/// Random UUID-derived account numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAccountNumbers;

impl AccountNumberSource for RandomAccountNumbers {
    fn next_number(&self) -> AccountNumber {
        AccountNumber::generate()
    }
}
