//! Account provisioning
//!
//! This module provides the `AccountProvisioner`, which opens new accounts for
//! existing customers.
//!
//! Account numbers are derived from a random token and are not unique by
//! construction. The store's unique index on account numbers is the backstop:
//! a collision makes the commit fail with `DuplicateAccountNumber`, and the
//! provisioner retries with a fresh number up to
//! [`MAX_ACCOUNT_NUMBER_ATTEMPTS`] times.

use std::sync::Arc;

use tracing::{info, warn};

use super::traits::{
    AccountNumberSource, ChangeSet, CustomerRepository, LedgerStore, RandomAccountNumbers,
};
use crate::types::{Account, CustomerId, LedgerError, StoreError};

/// Attempts made before a run of account-number collisions is reported
pub const MAX_ACCOUNT_NUMBER_ATTEMPTS: usize = 5;

/// Opens accounts bound to existing customers
pub struct AccountProvisioner<S, C, N = RandomAccountNumbers> {
    store: Arc<S>,
    customers: Arc<C>,
    numbers: N,
}

impl<S, C> AccountProvisioner<S, C, RandomAccountNumbers>
where
    S: LedgerStore,
    C: CustomerRepository,
{
    /// Create a provisioner drawing random account numbers
    pub fn new(store: Arc<S>, customers: Arc<C>) -> Self {
        Self::with_number_source(store, customers, RandomAccountNumbers)
    }
}

impl<S, C, N> AccountProvisioner<S, C, N>
where
    S: LedgerStore,
    C: CustomerRepository,
    N: AccountNumberSource,
{
    /// Create a provisioner with a custom account number source
    pub fn with_number_source(store: Arc<S>, customers: Arc<C>, numbers: N) -> Self {
        Self {
            store,
            customers,
            numbers,
        }
    }

    /// Open a new zero-balance account for a customer
    ///
    /// # Returns
    ///
    /// * `Ok(Account)` - The persisted account
    /// * `Err(LedgerError::CustomerNotFound)` - If the customer id does not resolve
    /// * `Err(LedgerError::Persistence)` - If the store failed, or every
    ///   generated account number collided
    pub fn open_account(&self, customer_id: CustomerId) -> Result<Account, LedgerError> {
        if self.customers.get_customer_by_id(customer_id)?.is_none() {
            warn!(%customer_id, "account opening rejected: unknown customer");
            return Err(LedgerError::customer_not_found(customer_id));
        }

        let mut last_error = None;
        for attempt in 1..=MAX_ACCOUNT_NUMBER_ATTEMPTS {
            let account = Account::open(self.numbers.next_number(), customer_id);

            let mut changes = ChangeSet::new();
            changes.insert_account(account.clone());

            match self.store.commit(changes) {
                Ok(()) => {
                    info!(
                        account = %account.number,
                        %customer_id,
                        "account opened"
                    );
                    return Ok(account);
                }
                Err(StoreError::DuplicateAccountNumber { number }) => {
                    warn!(attempt, %number, "account number collision, regenerating");
                    last_error = Some(StoreError::DuplicateAccountNumber { number });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error
            .unwrap_or_else(|| StoreError::unavailable("no account number attempts made"))
            .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::{MemoryCustomerStore, MemoryLedgerStore};
    use crate::core::traits::AccountRepository;
    use crate::types::AccountNumber;
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Hands out a fixed sequence of numbers, then random ones
    struct ScriptedNumbers {
        queue: Mutex<Vec<AccountNumber>>,
    }

    impl ScriptedNumbers {
        fn new(mut numbers: Vec<AccountNumber>) -> Self {
            numbers.reverse();
            Self {
                queue: Mutex::new(numbers),
            }
        }
    }

    impl AccountNumberSource for ScriptedNumbers {
        fn next_number(&self) -> AccountNumber {
            self.queue
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(AccountNumber::generate)
        }
    }

    fn setup() -> (Arc<MemoryLedgerStore>, Arc<MemoryCustomerStore>) {
        (
            Arc::new(MemoryLedgerStore::new()),
            Arc::new(MemoryCustomerStore::new()),
        )
    }

    #[test]
    fn test_open_account_for_existing_customer() {
        let (store, customers) = setup();
        let customer = customers.register("Nayeli").unwrap();
        let provisioner = AccountProvisioner::new(Arc::clone(&store), customers);

        let account = provisioner.open_account(customer.id).unwrap();

        assert_eq!(account.customer_id, customer.id);
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.balance.to_string(), "0.00");
        assert!(account.number.as_str().starts_with("BCCEHN"));
        assert_eq!(account.number.as_str().len(), 18);

        let stored = store.get_account_by_number(&account.number).unwrap();
        assert_eq!(stored, Some(account));
    }

    #[test]
    fn test_open_account_unknown_customer() {
        let (store, customers) = setup();
        let provisioner = AccountProvisioner::new(Arc::clone(&store), customers);
        let missing = Uuid::new_v4();

        let result = provisioner.open_account(missing);

        assert_eq!(result, Err(LedgerError::customer_not_found(missing)));
        assert_eq!(store.account_count(), 0);
    }

    #[test]
    fn test_open_account_retries_on_number_collision() {
        let (store, customers) = setup();
        let customer = customers.register("Nayeli").unwrap();
        let taken: AccountNumber = "BCCEHN000000000001".parse().unwrap();
        let fresh: AccountNumber = "BCCEHN000000000002".parse().unwrap();

        let first = AccountProvisioner::with_number_source(
            Arc::clone(&store),
            Arc::clone(&customers),
            ScriptedNumbers::new(vec![taken.clone()]),
        );
        first.open_account(customer.id).unwrap();

        let second = AccountProvisioner::with_number_source(
            Arc::clone(&store),
            customers,
            ScriptedNumbers::new(vec![taken.clone(), taken, fresh.clone()]),
        );
        let account = second.open_account(customer.id).unwrap();

        assert_eq!(account.number, fresh);
        assert_eq!(store.account_count(), 2);
    }

    #[test]
    fn test_open_account_gives_up_after_max_attempts() {
        let (store, customers) = setup();
        let customer = customers.register("Nayeli").unwrap();
        let taken: AccountNumber = "BCCEHN000000000001".parse().unwrap();

        AccountProvisioner::with_number_source(
            Arc::clone(&store),
            Arc::clone(&customers),
            ScriptedNumbers::new(vec![taken.clone()]),
        )
        .open_account(customer.id)
        .unwrap();

        let provisioner = AccountProvisioner::with_number_source(
            Arc::clone(&store),
            customers,
            ScriptedNumbers::new(vec![taken.clone(); MAX_ACCOUNT_NUMBER_ATTEMPTS]),
        );
        let result = provisioner.open_account(customer.id);

        assert_eq!(
            result,
            Err(LedgerError::Persistence(StoreError::DuplicateAccountNumber {
                number: taken.to_string()
            }))
        );
        assert_eq!(store.account_count(), 1);
    }

    #[test]
    fn test_many_accounts_for_one_customer() {
        let (store, customers) = setup();
        let customer = customers.register("Nayeli").unwrap();
        let provisioner = AccountProvisioner::new(Arc::clone(&store), customers);

        for _ in 0..20 {
            provisioner.open_account(customer.id).unwrap();
        }
        assert_eq!(store.account_count(), 20);
    }
}
