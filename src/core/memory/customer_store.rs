//! Thread-safe in-memory customer store

use crate::core::traits::CustomerRepository;
use crate::types::{Customer, CustomerId, LedgerError, StoreError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory customer records keyed by id
#[derive(Debug, Default)]
pub struct MemoryCustomerStore {
    customers: DashMap<CustomerId, Customer>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new customer
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when the name is blank.
    pub fn register(&self, name: &str) -> Result<Customer, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::missing_field("name"));
        }

        let customer = Customer::new(name);
        self.insert(customer.clone())?;
        Ok(customer)
    }

    /// Insert an existing customer record
    pub fn insert(&self, customer: Customer) -> Result<(), StoreError> {
        match self.customers.entry(customer.id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateRecord {
                entity: "customer",
                id: customer.id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(customer);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

impl CustomerRepository for MemoryCustomerStore {
    fn get_customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.customers.get(&id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_register_and_lookup() {
        let store = MemoryCustomerStore::new();
        let customer = store.register("Nayeli").unwrap();

        let found = store.get_customer_by_id(customer.id).unwrap().unwrap();
        assert_eq!(found.name, "Nayeli");
        assert_eq!(store.len(), 1);
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn test_register_requires_name(#[case] name: &str) {
        let store = MemoryCustomerStore::new();
        let result = store.register(name);
        assert_eq!(result, Err(LedgerError::missing_field("name")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_duplicate_id_rejected() {
        let store = MemoryCustomerStore::new();
        let customer = Customer::new("Ana");

        store.insert(customer.clone()).unwrap();
        let result = store.insert(customer.clone());
        assert_eq!(
            result,
            Err(StoreError::DuplicateRecord {
                entity: "customer",
                id: customer.id
            })
        );
    }

    #[test]
    fn test_unknown_customer_returns_none() {
        let store = MemoryCustomerStore::new();
        assert!(store.get_customer_by_id(uuid::Uuid::new_v4()).unwrap().is_none());
    }
}
