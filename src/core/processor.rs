//! Operation script processor
//!
//! This module provides the `OperationProcessor`, which replays parsed script
//! records against the ledger. It owns the in-memory stores, the engine and
//! the provisioner, and maps script-local labels to customers and accounts.
//!
//! All methods take `&self`; label registries are `DashMap`s, so one
//! processor can be shared across tokio tasks behind an `Arc`.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::engine::LedgerEngine;
use super::memory::{MemoryCustomerStore, MemoryLedgerStore};
use super::provisioning::AccountProvisioner;
use crate::types::{
    AccountNumber, CustomerId, LedgerError, OperationError, OperationRecord, OperationType,
    Summary,
};

/// Account opened by a script, keyed by its label
#[derive(Debug, Clone)]
struct AccountBinding {
    number: AccountNumber,
    customer: String,
}

/// Final state of one script account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    /// Script label of the account
    pub account: String,

    /// Script label of the owning customer
    pub customer: String,

    /// Generated account number
    pub number: AccountNumber,

    pub summary: Summary,
}

/// Replays operation records against an in-memory ledger
pub struct OperationProcessor {
    engine: LedgerEngine<MemoryLedgerStore>,
    provisioner: AccountProvisioner<MemoryLedgerStore, MemoryCustomerStore>,
    customers: Arc<MemoryCustomerStore>,

    /// Customer label -> customer id
    customer_labels: DashMap<String, CustomerId>,

    /// Account label -> generated number and owner label
    account_labels: DashMap<String, AccountBinding>,
}

impl OperationProcessor {
    /// Create a processor over fresh, empty stores
    pub fn new() -> Self {
        let store = Arc::new(MemoryLedgerStore::new());
        let customers = Arc::new(MemoryCustomerStore::new());

        OperationProcessor {
            engine: LedgerEngine::new(Arc::clone(&store)),
            provisioner: AccountProvisioner::new(store, Arc::clone(&customers)),
            customers,
            customer_labels: DashMap::new(),
            account_labels: DashMap::new(),
        }
    }

    /// The ledger engine the script is applied to
    pub fn engine(&self) -> &LedgerEngine<MemoryLedgerStore> {
        &self.engine
    }

    /// Process a single operation record
    ///
    /// # Arguments
    ///
    /// * `record` - The operation to apply
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the operation was applied
    /// * `Err(OperationError)` if a label did not resolve, a label was bound
    ///   twice, or the ledger rejected the operation. Nothing is changed in
    ///   any of these cases.
    pub fn process(&self, record: &OperationRecord) -> Result<(), OperationError> {
        match record.op {
            OperationType::Customer => self.register_customer(record),
            OperationType::Open => self.open_account(record),
            OperationType::Deposit => {
                let (number, amount) = self.resolve_movement(record)?;
                self.engine.deposit(&number, amount)?;
                Ok(())
            }
            OperationType::Withdraw => {
                let (number, amount) = self.resolve_movement(record)?;
                self.engine.withdraw(&number, amount)?;
                Ok(())
            }
        }
    }

    fn register_customer(&self, record: &OperationRecord) -> Result<(), OperationError> {
        let label = required(record.customer.as_deref(), "customer")?;

        match self.customer_labels.entry(label.to_string()) {
            Entry::Occupied(_) => Err(OperationError::DuplicateLabel {
                entity: "customer",
                label: label.to_string(),
            }),
            Entry::Vacant(slot) => {
                let customer = self.customers.register(label)?;
                debug!(customer = label, id = %customer.id, "customer registered");
                slot.insert(customer.id);
                Ok(())
            }
        }
    }

    fn open_account(&self, record: &OperationRecord) -> Result<(), OperationError> {
        let customer_label = required(record.customer.as_deref(), "customer")?;
        let account_label = required(record.account.as_deref(), "account")?;

        let customer_id = self
            .customer_labels
            .get(customer_label)
            .map(|entry| *entry.value())
            .ok_or_else(|| OperationError::UnknownCustomer {
                label: customer_label.to_string(),
            })?;

        match self.account_labels.entry(account_label.to_string()) {
            Entry::Occupied(_) => Err(OperationError::DuplicateLabel {
                entity: "account",
                label: account_label.to_string(),
            }),
            Entry::Vacant(slot) => {
                let account = self.provisioner.open_account(customer_id)?;
                slot.insert(AccountBinding {
                    number: account.number,
                    customer: customer_label.to_string(),
                });
                Ok(())
            }
        }
    }

    fn resolve_movement(
        &self,
        record: &OperationRecord,
    ) -> Result<(AccountNumber, Decimal), OperationError> {
        let label = required(record.account.as_deref(), "account")?;
        let amount = record
            .amount
            .ok_or_else(|| LedgerError::missing_field("amount"))?;

        let number = self
            .account_labels
            .get(label)
            .map(|entry| entry.value().number.clone())
            .ok_or_else(|| OperationError::UnknownAccount {
                label: label.to_string(),
            })?;

        Ok((number, amount))
    }

    /// Summaries of every opened account, sorted by account label
    ///
    /// # Errors
    ///
    /// Returns an error if a summary cannot be computed.
    pub fn reports(&self) -> Result<Vec<AccountReport>, LedgerError> {
        let mut bindings: Vec<(String, AccountBinding)> = self
            .account_labels
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));

        bindings
            .into_iter()
            .map(|(account, binding)| {
                let summary = self.engine.summary(&binding.number)?;
                Ok(AccountReport {
                    account,
                    customer: binding.customer,
                    number: binding.number,
                    summary,
                })
            })
            .collect()
    }
}

impl Default for OperationProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, LedgerError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(LedgerError::missing_field(field)),
    }
}
