//! In-memory store implementations
//!
//! Thread-safe, `DashMap`-backed implementations of the storage ports in
//! [`crate::core::traits`]:
//!
//! - **MemoryLedgerStore**: accounts, account-number index and transaction logs
//! - **MemoryCustomerStore**: customer records
//!
//! # Thread Safety
//!
//! Both stores are `Send + Sync` and meant to be shared behind an `Arc`.
//! Lookups on different keys proceed in parallel; ledger commits are
//! applied all or nothing.

pub mod customer_store;
pub mod ledger_store;

pub use customer_store::MemoryCustomerStore;
pub use ledger_store::MemoryLedgerStore;
