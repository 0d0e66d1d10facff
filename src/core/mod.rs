//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - Repository and store abstractions
//! - `memory` - Thread-safe in-memory stores
//! - `account_locks` - Per-account mutual exclusion
//! - `provisioning` - Account opening
//! - `engine` - Deposits, withdrawals, history and summaries
//! - `processor` - Operation script replay
//! - `batch_processor` - Partitioned concurrent script replay

pub mod account_locks;
pub mod batch_processor;
pub mod engine;
pub mod memory;
pub mod processor;
pub mod provisioning;
pub mod traits;

pub use account_locks::AccountLocks;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::LedgerEngine;
pub use memory::{MemoryCustomerStore, MemoryLedgerStore};
pub use processor::{AccountReport, OperationProcessor};
pub use provisioning::{AccountProvisioner, MAX_ACCOUNT_NUMBER_ATTEMPTS};
pub use traits::{
    AccountNumberSource, AccountRepository, AccountUpdate, ChangeSet, CustomerRepository,
    LedgerStore, RandomAccountNumbers, TransactionRepository,
};
