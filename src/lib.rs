//! Rust Ledger Engine Library
//!
//! # Overview
//!
//! This library implements the core of a retail banking ledger: customers
//! open accounts, deposit and withdraw funds, and read back balances,
//! transaction history and account summaries. A command-line driver replays
//! CSV operation scripts through the core with either a sync or an async
//! strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Transaction, errors, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Deposits, withdrawals, history and summaries
//!   - [`core::provisioning`] - Account opening with unique numbers
//!   - [`core::memory`] - Thread-safe in-memory stores
//!   - [`core::processor`] - Operation script replay
//! - [`io`] - Script parsing and report output
//! - [`strategy`] - Sync and async processing pipelines
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - Tracing initialization
//!
//! # Ledger Rules
//!
//! - Amounts are strictly positive with at most 2 decimal places
//! - A withdrawal never takes a balance below zero
//! - Every applied operation appends exactly one immutable transaction that
//!   records the balance it produced
//! - Operations on the same account are serialized; operations on different
//!   accounts run in parallel

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{
    AccountProvisioner, AccountReport, LedgerEngine, LedgerStore, MemoryCustomerStore,
    MemoryLedgerStore, OperationProcessor,
};
pub use io::{write_reports, OutputFormat};
pub use types::{
    Account, AccountNumber, Customer, ErrorKind, LedgerError, OperationError, StoreError,
    Summary, Transaction, TransactionEntry, TransactionKind,
};
