//! Per-account mutual exclusion
//!
//! Every ledger operation on an account runs its read-validate-write
//! sequence inside [`AccountLocks::with_lock`]. Mutexes are created lazily
//! and kept in a `DashMap`, so operations on different accounts never wait
//! on each other.

use crate::types::AccountId;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of per-account mutexes
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a closure while holding the account's mutex
    ///
    /// The mutex is cloned out of the map before locking so the map shard is
    /// not held while waiting. The mutex guards no data of its own, so a
    /// poisoned lock is recovered instead of propagated; store commits are
    /// atomic and a panicking holder leaves nothing half-written.
    pub fn with_lock<T, F>(&self, account_id: AccountId, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let lock = self
            .locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of accounts that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
