//! Per-account mutual exclusion
//!
//! This module provides the `LockRegistry` struct, which hands out one mutex
//! per account identifier for the whole life of the process.
//!
//! # Design
//!
//! The registry is a `DashMap` from identifier to `Arc<Mutex<()>>`. The mutex
//! guards no data: it only serializes the read-modify-write the engine runs
//! against the balance store. Handles are created lazily on first reference
//! and are never removed, so a lock can never be disposed of while another
//! thread is about to acquire it.
//!
//! # Thread Safety
//!
//! `lock_for` is a get-or-create on a single map entry. If several threads
//! race on an identifier seen for the first time, exactly one handle is
//! inserted and every caller receives a clone of that same `Arc`.

use crate::types::AccountId;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// Shared handle to an account's mutex
pub type AccountLock = Arc<Mutex<()>>;

/// Process-wide registry of account locks
///
/// Grows by one entry per distinct identifier ever referenced, including
/// identifiers that turn out not to exist in the store.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<AccountId, AccountLock>,
}

impl LockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock for an account, creating it on first use
    ///
    /// Returns the same handle for the same identifier on every call.
    pub fn lock_for(&self, account_id: &str) -> AccountLock {
        if let Some(lock) = self.locks.get(account_id) {
            return Arc::clone(lock.value());
        }

        let entry = self
            .locks
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Number of identifiers that have a lock
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock has been created yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
