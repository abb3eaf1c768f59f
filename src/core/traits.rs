//! Core traits for balance storage
//!
//! This module defines the storage abstraction the engine runs against, so
//! the in-memory store used by the CLI and tests can be swapped for a durable
//! one without touching the locking protocol.

use crate::types::{Account, AccountId, StoreError};

/// Key-value storage of account balances
///
/// Each call is atomic on its own; nothing is promised across calls. The
/// engine supplies cross-call atomicity through its locks and the
/// transactional boundary in [`crate::core::transaction`].
///
/// Implementations are shared between threads, so every method takes `&self`.
pub trait BalanceStore: Send + Sync {
    /// Allocate a new account identifier and persist a zero balance for it
    fn create_account(&self) -> Result<AccountId, StoreError>;

    /// Look an account up by identifier
    ///
    /// Returns `Ok(None)` when no account is stored under `id`.
    fn find(&self, id: &str) -> Result<Option<Account>, StoreError>;

    /// Persist an account, replacing any previous state for its identifier
    fn save(&self, account: &Account) -> Result<(), StoreError>;
}
