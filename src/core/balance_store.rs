//! Thread-safe in-memory balance store
//!
//! This module provides the `InMemoryBalanceStore` struct, a `BalanceStore`
//! backed by a concurrent hash map.
//!
//! # Design
//!
//! `InMemoryBalanceStore` uses `DashMap` for sharded, fine-grained locking, so
//! single `find`/`save` calls on different accounts never contend. The store
//! itself gives no cross-call guarantees; a read followed by a write is only
//! atomic when the engine holds the account's lock around both.

use crate::core::traits::BalanceStore;
use crate::types::{Account, AccountId, StoreError};
use dashmap::DashMap;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Balance store keeping every account in process memory
///
/// Account identifiers are UUID v4 strings.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    /// Balances keyed by account identifier
    accounts: DashMap<AccountId, Decimal>,
}

impl InMemoryBalanceStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Snapshot of every stored account
    ///
    /// Accounts are returned in arbitrary order. Concurrent writers may change
    /// balances right after the snapshot is taken.
    pub fn get_all_accounts(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|entry| Account::with_balance(entry.key().clone(), *entry.value()))
            .collect()
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn create_account(&self) -> Result<AccountId, StoreError> {
        let account = Account::new(Uuid::new_v4().to_string());
        self.accounts.insert(account.id.clone(), account.balance);
        Ok(account.id)
    }

    fn find(&self, id: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .get(id)
            .map(|balance| Account::with_balance(id, *balance)))
    }

    fn save(&self, account: &Account) -> Result<(), StoreError> {
        self.accounts.insert(account.id.clone(), account.balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_create_account_persists_zero_balance() {
        let store = InMemoryBalanceStore::new();

        let id = store.create_account().unwrap();
        let account = store.find(&id).unwrap().unwrap();

        assert_eq!(id.len(), 36);
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.balance.to_string(), "0.00");
    }

    #[test]
    fn test_find_returns_none_for_unknown_account() {
        let store = InMemoryBalanceStore::new();

        assert_eq!(store.find("missing").unwrap(), None);
    }

    #[test]
    fn test_save_replaces_balance() {
        let store = InMemoryBalanceStore::new();
        let id = store.create_account().unwrap();

        store
            .save(&Account::with_balance(id.clone(), Decimal::new(1050, 2)))
            .unwrap();

        assert_eq!(
            store.find(&id).unwrap().unwrap().balance,
            Decimal::new(1050, 2)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_create_account_allocates_unique_ids() {
        let store = Arc::new(InMemoryBalanceStore::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || store_clone.create_account().unwrap()));
        }

        let ids: HashSet<AccountId> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(ids.len(), 10);
        assert_eq!(store.len(), 10);
        assert_eq!(store.get_all_accounts().len(), 10);
    }
}
