//! Store doubles for unit tests

use crate::core::traits::BalanceStore;
use crate::core::InMemoryBalanceStore;
use crate::types::{Account, AccountId, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory store that can be told to fail one specific `save` call
///
/// Save calls are numbered from 1 counting from the moment
/// [`FaultyStore::fail_save_number`] is called.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: InMemoryBalanceStore,
    saves: AtomicUsize,
    fail_on: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`-th save from now fail (1-based)
    pub fn fail_save_number(&self, n: usize) {
        self.saves.store(0, Ordering::SeqCst);
        self.fail_on.store(n, Ordering::SeqCst);
    }
}

impl BalanceStore for FaultyStore {
    fn create_account(&self) -> Result<AccountId, StoreError> {
        self.inner.create_account()
    }

    fn find(&self, id: &str) -> Result<Option<Account>, StoreError> {
        self.inner.find(id)
    }

    fn save(&self, account: &Account) -> Result<(), StoreError> {
        let n = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected save failure"));
        }
        self.inner.save(account)
    }
}
