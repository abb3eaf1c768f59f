//! Transactional boundary over a balance store
//!
//! A [`UnitOfWork`] stages writes in memory while the closure passed to
//! [`run_in_transaction`] runs. Reads see staged writes first. When the
//! closure returns `Ok` the staged accounts are committed to the store; when
//! it returns `Err` they are discarded and the store is untouched.
//!
//! If the store fails halfway through a commit, the accounts already written
//! are restored to the state they had before the commit started.

use crate::core::traits::BalanceStore;
use crate::types::{Account, StoreError};
use tracing::warn;

/// Writes staged against a balance store, pending commit
pub struct UnitOfWork<'a, S: BalanceStore + ?Sized> {
    store: &'a S,
    staged: Vec<Account>,
}

impl<'a, S: BalanceStore + ?Sized> UnitOfWork<'a, S> {
    fn new(store: &'a S) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    /// Look an account up, preferring a staged write over the stored state
    pub fn find(&self, id: &str) -> Result<Option<Account>, StoreError> {
        match self.staged.iter().find(|account| account.id == id) {
            Some(account) => Ok(Some(account.clone())),
            None => self.store.find(id),
        }
    }

    /// Stage an account write
    ///
    /// A second save for the same identifier replaces the first.
    pub fn save(&mut self, account: Account) {
        match self.staged.iter_mut().find(|staged| staged.id == account.id) {
            Some(staged) => *staged = account,
            None => self.staged.push(account),
        }
    }

    fn commit(self) -> Result<(), StoreError> {
        let mut previous: Vec<Account> = Vec::with_capacity(self.staged.len());

        for account in &self.staged {
            let result = self.store.find(&account.id).and_then(|before| {
                self.store.save(account)?;
                Ok(before)
            });

            match result {
                Ok(Some(before)) => previous.push(before),
                Ok(None) => {}
                Err(e) => {
                    self.restore(&previous);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    fn restore(&self, previous: &[Account]) {
        for account in previous.iter().rev() {
            if let Err(e) = self.store.save(account) {
                warn!(account_id = %account.id, error = %e, "Failed to restore account during rollback");
            }
        }
    }
}

/// Run `work` inside a transactional boundary
///
/// Staged writes are committed only if `work` returns `Ok`. A store failure
/// during commit is converted into the caller's error type.
///
/// # Examples
///
/// ```
/// use accounts_engine::core::{run_in_transaction, BalanceStore, InMemoryBalanceStore};
/// use accounts_engine::types::{Account, StoreError};
/// use rust_decimal::Decimal;
///
/// let store = InMemoryBalanceStore::new();
/// let id = store.create_account().unwrap();
///
/// let result: Result<(), StoreError> = run_in_transaction(&store, |tx| {
///     tx.save(Account::with_balance(id.clone(), Decimal::TEN));
///     Ok(())
/// });
///
/// assert!(result.is_ok());
/// assert_eq!(store.find(&id).unwrap().unwrap().balance, Decimal::TEN);
/// ```
pub fn run_in_transaction<S, T, E, F>(store: &S, work: F) -> Result<T, E>
where
    S: BalanceStore + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut UnitOfWork<'_, S>) -> Result<T, E>,
{
    let mut unit = UnitOfWork::new(store);
    let value = work(&mut unit)?;
    unit.commit()?;
    Ok(value)
}
