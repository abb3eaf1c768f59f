//! Balance engine
//!
//! This module provides the `BalanceEngine`, the only component allowed to
//! mutate balances. Every mutation runs under the affected accounts' locks
//! and inside a transactional boundary, so concurrent callers never lose an
//! update, never observe a negative balance, and never see half a transfer.
//!
//! # Locking protocol
//!
//! - `increase_balance` / `reduce_balance` block on the single account lock.
//! - `transfer_money` never blocks on a mutex. It tries the source lock, then
//!   the destination lock; if either is busy it releases whatever it got,
//!   sleeps for `EngineConfig::transfer_backoff` and starts over. No thread
//!   ever waits for a lock while holding another, so circular waits (and
//!   hence deadlocks) cannot form, even for A->B racing B->A.
//!
//! The price is possible livelock under heavy contention: two transfers can
//! keep colliding and backing off. The fixed backoff makes that unlikely in
//! practice, and `EngineConfig::max_transfer_attempts` turns it into a
//! `LockAcquisitionTimeout` failure when a bound is wanted.
//!
//! # Architecture
//!
//! ```text
//! BalanceEngine
//!     ├── Arc<S: BalanceStore>  (balances, single-call atomicity)
//!     ├── Arc<LockRegistry>     (one mutex per account id)
//!     └── EngineConfig          (transfer backoff and retry bound)
//! ```

use crate::core::lock_registry::LockRegistry;
use crate::core::traits::BalanceStore;
use crate::core::transaction::{run_in_transaction, UnitOfWork};
use crate::types::{money, AccountError, AccountId};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Configuration for the balance engine
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Pause between two attempts to take both transfer locks
    pub transfer_backoff: Duration,
    /// Give up a transfer after this many acquisition attempts (`None` retries forever)
    pub max_transfer_attempts: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            transfer_backoff: Duration::from_millis(1),
            max_transfer_attempts: None,
        }
    }
}

impl EngineConfig {
    /// Create a new EngineConfig with custom values
    ///
    /// A bound of zero attempts could never succeed, so it falls back to
    /// unbounded retries.
    pub fn new(transfer_backoff: Duration, max_transfer_attempts: Option<u32>) -> Self {
        let max_transfer_attempts = match max_transfer_attempts {
            Some(0) => {
                warn!("Invalid max_transfer_attempts (0), retrying transfers without bound");
                None
            }
            other => other,
        };

        Self {
            transfer_backoff,
            max_transfer_attempts,
        }
    }
}

/// Concurrency-safe engine applying balance operations
///
/// Cheap to clone: clones share the same store and lock registry, and can be
/// moved to other threads.
pub struct BalanceEngine<S: BalanceStore> {
    store: Arc<S>,
    locks: Arc<LockRegistry>,
    config: EngineConfig,
}

impl<S: BalanceStore> Clone for BalanceEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
            config: self.config.clone(),
        }
    }
}

impl<S: BalanceStore> BalanceEngine<S> {
    /// Create an engine over `store` with the default configuration
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create an engine over `store` with a custom configuration
    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            locks: Arc::new(LockRegistry::new()),
            config,
        }
    }

    /// The balance store this engine writes to
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The registry holding this engine's account locks
    pub fn lock_registry(&self) -> &LockRegistry {
        &self.locks
    }

    /// Open a new account with a zero balance
    ///
    /// Identity and storage are allocated by the store.
    pub fn create_account(&self) -> Result<AccountId, AccountError> {
        let account_id = self.store.create_account()?;
        debug!(account_id = %account_id, "Account created");
        Ok(account_id)
    }

    /// Read the committed balance of an account
    ///
    /// Waits for the account's lock, so it never observes a write that a
    /// failing commit is about to restore.
    ///
    /// # Errors
    ///
    /// * `AccountNotFound` if no account is stored under `account_id`
    pub fn get_balance(&self, account_id: &str) -> Result<Decimal, AccountError> {
        let lock = self.locks.lock_for(account_id);
        let _guard = acquire(&lock);

        self.store
            .find(account_id)?
            .map(|account| account.balance)
            .ok_or_else(|| AccountError::account_not_found(account_id))
    }

    /// Credit `amount` to an account and return the new balance
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount` is negative
    /// * `AccountNotFound` if no account is stored under `account_id`
    /// * `ArithmeticOverflow` if the balance would leave the decimal range
    pub fn increase_balance(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Decimal, AccountError> {
        let amount = validate_amount(amount)?;

        let lock = self.locks.lock_for(account_id);
        let _guard = acquire(&lock);

        let result = run_in_transaction(self.store.as_ref(), |tx| credit(tx, account_id, amount));
        log_outcome("increase", account_id, amount, &result);
        result
    }

    /// Debit `amount` from an account and return the new balance
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount` is negative
    /// * `AccountNotFound` if no account is stored under `account_id`
    /// * `InsufficientFunds` if the balance would drop below zero; the balance
    ///   is left unchanged
    pub fn reduce_balance(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Decimal, AccountError> {
        let amount = validate_amount(amount)?;

        let lock = self.locks.lock_for(account_id);
        let _guard = acquire(&lock);

        let result = run_in_transaction(self.store.as_ref(), |tx| debit(tx, account_id, amount));
        log_outcome("reduce", account_id, amount, &result);
        result
    }

    /// Move `amount` from `source` to `destination` as one atomic step
    ///
    /// Either both legs are committed or neither is. A transfer from an
    /// account to itself takes the single lock once and leaves the balance
    /// unchanged when the account can cover the amount.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount` is negative
    /// * `AccountNotFound` if either account is missing
    /// * `InsufficientFunds` if `source` cannot cover `amount`
    /// * `LockAcquisitionTimeout` if a retry bound is configured and exhausted
    pub fn transfer_money(
        &self,
        source: &str,
        destination: &str,
        amount: Decimal,
    ) -> Result<(), AccountError> {
        let amount = validate_amount(amount)?;

        let source_lock = self.locks.lock_for(source);
        let destination_lock = self.locks.lock_for(destination);

        let _guards = if source == destination {
            (acquire(&source_lock), None)
        } else {
            let (source_guard, destination_guard) =
                self.acquire_pair(&source_lock, &destination_lock, source, destination)?;
            (source_guard, Some(destination_guard))
        };

        let result: Result<(), AccountError> = run_in_transaction(self.store.as_ref(), |tx| {
            debit(tx, source, amount)?;
            credit(tx, destination, amount)?;
            Ok(())
        });

        match &result {
            Ok(()) => debug!(source, destination, %amount, "Transfer completed"),
            Err(e) if e.is_domain() => {
                debug!(source, destination, %amount, code = e.code(), "Transfer rejected: {}", e)
            }
            Err(e) => warn!(source, destination, %amount, code = e.code(), "Transfer failed: {}", e),
        }
        result
    }

    /// Take both transfer locks without ever blocking on either
    ///
    /// Each attempt tries the source lock, then the destination lock. Unless
    /// both were taken, whichever guard this attempt got is dropped before
    /// backing off.
    fn acquire_pair<'l>(
        &self,
        source_lock: &'l Mutex<()>,
        destination_lock: &'l Mutex<()>,
        source: &str,
        destination: &str,
    ) -> Result<(MutexGuard<'l, ()>, MutexGuard<'l, ()>), AccountError> {
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            if let (Some(source_guard), Some(destination_guard)) =
                (try_acquire(source_lock), try_acquire(destination_lock))
            {
                return Ok((source_guard, destination_guard));
            }

            if let Some(max_attempts) = self.config.max_transfer_attempts {
                if attempts >= max_attempts {
                    warn!(source, destination, attempts, "Gave up acquiring transfer locks");
                    return Err(AccountError::lock_acquisition_timeout(
                        source,
                        destination,
                        attempts,
                    ));
                }
            }

            trace!(source, destination, attempts, "Transfer locks busy, backing off");
            thread::sleep(self.config.transfer_backoff);
        }
    }
}

// The account mutexes guard no data, so a poisoned one is still usable.
fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

fn try_acquire(lock: &Mutex<()>) -> Option<MutexGuard<'_, ()>> {
    match lock.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal, AccountError> {
    if amount < Decimal::ZERO {
        return Err(AccountError::invalid_amount(amount));
    }
    Ok(money::normalize(amount))
}

fn credit<S: BalanceStore + ?Sized>(
    tx: &mut UnitOfWork<'_, S>,
    account_id: &str,
    amount: Decimal,
) -> Result<Decimal, AccountError> {
    let mut account = tx
        .find(account_id)?
        .ok_or_else(|| AccountError::account_not_found(account_id))?;

    let balance = account
        .balance
        .checked_add(amount)
        .ok_or_else(|| AccountError::arithmetic_overflow(account_id))?;

    account.balance = money::normalize(balance);
    let balance = account.balance;
    tx.save(account);
    Ok(balance)
}

fn debit<S: BalanceStore + ?Sized>(
    tx: &mut UnitOfWork<'_, S>,
    account_id: &str,
    amount: Decimal,
) -> Result<Decimal, AccountError> {
    let mut account = tx
        .find(account_id)?
        .ok_or_else(|| AccountError::account_not_found(account_id))?;

    let balance = account
        .balance
        .checked_sub(amount)
        .map(money::normalize)
        .ok_or_else(|| AccountError::arithmetic_overflow(account_id))?;

    if balance < Decimal::ZERO {
        return Err(AccountError::insufficient_funds(account_id));
    }

    account.balance = balance;
    tx.save(account);
    Ok(balance)
}

fn log_outcome(
    operation: &str,
    account_id: &str,
    amount: Decimal,
    result: &Result<Decimal, AccountError>,
) {
    match result {
        Ok(balance) => debug!(operation, account_id, %amount, %balance, "Balance updated"),
        Err(e) if e.is_domain() => {
            debug!(operation, account_id, %amount, code = e.code(), "Operation rejected: {}", e)
        }
        Err(e) => warn!(operation, account_id, %amount, code = e.code(), "Operation failed: {}", e),
    }
}
