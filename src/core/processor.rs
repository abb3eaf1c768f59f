//! Command routing for the CLI driver
//!
//! This module provides the `CommandProcessor`, which maps caller aliases to
//! engine account ids and routes each parsed [`Command`] to the matching
//! `BalanceEngine` operation.
//!
//! Aliases are bound by `create` commands. Any alias that was never bound is
//! passed to the engine verbatim, so it resolves to `AccountNotFound` unless
//! it happens to be a real account id.

use crate::core::engine::BalanceEngine;
use crate::core::traits::BalanceStore;
use crate::types::{AccountBalance, AccountError, AccountId, Command};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::warn;

/// Successful result of one command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// A new account was opened under this id
    Created(AccountId),
    /// Balance after the operation (or the current balance for `balance`)
    Balance(Decimal),
    /// The transfer was applied
    Transferred,
}

/// Routes commands to a shared balance engine
///
/// Safe to share between threads; the alias table is a `DashMap`.
pub struct CommandProcessor<S: BalanceStore> {
    engine: BalanceEngine<S>,
    aliases: DashMap<String, AccountId>,
}

impl<S: BalanceStore> CommandProcessor<S> {
    /// Create a processor with no bound aliases
    pub fn new(engine: BalanceEngine<S>) -> Self {
        Self {
            engine,
            aliases: DashMap::new(),
        }
    }

    /// The engine commands are applied to
    pub fn engine(&self) -> &BalanceEngine<S> {
        &self.engine
    }

    /// Account id bound to `alias`, or `alias` itself when unbound
    pub fn resolve(&self, alias: &str) -> AccountId {
        self.aliases
            .get(alias)
            .map(|id| id.value().clone())
            .unwrap_or_else(|| alias.to_string())
    }

    /// Apply a single command
    ///
    /// # Errors
    ///
    /// Whatever the engine operation returns; domain outcomes such as
    /// `InsufficientFunds` come back as `Err` and leave balances untouched.
    pub fn process(&self, command: &Command) -> Result<CommandOutcome, AccountError> {
        match command {
            Command::Create { account } => {
                let id = self.engine.create_account()?;
                if let Some(previous) = self.aliases.insert(account.clone(), id.clone()) {
                    warn!(alias = %account, previous = %previous, "Alias rebound to a new account");
                }
                Ok(CommandOutcome::Created(id))
            }
            Command::Increase { account, amount } => self
                .engine
                .increase_balance(&self.resolve(account), *amount)
                .map(CommandOutcome::Balance),
            Command::Reduce { account, amount } => self
                .engine
                .reduce_balance(&self.resolve(account), *amount)
                .map(CommandOutcome::Balance),
            Command::Transfer {
                account,
                target,
                amount,
            } => self
                .engine
                .transfer_money(&self.resolve(account), &self.resolve(target), *amount)
                .map(|()| CommandOutcome::Transferred),
            Command::Balance { account } => self
                .engine
                .get_balance(&self.resolve(account))
                .map(CommandOutcome::Balance),
        }
    }

    /// Current balance of every bound alias, sorted by alias
    pub fn balances(&self) -> Result<Vec<AccountBalance>, AccountError> {
        let mut balances = self
            .aliases
            .iter()
            .map(|entry| {
                Ok(AccountBalance {
                    account: entry.key().clone(),
                    balance: self.engine.get_balance(entry.value())?,
                })
            })
            .collect::<Result<Vec<_>, AccountError>>()?;

        balances.sort_by(|a, b| a.account.cmp(&b.account));
        Ok(balances)
    }
}
