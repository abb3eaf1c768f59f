//! Account-related types for the accounts engine
//!
//! This module defines the Account structure held by a balance store and the
//! identifier type used to look accounts up.

use super::money;
use rust_decimal::Decimal;

/// Account identifier
///
/// Opaque string allocated by the balance store when the account is created.
/// The in-memory store hands out UUID v4 strings.
pub type AccountId = String;

/// Stored account state
///
/// A single balance with two fractional digits. The balance is never
/// persisted below zero; the engine rejects any mutation that would do so.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account identifier
    pub id: AccountId,

    /// Current balance, scale 2
    pub balance: Decimal,
}

impl Account {
    /// Create a new account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier allocated for this account
    ///
    /// # Returns
    ///
    /// A new Account with balance = 0.00
    pub fn new(id: impl Into<AccountId>) -> Self {
        Account {
            id: id.into(),
            balance: money::normalize(Decimal::ZERO),
        }
    }

    /// Create an account with the given balance, normalized to scale 2
    pub fn with_balance(id: impl Into<AccountId>, balance: Decimal) -> Self {
        Account {
            id: id.into(),
            balance: money::normalize(balance),
        }
    }
}

/// Balance reported for an account alias
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    /// Caller-facing alias of the account
    pub account: String,

    /// Current balance, scale 2
    pub balance: Decimal,
}
