//! Command-related types for the accounts engine driver
//!
//! This module defines the commands a caller can submit and the parsed
//! record form the driver feeds to the command processor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Operations a caller can request from the engine
///
/// Each variant maps onto one engine operation. Accounts are referenced by
/// caller-chosen aliases; `Create` binds a freshly allocated account to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    /// Open a new account with a zero balance and bind it to the alias
    Create,

    /// Credit funds to an account
    Increase,

    /// Debit funds from an account
    ///
    /// Requires the balance to cover the amount.
    Reduce,

    /// Move funds from one account to another atomically
    Transfer,

    /// Read the current balance of an account
    Balance,
}

impl CommandType {
    /// Whether commands of this type must carry an amount
    pub fn requires_amount(self) -> bool {
        matches!(
            self,
            CommandType::Increase | CommandType::Reduce | CommandType::Transfer
        )
    }
}

/// A parsed command, ready for the processor
///
/// Accounts are referenced by alias. Each variant carries exactly the
/// fields its operation needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open an account and bind it to `account`
    Create { account: String },

    /// Credit `amount` to `account`
    Increase { account: String, amount: Decimal },

    /// Debit `amount` from `account`
    Reduce { account: String, amount: Decimal },

    /// Move `amount` from `account` to `target`
    Transfer {
        account: String,
        target: String,
        amount: Decimal,
    },

    /// Read the balance of `account`
    Balance { account: String },
}

impl Command {
    /// The operation this command requests
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Create { .. } => CommandType::Create,
            Command::Increase { .. } => CommandType::Increase,
            Command::Reduce { .. } => CommandType::Reduce,
            Command::Transfer { .. } => CommandType::Transfer,
            Command::Balance { .. } => CommandType::Balance,
        }
    }

    /// Alias of the account the command applies to (the source for transfers)
    pub fn account(&self) -> &str {
        match self {
            Command::Create { account }
            | Command::Increase { account, .. }
            | Command::Reduce { account, .. }
            | Command::Transfer { account, .. }
            | Command::Balance { account } => account,
        }
    }

    /// Alias of the receiving account, for transfers only
    pub fn target(&self) -> Option<&str> {
        match self {
            Command::Transfer { target, .. } => Some(target),
            _ => None,
        }
    }
}
