//! Error types for the accounts engine
//!
//! This module defines every error the engine can surface to its caller.
//!
//! # Error Categories
//!
//! - **Domain outcomes**: account not found, insufficient funds. These are
//!   expected, deterministic results and are never retried.
//! - **Input errors**: negative amounts, arithmetic overflow.
//! - **Operational failures**: the balance store failed, or a bounded transfer
//!   gave up acquiring its locks.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure reported by a balance store
///
/// Stores are collaborators; whatever goes wrong inside them reaches the
/// engine's caller wrapped in [`AccountError::Store`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The backing storage could not serve the request
    #[error("Balance store unavailable: {message}")]
    Unavailable {
        /// Description of the failure
        message: String,
    },
}

impl StoreError {
    /// Create an Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }
}

/// Main error type for the accounts engine
///
/// Every engine operation returns `Result<_, AccountError>`. The two domain
/// kinds carry the identifier of the offending account.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccountError {
    /// Referenced account has no stored record
    #[error("Account {account_id} not found")]
    AccountNotFound {
        /// The identifier that was looked up
        account_id: String,
    },

    /// A debit would drive the balance below zero
    ///
    /// The balance is left untouched.
    #[error("Account {account_id} does not have enough money")]
    InsufficientFunds {
        /// The account that would have gone negative
        account_id: String,
    },

    /// Amount is negative
    #[error("Invalid amount {amount}: amounts must not be negative")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Balance arithmetic would overflow the decimal range
    #[error("Arithmetic overflow on account {account_id}")]
    ArithmeticOverflow {
        /// Account whose balance would overflow
        account_id: String,
    },

    /// A bounded transfer could not hold both account locks in time
    ///
    /// Only raised when a maximum attempt count is configured.
    #[error("Could not lock accounts {source_account} and {destination_account} after {attempts} attempts")]
    LockAcquisitionTimeout {
        /// Source account of the transfer
        source_account: String,
        /// Destination account of the transfer
        destination_account: String,
        /// Number of acquisition attempts made
        attempts: u32,
    },

    /// The balance store failed while the operation was running
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccountError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account_id: &str) -> Self {
        AccountError::AccountNotFound {
            account_id: account_id.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account_id: &str) -> Self {
        AccountError::InsufficientFunds {
            account_id: account_id.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        AccountError::InvalidAmount { amount }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(account_id: &str) -> Self {
        AccountError::ArithmeticOverflow {
            account_id: account_id.to_string(),
        }
    }

    /// Create a LockAcquisitionTimeout error
    pub fn lock_acquisition_timeout(source: &str, destination: &str, attempts: u32) -> Self {
        AccountError::LockAcquisitionTimeout {
            source_account: source.to_string(),
            destination_account: destination.to_string(),
            attempts,
        }
    }

    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            AccountError::InsufficientFunds { .. } => "ACCOUNT_NOT_ENOUGH_MONEY",
            AccountError::InvalidAmount { .. } => "INVALID_AMOUNT",
            AccountError::ArithmeticOverflow { .. } => "ARITHMETIC_OVERFLOW",
            AccountError::LockAcquisitionTimeout { .. } => "LOCK_TIMEOUT",
            AccountError::Store(_) => "STORE_FAILURE",
        }
    }

    /// Whether this is an expected domain outcome rather than an operational failure
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            AccountError::AccountNotFound { .. } | AccountError::InsufficientFunds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::account_not_found(
        AccountError::AccountNotFound { account_id: "abc".to_string() },
        "Account abc not found"
    )]
    #[case::insufficient_funds(
        AccountError::InsufficientFunds { account_id: "abc".to_string() },
        "Account abc does not have enough money"
    )]
    #[case::invalid_amount(
        AccountError::InvalidAmount { amount: Decimal::new(-1000, 2) },
        "Invalid amount -10.00: amounts must not be negative"
    )]
    #[case::arithmetic_overflow(
        AccountError::ArithmeticOverflow { account_id: "abc".to_string() },
        "Arithmetic overflow on account abc"
    )]
    #[case::lock_timeout(
        AccountError::LockAcquisitionTimeout { source_account: "a".to_string(), destination_account: "b".to_string(), attempts: 3 },
        "Could not lock accounts a and b after 3 attempts"
    )]
    #[case::store_unavailable(
        AccountError::Store(StoreError::Unavailable { message: "disk full".to_string() }),
        "Balance store unavailable: disk full"
    )]
    fn test_error_display(#[case] error: AccountError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::account_not_found(AccountError::account_not_found("x"), "ACCOUNT_NOT_FOUND", true)]
    #[case::insufficient_funds(AccountError::insufficient_funds("x"), "ACCOUNT_NOT_ENOUGH_MONEY", true)]
    #[case::invalid_amount(AccountError::invalid_amount(Decimal::NEGATIVE_ONE), "INVALID_AMOUNT", false)]
    #[case::lock_timeout(AccountError::lock_acquisition_timeout("a", "b", 1), "LOCK_TIMEOUT", false)]
    #[case::store(AccountError::Store(StoreError::unavailable("down")), "STORE_FAILURE", false)]
    fn test_codes_and_domain_classification(
        #[case] error: AccountError,
        #[case] code: &str,
        #[case] domain: bool,
    ) {
        assert_eq!(error.code(), code);
        assert_eq!(error.is_domain(), domain);
    }

    #[test]
    fn test_store_error_conversion() {
        let error: AccountError = StoreError::unavailable("connection reset").into();
        assert!(matches!(error, AccountError::Store(StoreError::Unavailable { .. })));
        assert_eq!(error.to_string(), "Balance store unavailable: connection reset");
    }
}
