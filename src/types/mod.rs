//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and identifiers
//! - `command`: Commands accepted by the driver
//! - `error`: Error types for the engine and its store
//! - `money`: Fixed-point scale and rounding rules

pub mod account;
pub mod command;
pub mod error;
pub mod money;

pub use account::{Account, AccountBalance, AccountId};
pub use command::{Command, CommandType};
pub use error::{AccountError, StoreError};
