//! Accounts Engine Library
//! # Overview
//!
//! This library keeps monetary balances for accounts and applies balance
//! operations from many threads at once without losing updates, overdrawing
//! accounts or deadlocking.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Command, AccountError, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::lock_registry`] - One lazily created mutex per account id
//!   - [`core::transaction`] - Transactional boundary over a balance store
//!   - [`core::engine`] - Locked balance operations and the transfer protocol
//!   - [`core::balance_store`] - In-memory balance store
//!   - [`core::processor`] / [`core::batch_processor`] - Command routing for the CLI
//! - [`io`] - CSV input and output
//! - [`strategy`] - Sync and async processing pipelines
//! - [`logging`] - Tracing subscriber setup
//!
//! # Operations
//!
//! - **Create**: Open an account with a zero balance
//! - **Increase**: Credit an account
//! - **Reduce**: Debit an account (refused if the balance would go negative)
//! - **Transfer**: Move money between two accounts atomically
//! - **Balance**: Read an account's current balance
//!
//! All amounts are kept at two decimal places, rounded half-to-even.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use crate::core::{
    BalanceEngine, BalanceStore, EngineConfig, InMemoryBalanceStore, LockRegistry,
};
pub use io::write_balances_csv;
pub use types::{Account, AccountBalance, AccountError, AccountId, Command, StoreError};
