//! Core business logic module
//!
//! This module contains the concurrency-and-consistency layer:
//! - `traits` - Balance store abstraction
//! - `balance_store` - In-memory balance store
//! - `transaction` - Transactional boundary (unit of work)
//! - `lock_registry` - Per-account mutexes
//! - `engine` - Locked read-modify-write operations and the transfer protocol
//! - `processor` - Routes CLI commands to the engine
//! - `batch_processor` - Concurrent batch execution for the async strategy

pub mod balance_store;
pub mod batch_processor;
pub mod engine;
pub mod lock_registry;
pub mod processor;
pub mod traits;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use balance_store::InMemoryBalanceStore;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::{BalanceEngine, EngineConfig};
pub use lock_registry::{AccountLock, LockRegistry};
pub use processor::{CommandOutcome, CommandProcessor};
pub use traits::BalanceStore;
pub use transaction::{run_in_transaction, UnitOfWork};
