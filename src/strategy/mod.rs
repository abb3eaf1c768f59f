//! Processing strategy module for command processing
//!
//! This module defines the Strategy pattern for complete command processing pipelines,
//! encompassing both CSV parsing and balance engine processing. This allows different
//! processing implementations (synchronous, asynchronous batch) to be selected at runtime.

use crate::cli::StrategyType;
use crate::core::EngineConfig;
use crate::types::{AccountError, Command};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete command processing pipelines
///
/// Each strategy reads commands from a CSV file, applies them through a
/// balance engine, and writes the final balance of every created account.
pub trait ProcessingStrategy: Send + Sync {
    /// Process commands from input file and write balances to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing command records
    /// * `output` - Mutable reference to a writer for outputting balances
    ///
    /// # Returns
    ///
    /// * `Ok(())` if all processing completed (possibly with per-command failures)
    /// * `Err(String)` if a fatal error occurred (file not found, I/O error, etc.)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission denied)
    /// - A fatal I/O error occurs during reading or writing
    /// - Output cannot be written
    ///
    /// Individual command failures (unknown account, insufficient funds,
    /// malformed rows) are logged and processing continues with the next command.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `batch_config` - Optional configuration for async batch processing (ignored for sync)
/// * `engine_config` - Balance engine configuration shared by both strategies
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    batch_config: Option<BatchConfig>,
    engine_config: EngineConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(engine_config)),
        StrategyType::Async => {
            let batch_config = batch_config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(batch_config, engine_config))
        }
    }
}

/// Log a failed command at a level matching its cause
///
/// Domain refusals are expected outcomes of the input and stay at info;
/// everything else points at the engine or the store.
pub(crate) fn log_command_failure(command: &Command, error: &AccountError) {
    if error.is_domain() {
        info!(code = error.code(), command = ?command.command_type(), account = command.account(), "{}", error);
    } else {
        warn!(code = error.code(), command = ?command.command_type(), account = command.account(), "{}", error);
    }
    debug!(?command, "Command rejected");
}
