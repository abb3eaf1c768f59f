//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates command processing by coordinating
//! between the SyncReader (for CSV input) and CommandProcessor (for business logic).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Alias resolution and engine calls to `CommandProcessor`
//! - CSV output to `csv_format::write_balances_csv` (format handling)
//!
//! Commands are applied strictly in input order, so the output is fully
//! determined by the input file.

use crate::core::{BalanceEngine, CommandProcessor, EngineConfig, InMemoryBalanceStore};
use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{log_command_failure, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use accounts_engine::core::EngineConfig;
/// use accounts_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(EngineConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("commands.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    engine_config: EngineConfig,
}

impl SyncProcessingStrategy {
    /// Create a sync strategy whose engine uses `engine_config`
    pub fn new(engine_config: EngineConfig) -> Self {
        Self { engine_config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process commands from input file and write balances to output
    ///
    /// This method orchestrates the complete synchronous processing pipeline:
    /// 1. Creates a SyncReader to stream command records from the CSV file
    /// 2. Creates a CommandProcessor over a fresh in-memory store
    /// 3. Applies each command in order
    /// 4. Writes the balance of every created account
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    /// Individual command errors are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let reader = SyncReader::new(input_path)?;

        let store = Arc::new(InMemoryBalanceStore::new());
        let engine = BalanceEngine::with_config(store, self.engine_config.clone());
        let processor = CommandProcessor::new(engine);

        for result in reader {
            match result {
                Ok(command) => match processor.process(&command) {
                    Ok(outcome) => debug!(?command, ?outcome, "Command applied"),
                    Err(e) => log_command_failure(&command, &e),
                },
                Err(e) => warn!("CSV parsing error: {}", e),
            }
        }

        let balances = processor
            .balances()
            .map_err(|e| format!("Failed to read final balances: {}", e))?;

        write_balances_csv(&balances, output)?;

        Ok(())
    }
}
