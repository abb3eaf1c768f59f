//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. Commands are read in batches and each batch is
//! applied concurrently through a shared balance engine.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (alias groups on bounded blocking tasks)
//!     └── CommandProcessor (alias table)
//!         └── BalanceEngine (per-account locks + transactional store)
//! ```
//!
//! # Ordering
//!
//! Batches are processed one after another, so every command of batch N
//! finishes before batch N+1 is read. Inside a batch, commands touching a
//! common alias run in input order and unrelated commands run in parallel,
//! so the final balances always equal the synchronous strategy's.

use crate::core::{
    BalanceEngine, BatchProcessor, CommandProcessor, EngineConfig, InMemoryBalanceStore,
};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_balances_csv;
use crate::strategy::{log_command_failure, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for batch processing
///
/// Controls how commands are batched and how many of them run at once.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,
    /// Maximum number of commands running concurrently (also the worker thread count)
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size,
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                "Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches,
                default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Final balances always equal the synchronous strategy's for the same input.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    engine_config: EngineConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    /// * `engine_config` - Balance engine configuration
    pub fn new(config: BatchConfig, engine_config: EngineConfig) -> Self {
        Self {
            config,
            engine_config,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process commands from input file and write balances to output
    ///
    /// This method implements the complete asynchronous batch processing pipeline:
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Builds the shared engine, command processor and batch processor
    /// 3. Reads commands in batches from CSV using AsyncReader
    /// 4. Processes each batch to completion before reading the next one
    /// 5. Writes the balance of every created account
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are returned immediately.
    /// Individual command errors are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let store = Arc::new(InMemoryBalanceStore::new());
            let engine = BalanceEngine::with_config(store, self.engine_config.clone());
            let processor = Arc::new(CommandProcessor::new(engine));
            let batch_processor =
                BatchProcessor::new(Arc::clone(&processor), self.config.max_concurrent_batches);

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // csv-async reads futures-io, tokio files implement tokio-io
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                debug!(size = batch.len(), "Processing batch");
                for result in batch_processor.process_batch(batch).await {
                    if let Err(e) = &result.result {
                        log_command_failure(&result.command, e);
                    }
                }
            }

            let balances = processor
                .balances()
                .map_err(|e| format!("Failed to read final balances: {}", e))?;

            write_balances_csv(&balances, output)?;

            Ok(())
        })
    }
}
