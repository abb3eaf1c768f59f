use crate::core::EngineConfig;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Apply balance commands concurrently and print final balances
#[derive(Parser, Debug)]
#[command(name = "accounts-engine")]
#[command(about = "Apply account balance commands and print final balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing command records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy to use for applying commands
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for in-order or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of commands per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrently running commands (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of commands running concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Pause between transfer lock attempts
    #[arg(
        long = "transfer-backoff-ms",
        value_name = "MILLIS",
        default_value_t = 1,
        help = "Milliseconds to wait before retrying a transfer whose locks were busy"
    )]
    pub transfer_backoff_ms: u64,

    /// Upper bound on transfer lock attempts
    #[arg(
        long = "max-transfer-attempts",
        value_name = "COUNT",
        help = "Fail a transfer after this many lock attempts (default: retry forever)"
    )]
    pub max_transfer_attempts: Option<u32>,

    /// Log level used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log filter for stderr diagnostics, e.g. 'info' or 'accounts_engine=debug'"
    )]
    pub log_level: String,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values are replaced by
    /// the defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create an EngineConfig from CLI arguments
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::new(
            Duration::from_millis(self.transfer_backoff_ms),
            self.max_transfer_attempts,
        )
    }
}
