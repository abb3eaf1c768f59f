//! Accounts Engine CLI
//!
//! Command-line interface for applying balance commands from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > balances.csv
//! cargo run -- --strategy sync commands.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 commands.csv > balances.csv
//! cargo run -- --max-transfer-attempts 1000 --log-level info commands.csv > balances.csv
//! ```
//!
//! The program reads command records from the input CSV file, applies them
//! through the balance engine using the selected processing strategy, and
//! writes the final balance of every created account to stdout. Diagnostics
//! go to stderr.
//!
//! # Processing Strategies
//!
//! - **sync**: Commands applied one at a time in input order
//! - **async**: Batches applied concurrently on a multi-threaded runtime (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use accounts_engine::cli;
use accounts_engine::logging;
use accounts_engine::strategy;
use std::process;

fn main() {
    let args = cli::parse_args();

    if let Err(e) = logging::init_logging(&args.log_level) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), batch_config, args.to_engine_config())
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
