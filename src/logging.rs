//! Logging setup for the CLI binary
//!
//! Diagnostics go to stderr so that stdout carries nothing but the balance CSV.
//! `RUST_LOG` takes precedence over the level passed on the command line.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber
///
/// Returns an error if a subscriber was already installed.
pub fn init_logging(level: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_only_succeeds_once() {
        let first = init_logging("debug");
        let second = init_logging("debug");

        assert!(first.is_ok());
        assert!(second.unwrap_err().contains("Failed to initialize logging"));
    }
}
