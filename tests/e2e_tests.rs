//! End-to-end integration tests
//!
//! These tests validate the complete command processing pipeline using
//! predefined CSV test fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Applies all commands through the engine
//! 3. Generates output CSV
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - The reference scenario and ordinary account flows
//! - Transfers (opposite directions, self-transfers, insufficient funds)
//! - Alias handling (rebinding, commands before their create, unknown aliases)
//! - Rounding, malformed rows and empty input
//!
//! Each fixture runs with both strategies; the async strategy must produce
//! the same output as the sync one.

#[cfg(test)]
mod tests {
    use accounts_engine::cli::StrategyType;
    use accounts_engine::core::EngineConfig;
    use accounts_engine::strategy::{create_strategy, BatchConfig};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// Run a test fixture by processing input.csv and comparing with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Input or expected files cannot be read
    /// - Output doesn't match expected
    fn run_test_fixture(
        fixture_name: &str,
        strategy_type: StrategyType,
        batch_config: Option<BatchConfig>,
    ) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let strategy = create_strategy(strategy_type.clone(), batch_config, EngineConfig::default());

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to process commands: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both processing strategies
    #[rstest]
    #[case("scenario")]
    #[case("happy_path")]
    #[case("opposite_transfers")]
    #[case("self_transfer")]
    #[case("alias_rebinding")]
    #[case("interleaved_accounts")]
    #[case("concurrent_increases")]
    #[case("insufficient_funds")]
    #[case("unknown_accounts")]
    #[case("precision_testing")]
    #[case("malformed_data")]
    #[case("no_accounts")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy, None);
    }

    /// Small batches split related commands across batch boundaries
    #[rstest]
    #[case("scenario")]
    #[case("interleaved_accounts")]
    fn test_fixtures_with_small_batches(#[case] fixture: &str, #[values(1, 2, 7)] batch_size: usize) {
        let batch_config = BatchConfig::new(batch_size, num_cpus::get());
        run_test_fixture(fixture, StrategyType::Async, Some(batch_config));
    }
}
