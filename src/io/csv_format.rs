//! CSV format handling for command records and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to commands
//! - Balance output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{AccountBalance, Command, CommandType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, account, target, amount.
/// `target` and `amount` are optional because only some commands use them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub command: String,
    pub account: String,
    pub target: Option<String>,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to a Command
///
/// This function:
/// - Parses the command type string (case-insensitive)
/// - Parses the amount string into a Decimal (if present)
/// - Validates that amounts are present for increase/reduce/transfer
/// - Validates that transfers name a target
///
/// # Returns
///
/// Result containing either:
/// - Ok(Command) - Successfully converted command
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Command, String> {
    let command_type = match csv_record.command.to_lowercase().as_str() {
        "create" => CommandType::Create,
        "increase" => CommandType::Increase,
        "reduce" => CommandType::Reduce,
        "transfer" => CommandType::Transfer,
        "balance" => CommandType::Balance,
        _ => {
            return Err(format!(
                "Invalid command type: '{}' for account '{}'",
                csv_record.command, csv_record.account
            ))
        }
    };

    let account = csv_record.account.trim().to_string();
    if account.is_empty() {
        return Err(format!("{:?} command requires an account", command_type));
    }

    // Parse amount if present
    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match Decimal::from_str(amount_str.trim()) {
                Ok(decimal) => Some(decimal),
                Err(_) => {
                    return Err(format!(
                        "Invalid amount '{}' for account '{}'",
                        amount_str, account
                    ))
                }
            }
        }
        _ => None,
    };

    let amount = match (command_type.requires_amount(), amount) {
        (true, None) => {
            return Err(format!(
                "{:?} command for account '{}' requires an amount",
                command_type, account
            ))
        }
        // Amounts on create/balance are ignored
        (_, amount) => amount.unwrap_or_default(),
    };

    let command = match command_type {
        CommandType::Create => Command::Create { account },
        CommandType::Increase => Command::Increase { account, amount },
        CommandType::Reduce => Command::Reduce { account, amount },
        CommandType::Balance => Command::Balance { account },
        CommandType::Transfer => {
            let target = csv_record
                .target
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    format!("Transfer command for account '{}' requires a target", account)
                })?;
            Command::Transfer {
                account,
                target,
                amount,
            }
        }
    };

    Ok(command)
}

/// Write account balances to CSV format
///
/// Writes balances in CSV format with columns: account, balance.
/// Rows are sorted by account alias for deterministic output and balances are
/// printed with exactly two fractional digits.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_balances_csv(balances: &[AccountBalance], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    // Write header
    writer
        .write_record(["account", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = balances.to_vec();
    sorted.sort_by(|a, b| a.account.cmp(&b.account));

    for entry in sorted {
        writer
            .write_record(&[entry.account, format!("{:.2}", entry.balance)])
            .map_err(|e| format!("Failed to write balance record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
