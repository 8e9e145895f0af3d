//! CSV format handling for operation input and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV rows to domain operation records
//! - Balance output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{Balance, OperationKind, OperationRecord, UserId};
use serde::Deserialize;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, user, amount.
/// The amount stays a raw optional string here; the conversion step parses
/// it and the service rejects operations whose amount is absent.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub user: UserId,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to an OperationRecord
///
/// Parses the operation type (case-insensitive `charge`/`use`) and the
/// amount as a signed integer. A blank or missing amount becomes `None`
/// rather than an error, so the business rule for absent amounts lives in
/// the service, not the parser.
///
/// # Errors
///
/// Returns an error message for an unknown operation type or an amount
/// that is present but not an integer.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, String> {
    let kind = match csv_record.op_type.to_lowercase().as_str() {
        "charge" => OperationKind::Charge,
        "use" => OperationKind::Use,
        _ => {
            return Err(format!(
                "Invalid operation type: '{}' for user {}",
                csv_record.op_type, csv_record.user
            ))
        }
    };

    // Parse amount if present
    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match amount_str.trim().parse::<i64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    return Err(format!(
                        "Invalid amount '{}' for user {}",
                        amount_str, csv_record.user
                    ))
                }
            }
        }
        _ => None,
    };

    Ok(OperationRecord {
        kind,
        user_id: csv_record.user,
        amount,
    })
}

/// Write balance rows to CSV format
///
/// Writes balances with columns: user, balance. Rows are sorted by user id
/// for deterministic output; timestamps are deliberately omitted.
///
/// # Errors
///
/// Returns an error message if a write fails.
pub fn write_balances_csv(balances: &[Balance], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_balances = balances.to_vec();
    sorted_balances.sort_by_key(|balance| balance.user_id);

    for balance in sorted_balances {
        writer
            .write_record(&[balance.user_id.to_string(), balance.amount.to_string()])
            .map_err(|e| format!("Failed to write balance record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
