//! Synchronous processing strategy
//!
//! Single-threaded implementation of the ProcessingStrategy trait:
//! streams operations from CSV through the balance ledger service one at a
//! time and writes the final balances.
//!
//! # Error Handling
//!
//! Fatal errors (file not found, I/O errors) are returned immediately.
//! Individual operation rejections and malformed rows are logged and
//! processing continues.

use crate::core::BalanceLedgerService;
use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::store::{InMemoryBalanceStore, InMemoryLedgerStore};
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Synchronous processing strategy
///
/// Orchestrates the flow between CSV reading, the service, and output
/// generation without any concurrency. Useful as the reference pipeline:
/// its results for a given input are what the async pipeline must also
/// produce.
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy {
    /// Optional ceiling applied to charges
    max_balance: Option<i64>,
}

impl SyncProcessingStrategy {
    /// Create a sync strategy with the given charge ceiling
    pub fn new(max_balance: Option<i64>) -> Self {
        Self { max_balance }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let service = BalanceLedgerService::new(
            InMemoryBalanceStore::new(),
            InMemoryLedgerStore::new(),
        )
        .with_max_balance(self.max_balance);

        let reader = SyncReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(operation) => {
                    if let Err(error) = service.apply(&operation) {
                        warn!(user_id = operation.user_id, %error, "operation rejected");
                    }
                }
                Err(e) => warn!("CSV parsing error: {}", e),
            }
        }

        let balances = service.balance_store().snapshot();
        write_balances_csv(&balances, output)?;

        Ok(())
    }
}
