//! Asynchronous batch processing strategy
//!
//! Multi-threaded implementation of the ProcessingStrategy trait. Batches
//! are read sequentially so that one user's operations never reorder
//! across batches; within each batch, users are partitioned and applied on
//! concurrent tokio tasks. The per-user locks inside the service make this
//! safe; the partitioning makes it fast.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (user partitioning + task spawning)
//!     └── BalanceLedgerService (per-user locked mutations)
//! ```

use crate::core::BalanceLedgerService;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_balances_csv;
use crate::store::{InMemoryBalanceStore, InMemoryLedgerStore};
use crate::strategy::batch::BatchProcessor;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Number of worker threads for the tokio runtime
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
    /// Create a new BatchConfig, falling back to defaults for zero values
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                "Invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches, default.max_concurrent_batches
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
/// Operations are read in batches and each batch is applied with
/// user-based partitioning before the next batch is read, preserving
/// per-user input order across the whole file.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,

    /// Optional ceiling applied to charges
    max_balance: Option<i64>,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    pub fn new(config: BatchConfig, max_balance: Option<i64>) -> Self {
        Self {
            config,
            max_balance,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let service = Arc::new(
                BalanceLedgerService::new(
                    InMemoryBalanceStore::new(),
                    InMemoryLedgerStore::new(),
                )
                .with_max_balance(self.max_balance),
            );
            let processor = BatchProcessor::new(Arc::clone(&service));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            // Batches run one after another; a user whose operations span
            // two batches therefore keeps their order
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let _outcomes = processor.process_batch(batch).await;
            }

            let balances = service.balance_store().snapshot();
            write_balances_csv(&balances, output)?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.max_concurrent_batches, num_cpus::get());
    }

    #[test]
    fn test_batch_config_zero_values_fall_back() {
        let config = BatchConfig::new(0, 0);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.max_concurrent_batches, num_cpus::get());
    }

    #[test]
    fn test_batch_config_custom_values() {
        let config = BatchConfig::new(250, 4);
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.max_concurrent_batches, 4);
    }

    #[test]
    fn test_async_strategy_processes_operations() {
        let file = create_temp_csv(
            "type,user,amount\ncharge,1,1000\ncharge,2,500\nuse,1,250\nuse,2,500\n",
        );

        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), None);
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "user,balance\n1,750\n2,0\n");
    }

    #[test]
    fn test_async_strategy_preserves_per_user_order_across_batches() {
        // Tiny batch size forces user 1's operations across batches; the
        // use must still observe the preceding charge
        let file = create_temp_csv(
            "type,user,amount\ncharge,1,100\ncharge,2,100\ncharge,1,400\nuse,1,450\n",
        );

        let strategy = AsyncProcessingStrategy::new(BatchConfig::new(2, 2), None);
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "user,balance\n1,50\n2,100\n");
    }

    #[test]
    fn test_async_strategy_applies_ceiling() {
        let file = create_temp_csv("type,user,amount\ncharge,1,90000\ncharge,1,20000\n");

        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), Some(100000));
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "user,balance\n1,90000\n");
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default(), None);
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }
}
