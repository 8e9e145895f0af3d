//! Processing strategy module
//!
//! This module defines the Strategy pattern for complete operation
//! processing pipelines, encompassing CSV input, service application, and
//! balance output. Different implementations (synchronous, asynchronous
//! batch) are selected at runtime.

use crate::cli::StrategyType;
use std::io::Write;
use std::path::Path;

pub mod batch;
pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use batch::{BatchProcessor, OperationOutcome};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete operation pipelines
///
/// Each strategy reads charge/use operations from a CSV file, applies them
/// through the balance ledger service, and writes the final balances to
/// output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from the input file and write balances to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing operations
    /// * `output` - Writer receiving the final balance CSV
    ///
    /// # Errors
    ///
    /// Returns an error message for fatal failures (file not found, I/O
    /// error, runtime construction failure). Individual operation
    /// rejections and malformed rows are logged and skipped; they never
    /// abort processing.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Which pipeline to build (Sync or Async)
/// * `max_balance` - Optional ceiling applied to charges
/// * `config` - Optional batch configuration (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    max_balance: Option<i64>,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(max_balance)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, max_balance))
        }
    }
}
