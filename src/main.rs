//! Point Ledger Engine CLI
//!
//! Command-line interface for applying point charge/use operations from
//! CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --strategy sync operations.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > balances.csv
//! cargo run -- --max-balance 100000 operations.csv > balances.csv
//! ```
//!
//! The program reads operation records from the input CSV file, applies
//! them through the balance ledger service using the selected strategy,
//! and writes the final balances to stdout. Logs go to stderr; set
//! `RUST_LOG` to adjust verbosity.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use point_ledger_engine::cli;
use point_ledger_engine::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Log to stderr so stdout stays clean for the balance CSV
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, args.max_balance, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}
