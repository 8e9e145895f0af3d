//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `balance`: Per-user balance snapshot
//! - `ledger`: Operation and ledger record types and identifiers
//! - `error`: Error types for the point ledger engine

pub mod balance;
pub mod error;
pub mod ledger;

pub use balance::Balance;
pub use error::LedgerError;
pub use ledger::{LedgerRecord, OperationKind, OperationRecord, RecordId, UserId};
