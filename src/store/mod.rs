//! Storage collaborators for the point ledger engine
//!
//! This module defines the contracts the engine consumes:
//! - `BalanceStore` - key-value store mapping user id to balance
//! - `LedgerStore` - append-only store of per-user ledger records
//!
//! The contracts are deliberately infallible: the stores are in-process
//! collaborators assumed reliable, so a ledger append cannot fail after a
//! balance write has committed. A fallible external backend would need its
//! own adapter with an explicit failure policy.
//!
//! Neither store is required to be atomic across a read followed by a
//! write; making that sequence atomic per user is the engine's job, not
//! the store's.

use crate::types::{Balance, LedgerRecord, OperationKind, UserId};
use chrono::{DateTime, Utc};

pub mod memory;

pub use memory::{InMemoryBalanceStore, InMemoryLedgerStore};

/// Key-value store of per-user balances
///
/// Implementations must be safe for concurrent use; each individual call
/// is atomic, but sequences of calls are not.
pub trait BalanceStore: Send + Sync {
    /// Read the current balance for a user
    ///
    /// Returns `None` if the user has never been written.
    fn read(&self, user_id: UserId) -> Option<Balance>;

    /// Write a new balance amount for a user, stamping the update time
    ///
    /// Creates the row if it does not exist. Returns the committed
    /// snapshot including the store-assigned `updated_at`.
    fn write(&self, user_id: UserId, amount: i64) -> Balance;
}

/// Append-only store of per-user ledger records
pub trait LedgerStore: Send + Sync {
    /// Append a record to the user's sequence, assigning a monotonic id
    fn append(
        &self,
        user_id: UserId,
        amount: i64,
        kind: OperationKind,
        occurred_at: DateTime<Utc>,
    ) -> LedgerRecord;

    /// Read all records for a user in insertion order
    fn read_all(&self, user_id: UserId) -> Vec<LedgerRecord>;
}
