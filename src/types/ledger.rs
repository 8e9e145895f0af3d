//! Ledger-related types for the point ledger engine
//!
//! This module defines operation kinds, marshaled input records, and the
//! immutable ledger record type used throughout the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identifier
///
/// Callers are expected to supply strictly positive ids; read operations
/// reject non-positive ids.
pub type UserId = i64;

/// Ledger record identifier, assigned by the ledger store
pub type RecordId = u64;

/// The two balance mutations supported by the engine
///
/// `Charge` credits points to a user's balance, `Use` debits them.
/// The same enum tags both parsed input operations and ledger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Credit points, creating the balance on first successful charge
    Charge,

    /// Debit points; requires an existing balance with sufficient points
    Use,
}

/// Input operation record
///
/// Represents a single charge/use request as marshaled from the front end
/// (CSV row, HTTP body, ...). The amount is optional at this layer so that
/// the service, not the parser, owns the rejection of absent amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// Whether this operation credits or debits the balance
    pub kind: OperationKind,

    /// The user the operation applies to
    pub user_id: UserId,

    /// Operation amount in points
    ///
    /// `None` when the input row carried no amount; the service rejects
    /// such operations with `InvalidAmount`.
    pub amount: Option<i64>,
}

/// Immutable log entry for one committed charge or use
///
/// Records carry the operation's own amount, not the resulting total.
/// Within one user's sequence, insertion order equals the order in which
/// the corresponding balance writes committed.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    /// Store-assigned monotonic identifier
    pub id: RecordId,

    /// The user whose balance the operation mutated
    pub user_id: UserId,

    /// Operation amount in points, always strictly positive
    pub amount: i64,

    /// Whether the operation was a charge or a use
    pub kind: OperationKind,

    /// Timestamp reported by the balance store for the underlying write
    pub occurred_at: DateTime<Utc>,
}
