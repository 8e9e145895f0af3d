//! Balance type for the point ledger engine
//!
//! This module defines the per-user balance snapshot returned by the
//! balance store and by the service's mutation operations.

use super::ledger::UserId;
use chrono::{DateTime, Utc};

/// Current point balance of one user
///
/// Absence of a `Balance` for a user id means the user has never charged.
/// The balance store owns this data; the engine never caches it across
/// calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    /// The user this balance belongs to
    pub user_id: UserId,

    /// Current amount in points, never negative
    pub amount: i64,

    /// When the balance was last written, stamped by the store
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    /// Create a balance snapshot stamped with the current time
    ///
    /// Used by store implementations when committing a write.
    pub fn new(user_id: UserId, amount: i64) -> Self {
        Balance {
            user_id,
            amount,
            updated_at: Utc::now(),
        }
    }
}
