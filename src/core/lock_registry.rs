//! Per-user lock registry
//!
//! This module provides the `LockRegistry`, a process-wide map from user id
//! to a mutual-exclusion handle. The registry is what makes the engine's
//! read-modify-write sequences atomic per user while letting unrelated
//! users proceed in parallel.
//!
//! # Design
//!
//! Handles are created lazily on first access and reused forever. The
//! registry is backed by `DashMap`, whose entry API makes the lazy creation
//! step itself race-free: concurrent callers requesting a handle for a
//! never-seen user id all receive the same `Arc<Mutex<()>>`, never two
//! distinct ones.
//!
//! # Resource Growth
//!
//! Entries are never evicted, so the registry grows monotonically with the
//! number of distinct user ids seen. Acceptable for bounded user
//! populations; a very large id space would need an eviction strategy this
//! module deliberately does not have.

use crate::types::UserId;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// Mutual-exclusion handle scoped to one user id
///
/// Cloning the handle is cheap and every clone guards the same user.
pub type LockHandle = Arc<Mutex<()>>;

/// Process-wide registry of per-user locks
///
/// Operations for different user ids never contend on each other's
/// handles; the only shared mutation is the lazy insertion of a new handle,
/// which DashMap serializes internally per shard.
#[derive(Debug, Default)]
pub struct LockRegistry {
    /// Map of user ids to their mutual-exclusion handles
    locks: DashMap<UserId, LockHandle>,
}

impl LockRegistry {
    /// Create a registry with no handles
    pub fn new() -> Self {
        LockRegistry {
            locks: DashMap::new(),
        }
    }

    /// Get the lock handle for a user, creating it on first access
    ///
    /// The creation happens exactly once per user id even under concurrent
    /// first-time access; all callers observe the same handle. The handle
    /// serializes mutations for this user id only.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user id to acquire a handle for
    ///
    /// # Returns
    ///
    /// A clone of the user's `LockHandle`
    pub fn acquire(&self, user_id: UserId) -> LockHandle {
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of user ids that have ever requested a handle
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no handle has been created yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
