//! In-memory store implementations
//!
//! DashMap-backed implementations of the storage contracts. Both are safe
//! for concurrent use: individual calls are atomic, sequences of calls are
//! not, matching the contracts in the parent module.
//!
//! `InMemoryBalanceStore` optionally sleeps on every call. The original
//! storage tables this mirrors throttled each access, which is what made
//! unsynchronized read-modify-write sequences observably lose updates;
//! concurrency tests use the same trick to widen the race window so a
//! missing lock fails loudly instead of passing by luck.

use crate::store::{BalanceStore, LedgerStore};
use crate::types::{Balance, LedgerRecord, OperationKind, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// In-memory balance table
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    /// Map of user ids to balance rows
    balances: DashMap<UserId, Balance>,

    /// Artificial per-call delay, used by tests to widen race windows
    latency: Option<Duration>,
}

impl InMemoryBalanceStore {
    /// Create an empty balance store
    pub fn new() -> Self {
        InMemoryBalanceStore {
            balances: DashMap::new(),
            latency: None,
        }
    }

    /// Create an empty balance store that sleeps on every read and write
    pub fn with_latency(latency: Duration) -> Self {
        InMemoryBalanceStore {
            balances: DashMap::new(),
            latency: Some(latency),
        }
    }

    /// Snapshot of all balance rows, in arbitrary order
    ///
    /// Concurrent writers may commit while the snapshot is taken; callers
    /// wanting a quiescent view must stop mutating first.
    pub fn snapshot(&self) -> Vec<Balance> {
        self.balances
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn throttle(&self) {
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn read(&self, user_id: UserId) -> Option<Balance> {
        self.throttle();
        self.balances.get(&user_id).map(|entry| entry.value().clone())
    }

    fn write(&self, user_id: UserId, amount: i64) -> Balance {
        self.throttle();
        let balance = Balance::new(user_id, amount);
        self.balances.insert(user_id, balance.clone());
        balance
    }
}

/// In-memory append-only ledger table
///
/// Record ids are assigned from a process-wide counter and are strictly
/// increasing in append order, across all users.
#[derive(Debug)]
pub struct InMemoryLedgerStore {
    /// Map of user ids to their record sequences, in insertion order
    records: DashMap<UserId, Vec<LedgerRecord>>,

    /// Next record id to assign
    next_id: AtomicU64,
}

impl InMemoryLedgerStore {
    /// Create an empty ledger store
    pub fn new() -> Self {
        InMemoryLedgerStore {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(
        &self,
        user_id: UserId,
        amount: i64,
        kind: OperationKind,
        occurred_at: DateTime<Utc>,
    ) -> LedgerRecord {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = LedgerRecord {
            id,
            user_id,
            amount,
            kind,
            occurred_at,
        };

        self.records
            .entry(user_id)
            .or_default()
            .push(record.clone());

        record
    }

    fn read_all(&self, user_id: UserId) -> Vec<LedgerRecord> {
        self.records
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}
