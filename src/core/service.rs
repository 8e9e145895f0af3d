//! Balance mutation and ledger recording service
//!
//! This module provides the `BalanceLedgerService`, the orchestrator that
//! validates operations, serializes balance mutations per user through the
//! `LockRegistry`, and records every committed mutation in the ledger.
//!
//! # Concurrency
//!
//! The service is `Send + Sync` and designed to be shared behind an `Arc`
//! across threads or tasks. For a fixed user id, charge and use calls are
//! totally ordered: the user's lock is held across the entire
//! read-modify-write-append sequence, so if one call's lock acquisition
//! happens before another's, its balance write and ledger append are fully
//! visible before the other's read begins. Calls for different user ids
//! have no ordering relative to each other and never block one another.
//!
//! The read-only queries take no lock at all. A reader racing a writer for
//! the same user observes either the previous or the new committed value,
//! with whatever single-call atomicity the balance store provides; this is
//! a deliberate trade for read throughput.
//!
//! Each operation acquires at most one lock, so no ordering of concurrent
//! calls can deadlock.

use std::sync::PoisonError;

use tracing::debug;

use crate::core::lock_registry::LockRegistry;
use crate::core::validation;
use crate::store::{BalanceStore, LedgerStore};
use crate::types::{Balance, LedgerError, LedgerRecord, OperationKind, OperationRecord, UserId};

/// Orchestrates validated, serialized balance mutations and their ledger
/// records
///
/// Generic over its two storage collaborators so tests can substitute
/// instrumented implementations. The lock registry is owned by the service;
/// the stores are passed in at construction.
pub struct BalanceLedgerService<B, L> {
    /// Balance rows, owned by the store and never cached across calls
    balances: B,

    /// Append-only ledger of committed mutations
    ledger: L,

    /// Per-user mutual exclusion for the read-modify-write-append sequence
    locks: LockRegistry,

    /// Optional ceiling on the balance a charge may produce
    max_balance: Option<i64>,
}

impl<B: BalanceStore, L: LedgerStore> BalanceLedgerService<B, L> {
    /// Create a service with no balance ceiling
    pub fn new(balances: B, ledger: L) -> Self {
        BalanceLedgerService {
            balances,
            ledger,
            locks: LockRegistry::new(),
            max_balance: None,
        }
    }

    /// Set or clear the balance ceiling applied to charges
    ///
    /// `None` leaves charges unbounded (up to the representation limit).
    pub fn with_max_balance(mut self, max_balance: Option<i64>) -> Self {
        self.max_balance = max_balance;
        self
    }

    /// The balance store this service writes through
    pub fn balance_store(&self) -> &B {
        &self.balances
    }

    /// The ledger store this service appends to
    pub fn ledger_store(&self) -> &L {
        &self.ledger
    }

    /// Apply a marshaled input operation
    ///
    /// Routes the record to `charge` or `use_points`, rejecting operations
    /// whose amount is absent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` when the record carries no amount, plus any
    /// error of the routed operation.
    pub fn apply(&self, record: &OperationRecord) -> Result<Balance, LedgerError> {
        let amount = record
            .amount
            .ok_or_else(|| LedgerError::invalid_amount(None))?;

        match record.kind {
            OperationKind::Charge => self.charge(record.user_id, amount),
            OperationKind::Use => self.use_points(record.user_id, amount),
        }
    }

    /// Credit points to a user's balance
    ///
    /// Holds the user's lock for the whole sequence: read the current
    /// balance (absent reads as zero), add the amount, check the ceiling,
    /// write the new balance, then append a CHARGE record carrying the
    /// operation amount and the store-reported update time. The first
    /// successful charge provisions the user's balance row.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - amount is not strictly positive; checked before
    ///   the lock is taken, no store is touched
    /// * `BalanceOverflow` - the addition would overflow
    /// * `AmountExceedsLimit` - a configured ceiling would be exceeded
    pub fn charge(&self, user_id: UserId, amount: i64) -> Result<Balance, LedgerError> {
        validation::validate_amount(amount)?;

        let lock = self.locks.acquire(user_id);
        // A poisoned handle only means another caller panicked mid-flight;
        // the stores hold the authoritative state, so recover the guard.
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.balances.read(user_id).map_or(0, |b| b.amount);
        let new_amount = current
            .checked_add(amount)
            .ok_or_else(|| LedgerError::balance_overflow(user_id))?;
        validation::validate_ceiling(user_id, new_amount, self.max_balance)?;

        let updated = self.balances.write(user_id, new_amount);
        let record = self
            .ledger
            .append(user_id, amount, OperationKind::Charge, updated.updated_at);

        debug!(
            user_id,
            amount,
            balance = updated.amount,
            record_id = record.id,
            "charge committed"
        );
        Ok(updated)
    }

    /// Debit points from a user's balance
    ///
    /// Holds the user's lock for the whole sequence: read the current
    /// balance, check existence and sufficiency, write the reduced balance,
    /// then append a USE record. A rejected use never provisions a balance
    /// row and never produces a ledger record.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` - amount is not strictly positive
    /// * `UserNotFound` - the user has never charged
    /// * `InsufficientBalance` - the balance does not cover the amount
    pub fn use_points(&self, user_id: UserId, amount: i64) -> Result<Balance, LedgerError> {
        validation::validate_amount(amount)?;

        let lock = self.locks.acquire(user_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self
            .balances
            .read(user_id)
            .ok_or_else(|| LedgerError::user_not_found(user_id))?;
        validation::validate_sufficient(user_id, current.amount, amount)?;

        // Sufficiency was checked under the lock, so this cannot go negative
        let updated = self.balances.write(user_id, current.amount - amount);
        let record = self
            .ledger
            .append(user_id, amount, OperationKind::Use, updated.updated_at);

        debug!(
            user_id,
            amount,
            balance = updated.amount,
            record_id = record.id,
            "use committed"
        );
        Ok(updated)
    }

    /// Read a user's current balance without locking
    ///
    /// Returns `None` for a user that has never charged. The read is not
    /// synchronized against concurrent mutations for the same user.
    ///
    /// # Errors
    ///
    /// * `InvalidUserId` - the user id is not strictly positive
    pub fn balance(&self, user_id: UserId) -> Result<Option<Balance>, LedgerError> {
        validation::validate_user_id(user_id)?;
        Ok(self.balances.read(user_id))
    }

    /// Read a user's ledger records in insertion order, without locking
    ///
    /// # Errors
    ///
    /// * `InvalidUserId` - the user id is not strictly positive
    pub fn history(&self, user_id: UserId) -> Result<Vec<LedgerRecord>, LedgerError> {
        validation::validate_user_id(user_id)?;
        Ok(self.ledger.read_all(user_id))
    }
}
