//! Core business logic module
//!
//! This module contains the balance mutation engine:
//! - `lock_registry` - per-user mutual exclusion, created lazily, never
//!   evicted
//! - `service` - validated, serialized read-modify-write with ledger
//!   recording
//! - `validation` - pure business-rule predicates

pub mod lock_registry;
pub mod service;
pub mod validation;

pub use lock_registry::{LockHandle, LockRegistry};
pub use service::BalanceLedgerService;
