//! Benchmark suite for lock contention behavior
//!
//! Compares charge throughput when all operations target one user (fully
//! serialized on that user's lock) against the same operation count spread
//! across distinct users (parallel). The spread case should scale with the
//! number of workers; the contended case cannot.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use point_ledger_engine::{BalanceLedgerService, InMemoryBalanceStore, InMemoryLedgerStore};
use std::sync::Arc;
use std::thread;

const WORKERS: i64 = 4;
const OPS_PER_WORKER: i64 = 500;

fn main() {
    divan::main();
}

fn service() -> Arc<BalanceLedgerService<InMemoryBalanceStore, InMemoryLedgerStore>> {
    Arc::new(BalanceLedgerService::new(
        InMemoryBalanceStore::new(),
        InMemoryLedgerStore::new(),
    ))
}

/// All workers hammer the same user; every charge serializes on one lock
#[divan::bench]
fn charge_contended_single_user() {
    let service = service();

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..OPS_PER_WORKER {
                    service.charge(1, 10).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

/// Each worker owns a distinct user; locks never contend
#[divan::bench]
fn charge_spread_across_users() {
    let service = service();

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..OPS_PER_WORKER {
                    service.charge(worker + 1, 10).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

/// Single-threaded baseline: charge then use, one user
#[divan::bench]
fn charge_use_cycle_single_thread() {
    let service = service();

    for _ in 0..OPS_PER_WORKER {
        service.charge(1, 10).unwrap();
        service.use_points(1, 10).unwrap();
    }
}
