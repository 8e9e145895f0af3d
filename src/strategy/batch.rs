//! Batch processing with user-based partitioning
//!
//! This module provides the `BatchProcessor`, which applies a batch of
//! operations through the shared service with user-based partitioning:
//! operations for different users run on concurrent tasks, while one
//! user's operations keep their input order. That matches the engine's
//! concurrency model exactly - per-user mutations serialize on the user's
//! lock anyway, so the only parallelism worth extracting is across users.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::core::BalanceLedgerService;
use crate::store::{BalanceStore, LedgerStore};
use crate::types::{Balance, LedgerError, OperationRecord, UserId};

/// Result of applying a single operation
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    /// The operation that was applied
    pub record: OperationRecord,

    /// The updated balance, or the rejection
    pub result: Result<Balance, LedgerError>,
}

/// Batch processor with user-based partitioning
pub struct BatchProcessor<B, L> {
    /// Shared service; all tasks apply operations through the same instance
    service: Arc<BalanceLedgerService<B, L>>,
}

impl<B, L> Clone for BatchProcessor<B, L> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<B, L> BatchProcessor<B, L>
where
    B: BalanceStore + 'static,
    L: LedgerStore + 'static,
{
    /// Create a new BatchProcessor over a shared service
    pub fn new(service: Arc<BalanceLedgerService<B, L>>) -> Self {
        Self { service }
    }

    /// Partition a batch of operations by user id
    ///
    /// Every operation lands in exactly one partition, and each partition
    /// preserves the original input order for its user.
    pub fn partition_by_user(
        &self,
        batch: Vec<OperationRecord>,
    ) -> HashMap<UserId, Vec<OperationRecord>> {
        let mut user_batches: HashMap<UserId, Vec<OperationRecord>> = HashMap::new();

        for record in batch {
            user_batches.entry(record.user_id).or_default().push(record);
        }

        user_batches
    }

    /// Apply one user's operations sequentially, in input order
    ///
    /// Rejections are captured in the outcomes and do not stop the
    /// remaining operations.
    pub fn process_user_operations(
        &self,
        operations: Vec<OperationRecord>,
    ) -> Vec<OperationOutcome> {
        let mut outcomes = Vec::with_capacity(operations.len());

        for record in operations {
            let result = self.service.apply(&record);
            if let Err(error) = &result {
                warn!(user_id = record.user_id, %error, "operation rejected");
            }
            outcomes.push(OperationOutcome { record, result });
        }

        outcomes
    }

    /// Process a batch of operations with user-based partitioning
    ///
    /// Spawns a tokio task per user partition, waits for all of them, and
    /// collects the outcomes. Outcomes across users may interleave; within
    /// one user they are in input order.
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<OperationOutcome> {
        let user_batches = self.partition_by_user(batch);

        let mut tasks = Vec::new();
        for (_user_id, operations) in user_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_user_operations(operations)
            }));
        }

        let mut outcomes = Vec::new();
        for task in tasks {
            match task.await {
                Ok(user_outcomes) => outcomes.extend(user_outcomes),
                Err(e) => warn!("Batch task panicked: {:?}", e),
            }
        }

        outcomes
    }
}
