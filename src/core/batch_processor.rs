//! Batch processing with account-based partitioning for async script replay
//!
//! This module provides the `BatchProcessor` struct, which processes batches
//! of operation records concurrently while keeping the outcome identical to
//! replaying the script one row at a time.
//!
//! # Design
//!
//! Each batch is cut into segments at customer registrations. Within a
//! segment, records are partitioned by account label: partitions run as
//! separate tokio tasks, and each partition is processed sequentially in
//! input order. Customer registrations run alone between segments, so an
//! `open` row never races the registration it depends on.
//!
//! ```text
//! batch:    c1  o1 d1 o2 d2 w1  c2  o3 d3
//!           |   \_____________/ |   \___/
//! segments: bar    segment 1   bar  seg 2
//! ```
//!
//! # Thread Safety
//!
//! The processor is cloneable and shares one `OperationProcessor` through an
//! `Arc`; the ledger engine serializes concurrent operations per account.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use super::processor::OperationProcessor;
use crate::types::{OperationError, OperationRecord};

/// Result of processing a single operation record
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Position of the record within its batch
    pub position: usize,

    /// The record that was processed
    pub record: OperationRecord,

    /// The result of processing (success or error)
    pub result: Result<(), OperationError>,
}

/// Batch processor with account-based partitioning
#[derive(Clone)]
pub struct BatchProcessor {
    processor: Arc<OperationProcessor>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `processor` - Shared operation processor the records are applied to
    pub fn new(processor: Arc<OperationProcessor>) -> Self {
        Self { processor }
    }

    /// Partition a segment of account operations by account label
    ///
    /// Records keep their batch position; each partition preserves input
    /// order.
    pub fn partition_by_account(
        &self,
        segment: Vec<(usize, OperationRecord)>,
    ) -> HashMap<String, Vec<(usize, OperationRecord)>> {
        let mut partitions: HashMap<String, Vec<(usize, OperationRecord)>> = HashMap::new();

        for (position, record) in segment {
            let key = record.partition_key().unwrap_or_default().to_string();
            partitions.entry(key).or_default().push((position, record));
        }

        partitions
    }

    /// Process the records of one account sequentially
    pub async fn process_account_operations(
        &self,
        records: Vec<(usize, OperationRecord)>,
    ) -> Vec<ProcessingResult> {
        records
            .into_iter()
            .map(|(position, record)| self.process_one(position, record))
            .collect()
    }

    /// Process a batch of records
    ///
    /// # Returns
    ///
    /// One `ProcessingResult` per record, in input order.
    ///
    /// # Guarantees
    ///
    /// - Records for the same account are processed sequentially in order
    /// - Customer registrations complete before any later record starts
    /// - All records are processed, even if some fail
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());
        let mut segment = Vec::new();

        for (position, record) in batch.into_iter().enumerate() {
            if record.partition_key().is_some() {
                segment.push((position, record));
                continue;
            }

            // Barrier: drain the pending segment, then apply the record alone.
            if !segment.is_empty() {
                results.extend(self.process_segment(std::mem::take(&mut segment)).await);
            }
            results.push(self.process_one(position, record));
        }

        if !segment.is_empty() {
            results.extend(self.process_segment(segment).await);
        }

        results.sort_by_key(|r| r.position);
        results
    }

    async fn process_segment(&self, segment: Vec<(usize, OperationRecord)>) -> Vec<ProcessingResult> {
        let partitions = self.partition_by_account(segment);

        let mut tasks = Vec::with_capacity(partitions.len());
        for (_label, records) in partitions {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_account_operations(records).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(partition_results) => results.extend(partition_results),
                Err(e) => error!(error = %e, "partition task failed"),
            }
        }
        results
    }

    fn process_one(&self, position: usize, record: OperationRecord) -> ProcessingResult {
        let result = self.processor.process(&record);
        ProcessingResult {
            position,
            record,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationType;
    use rust_decimal::Decimal;

    fn customer(label: &str) -> OperationRecord {
        OperationRecord {
            op: OperationType::Customer,
            customer: Some(label.to_string()),
            account: None,
            amount: None,
        }
    }

    fn open(customer: &str, account: &str) -> OperationRecord {
        OperationRecord {
            op: OperationType::Open,
            customer: Some(customer.to_string()),
            account: Some(account.to_string()),
            amount: None,
        }
    }

    fn deposit(account: &str, units: i64) -> OperationRecord {
        OperationRecord {
            op: OperationType::Deposit,
            customer: None,
            account: Some(account.to_string()),
            amount: Some(Decimal::new(units, 0)),
        }
    }

    fn withdraw(account: &str, units: i64) -> OperationRecord {
        OperationRecord {
            op: OperationType::Withdraw,
            ..deposit(account, units)
        }
    }

    fn batch_processor() -> (BatchProcessor, Arc<OperationProcessor>) {
        let processor = Arc::new(OperationProcessor::new());
        (BatchProcessor::new(Arc::clone(&processor)), processor)
    }

    #[test]
    fn test_partition_by_account_keeps_order() {
        let (batch_processor, _) = batch_processor();
        let segment = vec![
            (0, deposit("a", 1)),
            (1, deposit("b", 2)),
            (2, withdraw("a", 3)),
            (3, open("alice", "c")),
        ];

        let partitions = batch_processor.partition_by_account(segment);

        assert_eq!(partitions.len(), 3);
        let a: Vec<usize> = partitions["a"].iter().map(|(p, _)| *p).collect();
        assert_eq!(a, vec![0, 2]);
        assert_eq!(partitions["b"].len(), 1);
        assert_eq!(partitions["c"][0].1.op, OperationType::Open);
    }

    #[test]
    fn test_partition_empty_segment() {
        let (batch_processor, _) = batch_processor();
        assert!(batch_processor.partition_by_account(vec![]).is_empty());
    }

    #[tokio::test]
    async fn test_results_returned_in_input_order() {
        let (batch_processor, _) = batch_processor();
        let batch = vec![
            customer("alice"),
            open("alice", "a"),
            open("alice", "b"),
            deposit("b", 10),
            deposit("a", 20),
            withdraw("b", 5),
        ];

        let results = batch_processor.process_batch(batch).await;

        let positions: Vec<usize> = results.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 5]);
        assert!(results.iter().all(|r| r.result.is_ok()));
    }

    #[tokio::test]
    async fn test_customer_rows_act_as_barriers() {
        let (batch_processor, processor) = batch_processor();
        let batch = vec![
            customer("alice"),
            open("alice", "a"),
            customer("bob"),
            open("bob", "b"),
            deposit("b", 7),
        ];

        let results = batch_processor.process_batch(batch).await;
        assert!(results.iter().all(|r| r.result.is_ok()));

        let reports = processor.reports().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].customer, "bob");
        assert_eq!(reports[1].summary.final_balance.to_string(), "7.00");
    }

    #[tokio::test]
    async fn test_open_before_customer_fails_like_sequential() {
        let (batch_processor, _) = batch_processor();
        let batch = vec![open("alice", "a"), customer("alice")];

        let results = batch_processor.process_batch(batch).await;

        assert!(matches!(
            results[0].result,
            Err(OperationError::UnknownCustomer { .. })
        ));
        assert!(results[1].result.is_ok());
    }

    #[tokio::test]
    async fn test_per_account_order_preserved_across_partitions() {
        let (batch_processor, processor) = batch_processor();
        let mut batch = vec![customer("alice")];
        for label in ["a", "b", "c", "d"] {
            batch.push(open("alice", label));
        }
        for _ in 0..25 {
            for label in ["a", "b", "c", "d"] {
                batch.push(deposit(label, 2));
                batch.push(withdraw(label, 1));
            }
        }

        let results = batch_processor.process_batch(batch).await;
        assert!(results.iter().all(|r| r.result.is_ok()));

        for report in processor.reports().unwrap() {
            assert_eq!(report.summary.final_balance.to_string(), "25.00");
            assert_eq!(report.summary.transactions.len(), 50);
        }
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_batch() {
        let (batch_processor, processor) = batch_processor();
        let batch = vec![
            customer("alice"),
            open("alice", "a"),
            withdraw("a", 10),
            deposit("missing", 10),
            deposit("a", 10),
        ];

        let results = batch_processor.process_batch(batch).await;

        let failed: Vec<usize> = results
            .iter()
            .filter(|r| r.result.is_err())
            .map(|r| r.position)
            .collect();
        assert_eq!(failed, vec![2, 3]);
        assert_eq!(
            processor.reports().unwrap()[0].summary.final_balance.to_string(),
            "10.00"
        );
    }
}
