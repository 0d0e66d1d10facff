//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. The script is read in batches with csv-async and
//! each batch is replayed with account-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (customer barriers + account partitioning)
//!     └── OperationProcessor (labels, provisioning, ledger engine)
//! ```
//!
//! Batches are processed one after another, so an account's operations keep
//! their script order even when they span several batches.

use crate::core::{BatchProcessor, OperationProcessor};
use crate::io::async_reader::AsyncReader;
use crate::io::{write_reports, OutputFormat};
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Worker threads of the tokio runtime
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                fallback = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                fallback = default.max_concurrent_batches,
                "invalid concurrency, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    format: OutputFormat,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    /// * `format` - Report format
    pub fn new(config: BatchConfig, format: OutputFormat) -> Self {
        Self { config, format }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay the script in batches
    ///
    /// 1. Creates a multi-threaded tokio runtime
    /// 2. Reads operations in batches from CSV using AsyncReader
    /// 3. Processes each batch to completion before reading the next
    /// 4. Writes the account reports
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let processor = Arc::new(OperationProcessor::new());

        runtime.block_on(async {
            let batch_processor = BatchProcessor::new(Arc::clone(&processor));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // csv-async reads through the futures I/O traits
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let (mut applied, mut rejected) = (0usize, 0usize);
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for outcome in batch_processor.process_batch(batch).await {
                    match outcome.result {
                        Ok(()) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            warn!(op = ?outcome.record.op, error = %e, "operation rejected");
                        }
                    }
                }
            }
            info!(applied, rejected, "script replayed");

            Ok::<(), String>(())
        })?;

        let reports = processor
            .reports()
            .map_err(|e| format!("Failed to build reports: {}", e))?;
        write_reports(&reports, self.format, output)
    }
}
