//! Synchronous processing strategy
//!
//! Streams the script one row at a time through a single
//! `OperationProcessor`, then writes the account reports.
//!
//! - CSV parsing is delegated to `SyncReader` (iterator interface)
//! - Operations are applied by `OperationProcessor`
//! - Output is delegated to `io::write_reports`

use crate::core::OperationProcessor;
use crate::io::sync_reader::SyncReader;
use crate::io::{write_reports, OutputFormat};
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// ```no_run
/// use rust_ledger_engine::io::OutputFormat;
/// use rust_ledger_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
///
/// let strategy = SyncProcessingStrategy::new(OutputFormat::Csv);
/// strategy
///     .process(Path::new("script.csv"), &mut std::io::stdout())
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncProcessingStrategy {
    format: OutputFormat,
}

impl SyncProcessingStrategy {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let reader = SyncReader::new(input_path)?;
        let processor = OperationProcessor::new();

        let (mut applied, mut rejected) = (0usize, 0usize);
        for result in reader {
            match result {
                Ok(record) => match processor.process(&record) {
                    Ok(()) => applied += 1,
                    Err(e) => {
                        rejected += 1;
                        warn!(op = ?record.op, error = %e, "operation rejected");
                    }
                },
                Err(e) => {
                    rejected += 1;
                    warn!(error = %e, "skipping malformed row");
                }
            }
        }
        info!(applied, rejected, "script replayed");

        let reports = processor
            .reports()
            .map_err(|e| format!("Failed to build reports: {}", e))?;
        write_reports(&reports, self.format, output)
    }
}
