//! Processing strategy module for operation scripts
//!
//! This module defines the Strategy pattern for complete script processing
//! pipelines, covering CSV parsing, ledger processing and report output.
//! Different implementations (synchronous, asynchronous batch) are selected
//! at runtime.

use crate::cli::StrategyType;
use crate::io::OutputFormat;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete script processing pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the script in `input_path` and write account reports to output
    ///
    /// # Returns
    ///
    /// * `Ok(())` if processing completed (rejected rows are not fatal)
    /// * `Err(String)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - The async runtime cannot be created
    /// - Reports cannot be computed or written
    ///
    /// Malformed rows and rejected operations are logged at `warn` and
    /// skipped; processing continues with the next row.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
/// * `format` - Report format written once the script is replayed
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    format: OutputFormat,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(format)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, format))
        }
    }
}
