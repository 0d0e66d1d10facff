//! Rust Ledger Engine CLI
//!
//! Replays a CSV operation script and prints one report row per account.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- script.csv > accounts.csv
//! cargo run -- --strategy sync script.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 script.csv
//! cargo run -- --format json script.csv > accounts.json
//! RUST_LOG=debug cargo run -- --json-logs script.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success (rejected operations are logged, not fatal)
//! - 1: Fatal error (file not found, output failure, etc.)

use rust_ledger_engine::cli;
use rust_ledger_engine::logging;
use rust_ledger_engine::strategy;
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();
    logging::init(args.json_logs);

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config, args.format)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!(error = %e, "processing failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
