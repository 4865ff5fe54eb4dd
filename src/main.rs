//! Trip Settle CLI
//!
//! Reads a group ledger CSV and prints the settlement report.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ledger.csv > report.json
//! cargo run -- ledger.csv --csv > transfers.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `SETTLE_EPSILON`: Zero tolerance for balances (default `0.01`)
//! - `SETTLE_ORDER`: `largest` (default) or `discovery` matching order

use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::process;
use trip_settle::{PlannerConfig, Result, SettleError, SettlementEngine};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let csv_output = args.iter().any(|a| a == "--csv");
    let input_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .ok_or(SettleError::MissingArgument)?;

    let config = PlannerConfig::from_env()?;

    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let group_name = Path::new(input_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("trip");
    let mut engine = SettlementEngine::new(group_name);
    engine.process_csv(reader)?;

    let report = engine.report(&config)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    if csv_output {
        report.write_csv(handle)?;
    } else {
        report.write_json(handle)?;
    }

    Ok(())
}
