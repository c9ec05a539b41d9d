//! Loan Ledger CLI
//!
//! Loads a ledger JSON document and prints a CSV portfolio report along with
//! dashboard totals.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ledger.json > portfolio.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use loan_ledger::aggregates::write_portfolio_report;
use loan_ledger::{Aggregates, JsonFileStore, LedgerError, Result, Store};
use log::info;
use std::env;
use std::io;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(LedgerError::MissingArgument);
    }

    let store = JsonFileStore::new(&args[1]);
    if !store.path().exists() {
        return Err(LedgerError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such ledger file: {}", args[1]),
        )));
    }
    let clients = store.load_active_clients()?;

    let totals = Aggregates::compute(&clients);
    info!(
        "{} active clients, {} outstanding, {} collected, {} interest due next period",
        totals.total_clients,
        totals.total_current_capital,
        totals.total_collected,
        totals.interest_due_next_period
    );

    let stdout = io::stdout();
    let handle = stdout.lock();
    write_portfolio_report(&clients, handle)?;

    Ok(())
}
