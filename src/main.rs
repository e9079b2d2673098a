//! Payment Methods CLI
//!
//! Replays a script of registry operations against an optional seed list
//! and prints the final normalized method list as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ops.csv seed.json > methods.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use payment_methods::{ConsoleError, MethodConsole, PaymentMethod, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
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
        return Err(ConsoleError::MissingArgument);
    }

    let ops_path = &args[1];

    let mut console = MethodConsole::new();

    if let Some(seed_path) = args.get(2) {
        let file = File::open(seed_path)?;
        let seed: Vec<PaymentMethod> = serde_json::from_reader(BufReader::new(file))?;
        console.sync(&seed);
    }

    let file = File::open(ops_path)?;
    console.process_csv(BufReader::new(file))?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    console.write_output(handle)?;

    Ok(())
}
