//! # TechLogistics command-line entry point
//!
//! ```bash
//! techlogistics run --data-dir data --output out
//! techlogistics run --warehouse Norte --channel online
//! techlogistics score data/inventario_central_v2.csv
//! techlogistics rules --output rules.json
//! ```
//!
//! Logs go to stdout and to the rolling files described in
//! [`techlogistics::logging`]. Set `RUST_LOG=debug` for per-step detail.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    techlogistics::logging::init()?;
    let cli = cli::Cli::parse();
    cli::run_command(cli.command)
}
