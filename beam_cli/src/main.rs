//! # beam_cli
//!
//! Command-line front end for `beam_core`. Builds a straight beam from the
//! arguments, runs the analysis or the height optimizer and prints a text
//! report or JSON.

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        if let Some(calc) = e.downcast_ref::<beam_core::CalcError>() {
            if let Ok(json) = serde_json::to_string_pretty(calc) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;
    info!("beam_cli v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("arguments: {:?}", &cli);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build the global thread pool")?;
    }

    match cli.command {
        Commands::Analyze(args) => commands::analyze(args),
        Commands::Optimize(args) => commands::optimize(args),
    }
}
