//! Stride Control - CLI for curriculum progress, tasks and workout streaks

use clap::Parser;
use std::io::Write;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stridectl::cli::Cli;
use stridectl::commands;
use stridectl::errors::{exit_code_for, EXIT_SUCCESS};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("stridectl v{} starting", env!("CARGO_PKG_VERSION"));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = match commands::run(cli, &mut out) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            exit_code_for(&err)
        }
    };
    let _ = out.flush();
    std::process::exit(code);
}
