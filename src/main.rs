//! sophidoc - project snapshot, static analysis and cached diagnosis
//!
//! sophidoc provides:
//! - Deterministic, size-bounded project scans with ignore rules
//! - A metadata fingerprint of the scanned snapshot
//! - Lightweight static analysis (Python syntax tree, script patterns)
//! - A fingerprint-keyed diagnosis cache with expiry
//! - A pluggable, command-based diagnosis collaborator

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod analysis;
mod backends;
mod cache;
mod cli;
mod core;
mod flows;

fn init_logging(verbose: bool, ansi: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,sophidoc=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some();
    if no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, !no_color);

    cli::run(cli)
}
