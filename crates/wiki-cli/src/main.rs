//! wikisync CLI
//!
//! One-way synchronization of Yuque repositories into a Confluence space.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;
    tracing::debug!(?cli, "Parsed arguments");

    commands::run_sync(cli.config.as_deref(), !cli.no_notify, cli.json)
}
