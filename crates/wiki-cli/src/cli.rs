//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// wikisync - Mirror Yuque repositories into a Confluence space
#[derive(Parser, Debug)]
#[command(name = "wikisync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (.toml or .json)
    ///
    /// Defaults to `<config dir>/wikisync/config.toml`.
    #[arg(short, long, env = "WIKISYNC_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not send the end-of-run notification
    #[arg(long)]
    pub no_notify: bool,

    /// Print the report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}
