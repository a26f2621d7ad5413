//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the gox proxy client.
#[derive(Parser)]
#[command(name = "gox")]
#[command(about = "Manage proxy servers and run the xray engine")]
#[command(version)]
pub struct Cli {
    /// Use this directory instead of the default data root
    #[arg(long = "data-dir", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
